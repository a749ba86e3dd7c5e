//! HTTP routes.
//!
//! ```text
//! GET    /health                 liveness
//! GET    /health/ready           store reachable
//!
//! POST   /register               create a member account
//! POST   /login                  start a session
//! POST   /logout (also GET)      end the session
//!
//! GET    /  and  /events         event list, ?search= filters by name
//! GET    /events/:id             event detail
//! POST   /events/:id/purchase    price an order (members)
//! POST   /events/:id/checkout    buy tickets (members)
//! GET    /tickets                own purchases
//!
//! GET    /admin                  dashboard with sales totals
//! POST   /admin/events           create event
//! PUT    /admin/events/:id       update event
//! DELETE /admin/events/:id       delete event
//! GET    /admin/users            list accounts
//! DELETE /admin/users/:id        delete account
//! ```

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_session_layer, security_headers, Config};
use crate::handlers::{admin, auth, events, health_check, readiness, tickets};
use crate::state::AppState;

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/events", post(admin::create_event))
        .route(
            "/events/:id",
            put(admin::update_event).delete(admin::delete_event),
        )
        .route("/users", get(admin::list_users))
        .route("/users/:id", delete(admin::delete_user))
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout).get(auth::logout))
        .route("/", get(events::list_events))
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::event_detail))
        .route("/events/:id/purchase", post(tickets::purchase))
        .route("/events/:id/checkout", post(tickets::checkout))
        .route("/tickets", get(tickets::my_tickets))
        .nest("/admin", admin_routes())
        .layer(create_session_layer(config, state.sessions().clone()))
        .layer(TraceLayer::new_for_http())
        .layer(security_headers(config))
        .layer(create_cors_layer(config))
        .with_state(state)
}
