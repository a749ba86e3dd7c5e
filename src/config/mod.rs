//! Runtime configuration read from the environment (and `.env` via dotenvy).

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use axum::http::HeaderValue;
use thiserror::Error;

pub mod cors;
pub mod security;
pub mod session;

pub use cors::create_cors_layer;
pub use security::security_headers;
pub use session::create_session_layer;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_ADMIN_NAME: &str = "Administrator";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

/// Credentials for the account seeded with the admin role at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_connections: u32,
    pub session_secure: bool,
    pub session_expiry_seconds: i64,
    pub production: bool,
    pub admin: Option<AdminSeed>,
    /// Browser origins allowed to make credentialed requests.
    pub cors_allowed_origins: Vec<HeaderValue>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/festix".to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            session_secure: false,
            session_expiry_seconds: DEFAULT_SESSION_EXPIRY_SECONDS,
            production: false,
            admin: None,
            cors_allowed_origins: cors::parse_origins(cors::DEFAULT_ALLOWED_ORIGINS),
        }
    }
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key, e.to_string())),
        Err(_) => Ok(default),
    }
}

/// A configured origin list that parses to nothing is a mistake, not "allow all".
fn allowed_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    let origins = cors::parse_origins(raw);
    if origins.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "CORS_ALLOWED_ORIGINS",
            "no valid origin in list".to_string(),
        ));
    }
    Ok(origins)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL"))?;

        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminSeed {
                    name: env::var("ADMIN_NAME").unwrap_or_else(|_| DEFAULT_ADMIN_NAME.to_string()),
                    email,
                    password,
                })
            }
            _ => None,
        };

        let production = env::var("RUST_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let cors_allowed_origins = match env::var("CORS_ALLOWED_ORIGINS") {
            Ok(raw) => allowed_origins(&raw)?,
            Err(_) => defaults.cors_allowed_origins,
        };

        Ok(Self {
            database_url,
            host: parsed("HOST", defaults.host)?,
            port: parsed("PORT", defaults.port)?,
            max_connections: parsed("DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            session_secure: parsed("SESSION_SECURE", defaults.session_secure)?,
            session_expiry_seconds: parsed(
                "SESSION_EXPIRY_SECONDS",
                defaults.session_expiry_seconds,
            )?,
            production,
            admin,
            cors_allowed_origins,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.socket_addr().port(), 3001);
        assert!(!config.session_secure);
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_invalid_number_is_reported() {
        std::env::set_var("FESTIX_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16, _> = parsed("FESTIX_TEST_BAD_PORT", 1);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar("FESTIX_TEST_BAD_PORT", _))
        ));
        std::env::remove_var("FESTIX_TEST_BAD_PORT");
    }

    #[test]
    fn test_origin_list_without_valid_entries_is_rejected() {
        assert!(matches!(
            allowed_origins(" , bad\norigin"),
            Err(ConfigError::InvalidEnvVar("CORS_ALLOWED_ORIGINS", _))
        ));
        assert_eq!(allowed_origins("https://a.test").unwrap().len(), 1);
        assert_eq!(Config::default().cors_allowed_origins.len(), 2);
    }

    #[test]
    fn test_unset_variable_uses_default() {
        let result: Result<u32, _> = parsed("FESTIX_TEST_UNSET_VALUE", 7);
        assert_eq!(result.unwrap(), 7);
    }
}
