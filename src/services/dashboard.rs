use serde::Serialize;

use crate::models::{Event, SaleRecord, SalesTotals};
use crate::store::Store;
use crate::utils::error::AppError;

/// Everything the admin overview shows.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub events: Vec<Event>,
    pub sales: Vec<SaleRecord>,
    pub totals: SalesTotals,
}

pub async fn load(store: &dyn Store) -> Result<Dashboard, AppError> {
    Ok(Dashboard {
        events: store.list_events().await?,
        sales: store.list_sales().await?,
        totals: store.sales_totals().await?,
    })
}
