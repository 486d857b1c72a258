use std::sync::Arc;

use userlake_bigquery::{BigQueryConfig, WarehouseClient};
use userlake_core::Config;

/// Shared, read-only per-process state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub bigquery: BigQueryConfig,
    pub warehouse: Arc<dyn WarehouseClient>,
}
