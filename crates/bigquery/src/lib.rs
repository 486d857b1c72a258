pub mod client;
pub mod config;
pub mod convert;
pub mod identifier;
pub mod query;
mod result;

pub use client::{BigQueryClient, WarehouseClient, WarehouseError};
pub use config::BigQueryConfig;
pub use convert::{map_row, map_rows};
pub use identifier::{is_valid_identifier, is_valid_project_id, IdentifierError, TableRef};
pub use query::build_users_query;
