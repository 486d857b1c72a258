pub mod config;
pub mod user;
pub mod value;

pub use config::Config;
pub use user::UserRecord;
pub use value::{format_round_trip, WarehouseRow, WarehouseValue};
