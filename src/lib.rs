pub mod commands;
pub mod error;
pub mod models;
pub mod schedule;
pub mod traits;

pub use commands::{
    assets::{delete_assets, get_assets, parse_payload, save_asset},
    db::SqliteStore,
    settings::{get_settings, save_settings},
};
pub use error::{DepreciationError, Result};
