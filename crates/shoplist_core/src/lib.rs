//! Core state and persistence for the shopping list.
//! This crate is the single source of truth for item invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, LogConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{normalize_item_name, ItemId, ItemPatch, ItemValidationError, ShoppingItem};
pub use repo::item_store::{ItemStore, SqliteItemStore, StoreError, StoreResult};
pub use service::list_controller::ListController;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
