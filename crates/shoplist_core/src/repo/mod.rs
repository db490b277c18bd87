//! Persistence layer for shopping items.
//!
//! # Responsibility
//! - Define the item store contract used by the list controller.
//! - Isolate SQLite query and transaction details from intent handling.
//!
//! # Invariants
//! - Store APIs return semantic errors (`NotFound`, `Validation`) in
//!   addition to persistence failures.

pub mod item_store;
