//! Domain model for the shopping list.
//!
//! # Invariants
//! - Every item is identified by a stable `ItemId`.
//! - Deletion is permanent; there is no tombstone state.

pub mod item;
