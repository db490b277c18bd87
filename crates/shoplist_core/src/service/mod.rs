//! Intent-level services over the item store.
//!
//! # Responsibility
//! - Keep presentation callers decoupled from storage details.

pub mod list_controller;
