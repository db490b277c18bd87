//! Shopping item domain model.
//!
//! # Responsibility
//! - Define the canonical record for one shopping-list entry.
//! - Own name normalization and validation shared by store and controller.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `created_at` is fixed at construction.
//! - A valid `name` is non-empty after trimming surrounding whitespace.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier of a shopping item.
pub type ItemId = Uuid;

/// Validation failures for item fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemValidationError {
    #[error("item name must not be empty")]
    EmptyName,
}

/// One entry of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    pub id: ItemId,
    pub name: String,
    pub is_checked: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl ShoppingItem {
    /// Creates an unchecked item with a generated id and the current time.
    ///
    /// # Errors
    /// - [`ItemValidationError::EmptyName`] when `name` is blank.
    pub fn new(name: &str) -> Result<Self, ItemValidationError> {
        Self::with_id(Uuid::new_v4(), name, now_epoch_ms())
    }

    /// Creates an unchecked item with caller-provided identity and timestamp.
    ///
    /// The stored name is the trimmed form of `name`.
    pub fn with_id(id: ItemId, name: &str, created_at: i64) -> Result<Self, ItemValidationError> {
        Ok(Self {
            id,
            name: normalize_item_name(name)?,
            is_checked: false,
            created_at,
        })
    }

    /// Re-checks invariants on an already built value (e.g. a row read back
    /// from storage).
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        Ok(())
    }

    /// Applies a patch in place. Nothing changes when the patch is invalid.
    pub fn apply(&mut self, patch: &ItemPatch) -> Result<(), ItemValidationError> {
        let name = patch.name.as_deref().map(normalize_item_name).transpose()?;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(is_checked) = patch.is_checked {
            self.is_checked = is_checked;
        }
        Ok(())
    }
}

/// Partial update for a stored item. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub is_checked: Option<bool>,
}

impl ItemPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            is_checked: None,
        }
    }

    pub fn checked(is_checked: bool) -> Self {
        Self {
            name: None,
            is_checked: Some(is_checked),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_checked.is_none()
    }
}

/// Trims `raw` and rejects the result when nothing is left.
pub fn normalize_item_name(raw: &str) -> Result<String, ItemValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ItemValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
