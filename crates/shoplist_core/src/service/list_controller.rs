//! List controller: user intents in, sorted views out.
//!
//! # Responsibility
//! - Translate add/toggle/rename/remove/clear intents into store calls.
//! - Return a freshly listed view after every successful mutation.
//!
//! # Invariants
//! - The controller holds no copy of the items; ordering comes from the
//!   store's `list`.
//! - Blank names on add/rename are ignored, never surfaced as errors.
//! - A stale id on toggle is ignored; on remove it is surfaced.

use crate::model::item::{normalize_item_name, ItemId, ItemPatch, ShoppingItem};
use crate::repo::item_store::{ItemStore, StoreError, StoreResult};
use log::{debug, info};
use std::collections::BTreeSet;

/// Mediator between user intents and an injected [`ItemStore`].
pub struct ListController<S: ItemStore> {
    store: S,
}

impl<S: ItemStore> ListController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Adds an item named after the trimmed input.
    ///
    /// Blank input is a no-op and returns the unchanged view.
    pub fn add_item(&self, raw_name: &str) -> StoreResult<Vec<ShoppingItem>> {
        let Ok(name) = normalize_item_name(raw_name) else {
            debug!("event=intent_ignored module=service intent=add reason=blank_name");
            return self.current_view();
        };
        let item = self.store.create(&name)?;
        info!("event=item_added module=service item_id={}", item.id);
        self.current_view()
    }

    /// Flips the checked state of one item.
    ///
    /// An id that no longer exists (removed meanwhile) is a no-op.
    pub fn toggle_item(&self, id: ItemId) -> StoreResult<Vec<ShoppingItem>> {
        let Some(current) = self.store.get(id)? else {
            debug!("event=intent_ignored module=service intent=toggle reason=not_found item_id={id}");
            return self.current_view();
        };

        match self
            .store
            .update(id, &ItemPatch::checked(!current.is_checked))
        {
            Ok(updated) => {
                debug!(
                    "event=item_toggled module=service item_id={id} is_checked={}",
                    updated.is_checked
                );
            }
            Err(StoreError::NotFound(_)) => {
                debug!("event=intent_ignored module=service intent=toggle reason=not_found item_id={id}");
            }
            Err(err) => return Err(err),
        }
        self.current_view()
    }

    /// Renames one item. Blank names leave the item untouched.
    pub fn rename_item(&self, id: ItemId, new_name: &str) -> StoreResult<Vec<ShoppingItem>> {
        let Ok(name) = normalize_item_name(new_name) else {
            debug!("event=intent_ignored module=service intent=rename reason=blank_name item_id={id}");
            return self.current_view();
        };
        self.store.update(id, &ItemPatch::rename(name))?;
        debug!("event=item_renamed module=service item_id={id}");
        self.current_view()
    }

    /// Removes one item. A missing id is reported to the caller.
    pub fn remove_item(&self, id: ItemId) -> StoreResult<Vec<ShoppingItem>> {
        self.store.delete(id)?;
        info!("event=item_removed module=service item_id={id}");
        self.current_view()
    }

    /// Removes the items at the given positions of the current view.
    ///
    /// Offsets past the end are skipped and repeated offsets count once.
    /// Removal is all-or-nothing.
    pub fn remove_items_at(&self, offsets: &[usize]) -> StoreResult<Vec<ShoppingItem>> {
        let view = self.current_view()?;
        let ids: Vec<ItemId> = offsets
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|offset| view.get(offset).map(|item| item.id))
            .collect();
        if ids.is_empty() {
            return Ok(view);
        }

        let removed = self.store.delete_many(&ids)?;
        info!("event=items_removed module=service count={removed}");
        self.current_view()
    }

    /// Removes every item unconditionally. Confirmation is the caller's job.
    pub fn clear_all(&self) -> StoreResult<Vec<ShoppingItem>> {
        let removed = self.store.delete_all()?;
        info!("event=list_cleared module=service count={removed}");
        self.current_view()
    }

    /// Current items, sorted by the store.
    pub fn current_view(&self) -> StoreResult<Vec<ShoppingItem>> {
        self.store.list()
    }

    /// Hands the store back, e.g. to close it.
    pub fn into_store(self) -> S {
        self.store
    }
}
