//! Item store contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the durable collection of shopping items.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every write runs in one `IMMEDIATE` transaction and is committed before
//!   the call returns; a failed write is rolled back in full.
//! - Write paths validate names before touching SQL.
//! - `list` orders by `name` (binary collation), then creation order.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::latest_version;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::item::{ItemId, ItemPatch, ItemValidationError, ShoppingItem};
use log::{debug, error, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

const ITEMS_TABLE: &str = "shopping_items";
const REQUIRED_COLUMNS: [&str; 5] = ["seq", "uuid", "name", "is_checked", "created_at"];

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    is_checked,
    created_at
FROM shopping_items";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from item store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Input rejected before any write happened.
    #[error("{0}")]
    Validation(#[from] ItemValidationError),
    /// Target item does not exist (never created, or already deleted).
    #[error("shopping item not found: {0}")]
    NotFound(ItemId),
    /// Durable write or read failed; nothing was committed.
    #[error("persistence failure: {0}")]
    Persistence(#[from] DbError),
    /// Persisted row cannot be converted into a valid item.
    #[error("invalid persisted item data: {0}")]
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    #[error("item store requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("item store requires table `{0}`")]
    MissingRequiredTable(&'static str),
    #[error("item store requires column `{column}` in table `{table}`")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Persistence(_) => "persistence",
            Self::InvalidData(_) => "invalid_data",
            Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => "uninitialized",
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(DbError::Sqlite(value))
    }
}

/// Durable, queryable collection of shopping items.
pub trait ItemStore {
    /// Persists a new unchecked item named after the trimmed `name`.
    fn create(&self, name: &str) -> StoreResult<ShoppingItem>;
    /// Applies a partial change and returns the updated item.
    fn update(&self, id: ItemId, patch: &ItemPatch) -> StoreResult<ShoppingItem>;
    /// Removes one item permanently.
    fn delete(&self, id: ItemId) -> StoreResult<()>;
    /// Removes a batch of items atomically and returns how many were removed.
    fn delete_many(&self, ids: &[ItemId]) -> StoreResult<usize>;
    /// Removes every item and returns how many were removed.
    fn delete_all(&self) -> StoreResult<usize>;
    /// Loads one item by id.
    fn get(&self, id: ItemId) -> StoreResult<Option<ShoppingItem>>;
    /// Returns all items sorted by name, then creation order.
    fn list(&self) -> StoreResult<Vec<ShoppingItem>>;
}

/// SQLite-backed item store owning its connection.
pub struct SqliteItemStore {
    conn: Connection,
}

impl SqliteItemStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a fresh in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection.
    ///
    /// # Errors
    /// - Readiness errors when the schema version, table or columns do not
    ///   match what this binary expects.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Closes the underlying connection.
    pub fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, err)| {
            error!("event=store_close module=repo status=error error={err}");
            StoreError::from(err)
        })?;
        debug!("event=store_close module=repo status=ok");
        Ok(())
    }

    fn begin_write(&self) -> StoreResult<Transaction<'_>> {
        Ok(Transaction::new_unchecked(
            &self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl ItemStore for SqliteItemStore {
    fn create(&self, name: &str) -> StoreResult<ShoppingItem> {
        traced("create", || {
            let item = ShoppingItem::new(name)?;
            let tx = self.begin_write()?;
            tx.execute(
                "INSERT INTO shopping_items (uuid, name, is_checked, created_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    item.id.to_string(),
                    item.name.as_str(),
                    bool_to_int(item.is_checked),
                    item.created_at,
                ],
            )?;
            tx.commit()?;
            Ok(item)
        })
    }

    fn update(&self, id: ItemId, patch: &ItemPatch) -> StoreResult<ShoppingItem> {
        traced("update", || {
            let tx = self.begin_write()?;
            let mut item = load_item(&tx, id)?.ok_or(StoreError::NotFound(id))?;
            item.apply(patch)?;

            if !patch.is_empty() {
                tx.execute(
                    "UPDATE shopping_items
                     SET
                        name = ?2,
                        is_checked = ?3
                     WHERE uuid = ?1;",
                    params![
                        id.to_string(),
                        item.name.as_str(),
                        bool_to_int(item.is_checked),
                    ],
                )?;
            }
            tx.commit()?;
            Ok(item)
        })
    }

    fn delete(&self, id: ItemId) -> StoreResult<()> {
        traced("delete", || {
            let tx = self.begin_write()?;
            delete_one(&tx, id)?;
            tx.commit()?;
            Ok(())
        })
    }

    fn delete_many(&self, ids: &[ItemId]) -> StoreResult<usize> {
        traced("delete_many", || {
            let unique: BTreeSet<ItemId> = ids.iter().copied().collect();
            let tx = self.begin_write()?;
            for id in &unique {
                delete_one(&tx, *id)?;
            }
            tx.commit()?;
            Ok(unique.len())
        })
    }

    fn delete_all(&self) -> StoreResult<usize> {
        traced("delete_all", || {
            let tx = self.begin_write()?;
            let removed = tx.execute("DELETE FROM shopping_items;", [])?;
            tx.commit()?;
            Ok(removed)
        })
    }

    fn get(&self, id: ItemId) -> StoreResult<Option<ShoppingItem>> {
        load_item(&self.conn, id)
    }

    fn list(&self) -> StoreResult<Vec<ShoppingItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL} ORDER BY name COLLATE BINARY ASC, seq ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }
}

fn traced<T>(op: &'static str, run: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
    let started_at = Instant::now();
    let result = run();
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => debug!("event=item_store module=repo op={op} status=ok duration_ms={duration_ms}"),
        Err(err) if err.is_persistence() => error!(
            "event=item_store module=repo op={op} status=error duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
        Err(err) => warn!(
            "event=item_store module=repo op={op} status=rejected duration_ms={duration_ms} error_code={}",
            err.code()
        ),
    }
    result
}

fn delete_one(conn: &Connection, id: ItemId) -> StoreResult<()> {
    let changed = conn.execute(
        "DELETE FROM shopping_items WHERE uuid = ?1;",
        [id.to_string()],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound(id));
    }
    Ok(())
}

fn load_item(conn: &Connection, id: ItemId) -> StoreResult<Option<ShoppingItem>> {
    let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
    let row = stmt
        .query_row([id.to_string()], |row| Ok(parse_item_row(row)))
        .optional()?;
    row.transpose()
}

fn parse_item_row(row: &Row<'_>) -> StoreResult<ShoppingItem> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in shopping_items.uuid"
        ))
    })?;

    let is_checked = match row.get::<_, i64>("is_checked")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_checked value `{other}` in shopping_items.is_checked"
            )));
        }
    };

    let item = ShoppingItem {
        id,
        name: row.get("name")?,
        is_checked,
        created_at: row.get("created_at")?,
    };
    item.validate().map_err(|err| {
        StoreError::InvalidData(format!("item {id} failed validation: {err}"))
    })?;
    Ok(item)
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, ITEMS_TABLE)? {
        return Err(StoreError::MissingRequiredTable(ITEMS_TABLE));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, ITEMS_TABLE, column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: ITEMS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
