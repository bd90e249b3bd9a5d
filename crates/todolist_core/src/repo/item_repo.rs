//! Todo item record store and SQLite transaction boundary.
//!
//! # Responsibility
//! - Provide point get/insert/update/delete and full scan over `todolist`.
//! - Run each unit of work in one transaction that either commits fully or
//!   rolls back fully.
//!
//! # Invariants
//! - Transactions begin `IMMEDIATE`, so the write lock is held before any
//!   row is read. Two writers can never compute shift bands from the same
//!   stale snapshot.
//! - The transaction guard rolls back on drop. A panic inside the action
//!   unwinds through it and leaves the table untouched.
//! - Full scans are ordered by `item_order ASC, id ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::{ItemId, ItemValidationError, TodoItem, TodoItemList};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    item,
    item_order
FROM todolist";

const REQUIRED_COLUMNS: [&str; 3] = ["id", "item", "item_order"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from record store and transaction boundary operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed validation before a write.
    Validation(ItemValidationError),
    /// Underlying SQLite error, including begin/commit/rollback failures.
    Db(DbError),
    /// No row with this id.
    NotFound(ItemId),
    /// Insert collided with an existing id.
    DuplicateId(ItemId),
    /// The unit of work was abandoned by its caller before commit.
    Cancelled,
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from the items table.
    MissingRequiredColumn(&'static str),
    /// Persisted row cannot be converted to a valid item.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::DuplicateId(id) => write!(f, "item already exists: {id}"),
            Self::Cancelled => write!(f, "transaction cancelled before commit"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "item store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "item store requires table `{table}`")
            }
            Self::MissingRequiredColumn(column) => {
                write!(f, "item store requires column `{column}` in table `todolist`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Shared flag that aborts a unit of work before it commits.
///
/// Cloned into blocking workers; the owner of the request fires it when the
/// request is dropped.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Record store primitives, scoped to one open transaction.
pub trait ItemTxn {
    /// Inserts one item. Fails with `DuplicateId` when the id exists.
    fn add(&self, item: &TodoItem) -> RepoResult<()>;
    /// Loads one item. Fails with `NotFound` when the id does not exist.
    fn get(&self, id: &str) -> RepoResult<TodoItem>;
    /// Overwrites text and position of one item.
    fn update(&self, item: &TodoItem) -> RepoResult<()>;
    /// Removes one item.
    fn delete(&self, id: &str) -> RepoResult<()>;
    /// Scans every item, ordered by position.
    fn list(&self) -> RepoResult<TodoItemList>;
}

/// Transaction boundary over an item store.
pub trait ItemStore {
    /// Runs `action` in one transaction.
    ///
    /// Commits when `action` returns `Ok`; otherwise rolls back and returns
    /// the action's error unchanged. Begin/commit failures are converted from
    /// `RepoError`.
    fn execute<T, E, F>(&self, action: F) -> Result<T, E>
    where
        F: FnOnce(&dyn ItemTxn) -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite-backed item store.
pub struct SqliteItemStore<'conn> {
    conn: &'conn Connection,
    cancellation: Option<Cancellation>,
}

impl<'conn> SqliteItemStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_item_connection_ready(conn)?;
        Ok(Self {
            conn,
            cancellation: None,
        })
    }

    /// Attaches a cancellation token checked before every commit.
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(Cancellation::is_cancelled)
    }
}

impl ItemStore for SqliteItemStore<'_> {
    fn execute<T, E, F>(&self, action: F) -> Result<T, E>
    where
        F: FnOnce(&dyn ItemTxn) -> Result<T, E>,
        E: From<RepoError>,
    {
        if self.is_cancelled() {
            return Err(RepoError::Cancelled.into());
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let result = action(&SqliteItemTxn { conn: &*tx });

        match result {
            Ok(value) => {
                if self.is_cancelled() {
                    warn!("event=txn_rollback module=repo status=cancelled");
                    tx.rollback().map_err(RepoError::from)?;
                    return Err(RepoError::Cancelled.into());
                }
                tx.commit().map_err(RepoError::from)?;
                debug!("event=txn_commit module=repo status=ok");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=txn_rollback module=repo status=error error={}",
                        rollback_err
                    );
                } else {
                    debug!("event=txn_rollback module=repo status=ok");
                }
                Err(err)
            }
        }
    }
}

/// Primitives bound to one open SQLite transaction.
struct SqliteItemTxn<'tx> {
    conn: &'tx Connection,
}

impl ItemTxn for SqliteItemTxn<'_> {
    fn add(&self, item: &TodoItem) -> RepoResult<()> {
        item.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO todolist (id, item, item_order) VALUES (?1, ?2, ?3);",
            params![item.id.as_str(), item.text.as_str(), item.position],
        );
        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Err(RepoError::DuplicateId(item.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get(&self, id: &str) -> RepoResult<TodoItem> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(RawItemRow::read(row)))
            .optional()?;
        match row {
            Some(raw) => raw?.into_item(),
            None => Err(RepoError::NotFound(id.to_string())),
        }
    }

    fn update(&self, item: &TodoItem) -> RepoResult<()> {
        item.validate()?;

        let changed = self.conn.execute(
            "UPDATE todolist
             SET item = ?1,
                 item_order = ?2
             WHERE id = ?3;",
            params![item.text.as_str(), item.position, item.id.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(item.id.clone()));
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM todolist WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn list(&self) -> RepoResult<TodoItemList> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "{ITEM_SELECT_SQL} ORDER BY item_order ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(RawItemRow::read(row)?.into_item()?);
        }
        Ok(TodoItemList::from_items(items))
    }
}

struct RawItemRow {
    id: String,
    text: String,
    position: i64,
}

impl RawItemRow {
    fn read(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            text: row.get("item")?,
            position: row.get("item_order")?,
        })
    }

    fn into_item(self) -> RepoResult<TodoItem> {
        let item = TodoItem::with_id(self.id, self.text, self.position);
        item.validate().map_err(|err| {
            RepoError::InvalidData(format!("row `{}` in todolist: {err}", item.id))
        })?;
        Ok(item)
    }
}

fn ensure_item_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "todolist")? {
        return Err(RepoError::MissingRequiredTable("todolist"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "todolist", column)? {
            return Err(RepoError::MissingRequiredColumn(column));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
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

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
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
