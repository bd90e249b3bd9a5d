//! Shared handler state and the blocking bridge into the item service.
//!
//! # Invariants
//! - One SQLite connection per process, used by one worker at a time.
//! - Each service call runs on a blocking worker inside one transaction.
//! - Dropping the request future before the worker finishes fires the
//!   store's cancellation token; the worker then rolls back instead of
//!   committing a result nobody will observe.

use crate::error::{AppError, AppResult, ServerResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use todolist_core::db::open_db;
use todolist_core::{Cancellation, ItemService, ServiceResult, SqliteItemStore};

#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: &Path) -> ServerResult<Self> {
        let conn = open_db(path)?;
        SqliteItemStore::try_new(&conn)?;
        Ok(Self::new(conn))
    }

    /// Runs `op` against a fresh item service on a blocking worker.
    pub async fn run<T, F>(&self, op: F) -> AppResult<T>
    where
        F: FnOnce(&ItemService<SqliteItemStore<'_>>) -> ServiceResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let cancellation = Cancellation::new();
        let guard = CancelOnDrop::new(cancellation.clone());
        let conn = Arc::clone(&self.conn);

        let joined = tokio::task::spawn_blocking(move || -> AppResult<T> {
            // A panic mid-transaction poisons the lock, but the transaction
            // guard has already rolled back, so the connection is clean.
            let conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            let store = SqliteItemStore::try_new(&conn)?.with_cancellation(cancellation);
            let service = ItemService::new(store);
            Ok(op(&service)?)
        })
        .await;
        guard.disarm();

        joined.map_err(|err| AppError::Internal(format!("blocking worker failed: {err}")))?
    }
}

struct CancelOnDrop {
    cancellation: Option<Cancellation>,
}

impl CancelOnDrop {
    fn new(cancellation: Cancellation) -> Self {
        Self {
            cancellation: Some(cancellation),
        }
    }

    fn disarm(mut self) {
        self.cancellation = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(cancellation) = self.cancellation.take() {
            cancellation.cancel();
        }
    }
}
