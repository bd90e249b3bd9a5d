//! Todo item use-case service.
//!
//! # Responsibility
//! - Expose add/get/update/delete/list/move entry points for callers.
//! - Run every use case in exactly one transaction.
//!
//! # Invariants
//! - New items are appended at `count + 1`, counted inside the same
//!   transaction as the insert.
//! - Update changes text only. Positions change through `move_item` and
//!   delete re-densification only.
//! - Delete closes the gap it leaves, so positions stay `1..=N`.

use crate::model::item::{ItemId, ItemValidationError, TodoItem, TodoItemList};
use crate::repo::item_repo::{ItemStore, RepoError};
use crate::service::order_engine::{close_gap, move_within};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from item service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Caller input failed record validation.
    Validation(ItemValidationError),
    /// Target item does not exist.
    NotFound(ItemId),
    /// Insert collided with an existing id.
    DuplicateId(ItemId),
    /// Caller's view of the mover's position is out of date.
    StalePosition {
        id: ItemId,
        expected: i64,
        actual: i64,
    },
    /// A row in the shift band could not be written; nothing was committed.
    UpdateFailed { id: ItemId, source: RepoError },
    /// Begin/commit/rollback or other storage failure.
    TransactionFailed(RepoError),
    /// Caller abandoned the request; the transaction was rolled back.
    Cancelled,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::DuplicateId(id) => write!(f, "item already exists: {id}"),
            Self::StalePosition {
                id,
                expected,
                actual,
            } => write!(
                f,
                "item {id} is at position {actual}, caller expected {expected}"
            ),
            Self::UpdateFailed { id, source } => {
                write!(f, "failed to reposition item {id}: {source}")
            }
            Self::TransactionFailed(err) => write!(f, "transaction failed: {err}"),
            Self::Cancelled => write!(f, "request cancelled; changes rolled back"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::UpdateFailed { source, .. } => Some(source),
            Self::TransactionFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::DuplicateId(id) => Self::DuplicateId(id),
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::Cancelled => Self::Cancelled,
            other => Self::TransactionFailed(other),
        }
    }
}

impl From<ItemValidationError> for ServiceError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Item service facade.
pub struct ItemService<S: ItemStore> {
    store: S,
}

impl<S: ItemStore> ItemService<S> {
    /// Creates a service over the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends a new item at the end of the list.
    ///
    /// A fresh UUIDv4 id is generated when `id` is `None`.
    pub fn add_item(&self, text: impl Into<String>, id: Option<ItemId>) -> ServiceResult<TodoItem> {
        let text = text.into();
        let item = self
            .store
            .execute(|txn| -> ServiceResult<TodoItem> {
                let position = txn.list()?.count as i64 + 1;
                let item = match id {
                    Some(id) => TodoItem::with_id(id, text, position),
                    None => TodoItem::new(text, position),
                };
                item.validate()?;
                txn.add(&item)?;
                Ok(item)
            })?;
        info!(
            "event=item_add module=service status=ok position={}",
            item.position
        );
        Ok(item)
    }

    /// Loads one item by id.
    pub fn get_item(&self, id: &str) -> ServiceResult<TodoItem> {
        self.store
            .execute(|txn| -> ServiceResult<TodoItem> { Ok(txn.get(id)?) })
    }

    /// Replaces the text of one item, keeping its id and position.
    pub fn update_item(&self, id: &str, text: impl Into<String>) -> ServiceResult<TodoItem> {
        let text = text.into();
        self.store.execute(|txn| -> ServiceResult<TodoItem> {
            let mut item = txn.get(id)?;
            item.text = text;
            txn.update(&item)?;
            Ok(item)
        })
    }

    /// Deletes one item and shifts every later item up by one slot.
    ///
    /// Returns the removed item.
    pub fn delete_item(&self, id: &str) -> ServiceResult<TodoItem> {
        let (removed, shifted) = self
            .store
            .execute(|txn| -> ServiceResult<(TodoItem, usize)> {
                let removed = txn.get(id)?;
                txn.delete(id)?;
                let shifted = close_gap(txn, removed.position)?;
                Ok((removed, shifted))
            })?;
        info!(
            "event=item_delete module=service status=ok position={} shifted={}",
            removed.position, shifted
        );
        Ok(removed)
    }

    /// Scans the full list ordered by position.
    pub fn list_items(&self) -> ServiceResult<TodoItemList> {
        self.store
            .execute(|txn| -> ServiceResult<TodoItemList> { Ok(txn.list()?) })
    }

    /// Moves one item to `target`, shifting its neighbors to keep positions
    /// dense. The whole re-numbering commits or none of it does.
    ///
    /// `target` is reconciled against the list bounds. `expected_start`, when
    /// given, must match the stored position.
    pub fn move_item(
        &self,
        id: &str,
        target: i64,
        expected_start: Option<i64>,
    ) -> ServiceResult<TodoItem> {
        self.store.execute(|txn| -> ServiceResult<TodoItem> {
            move_within(txn, id, target, expected_start)
        })
    }
}
