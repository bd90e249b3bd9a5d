//! Todo item domain model.
//!
//! # Responsibility
//! - Define the canonical item record and list snapshot.
//! - Provide validation used by repository write paths.
//!
//! # Invariants
//! - `id` is stable and never reassigned once persisted.
//! - `position` is 1-indexed; `0` and negatives are never stored.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque item identifier.
pub type ItemId = String;

/// Validation errors for item records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// Id is empty or whitespace only.
    BlankId,
    /// Position is below the first slot.
    PositionOutOfRange(i64),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "item id must not be blank"),
            Self::PositionOutOfRange(position) => {
                write!(f, "item position must be >= 1, got {position}")
            }
        }
    }
}

impl Error for ItemValidationError {}

/// One entry of the todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    #[serde(alias = "Id")]
    pub id: ItemId,
    /// Free-form item text. Older clients send it as `item`.
    #[serde(alias = "item", alias = "Item")]
    pub text: String,
    /// 1-indexed rank within the list.
    #[serde(alias = "order", alias = "Order", alias = "item_order")]
    pub position: i64,
}

impl TodoItem {
    /// Creates an item with a generated UUIDv4 id.
    pub fn new(text: impl Into<String>, position: i64) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), text, position)
    }

    /// Creates an item with a caller-provided id.
    pub fn with_id(id: impl Into<ItemId>, text: impl Into<String>, position: i64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            position,
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id.trim().is_empty() {
            return Err(ItemValidationError::BlankId);
        }
        if self.position < 1 {
            return Err(ItemValidationError::PositionOutOfRange(self.position));
        }
        Ok(())
    }
}

/// Ordered snapshot produced by a full scan. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItemList {
    pub items: Vec<TodoItem>,
    pub count: usize,
}

impl TodoItemList {
    /// Builds a snapshot, deriving `count` from the items.
    pub fn from_items(items: Vec<TodoItem>) -> Self {
        let count = items.len();
        Self { items, count }
    }

    /// Returns `true` when positions are exactly `1..=count`, each used once.
    pub fn is_dense(&self) -> bool {
        let mut positions: Vec<i64> = self.items.iter().map(|item| item.position).collect();
        positions.sort_unstable();
        positions
            .iter()
            .enumerate()
            .all(|(index, position)| *position == index as i64 + 1)
    }

    /// Looks up an item by id.
    pub fn find(&self, id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemValidationError, TodoItem, TodoItemList};

    #[test]
    fn validate_rejects_blank_id_and_zero_position() {
        let blank = TodoItem::with_id("  ", "text", 1);
        assert_eq!(blank.validate(), Err(ItemValidationError::BlankId));

        let zero = TodoItem::with_id("a", "text", 0);
        assert_eq!(
            zero.validate(),
            Err(ItemValidationError::PositionOutOfRange(0))
        );
    }

    #[test]
    fn new_generates_distinct_ids() {
        let first = TodoItem::new("one", 1);
        let second = TodoItem::new("two", 2);
        assert_ne!(first.id, second.id);
        assert!(first.validate().is_ok());
    }

    #[test]
    fn is_dense_detects_gaps_and_duplicates() {
        let dense = TodoItemList::from_items(vec![
            TodoItem::with_id("b", "", 2),
            TodoItem::with_id("a", "", 1),
        ]);
        assert!(dense.is_dense());

        let gap = TodoItemList::from_items(vec![
            TodoItem::with_id("a", "", 1),
            TodoItem::with_id("b", "", 3),
        ]);
        assert!(!gap.is_dense());

        let duplicate = TodoItemList::from_items(vec![
            TodoItem::with_id("a", "", 1),
            TodoItem::with_id("b", "", 1),
        ]);
        assert!(!duplicate.is_dense());

        assert!(TodoItemList::default().is_dense());
    }

    #[test]
    fn deserializes_legacy_field_names() {
        let item: TodoItem =
            serde_json::from_str(r#"{"Id":"x","Item":"buy milk","Order":3}"#).unwrap();
        assert_eq!(item, TodoItem::with_id("x", "buy milk", 3));
    }
}
