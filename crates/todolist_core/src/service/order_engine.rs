//! Order maintenance for the todo list.
//!
//! # Responsibility
//! - Compute the position rewrites needed to move one item.
//! - Apply those rewrites, and delete re-densification, inside the
//!   caller's transaction.
//!
//! # Invariants
//! - The mover lands exactly at the requested position, clamped to `1..=N`.
//! - Moving down (`start < end`) shifts `(start, end]` up by one slot
//!   (position - 1). Moving up (`start > end`) shifts `[end, start)` down by
//!   one slot (position + 1).
//! - Items outside the shift band are never written.
//! - After any plan is applied positions are exactly `1..=N` again.

use crate::model::item::{ItemId, TodoItem, TodoItemList};
use crate::repo::item_repo::{ItemTxn, RepoError};
use crate::service::item_service::{ServiceError, ServiceResult};
use log::info;
use std::collections::HashMap;

/// One position rewrite produced by a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionChange {
    pub id: ItemId,
    pub from: i64,
    pub to: i64,
}

/// Rewrites required to move one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// The moving item's own rewrite.
    pub mover: PositionChange,
    /// Neighbors in the shift band, in ascending original position.
    pub shifts: Vec<PositionChange>,
}

impl MovePlan {
    pub fn is_noop(&self) -> bool {
        self.mover.from == self.mover.to
    }
}

/// Reconciles a requested position against the current list bounds.
pub fn clamp_target(target: i64, count: usize) -> i64 {
    let last = i64::try_from(count).unwrap_or(i64::MAX).max(1);
    target.clamp(1, last)
}

/// Plans moving `item_id` to `target` within `list`.
///
/// Returns `None` when `item_id` is not part of the snapshot.
pub fn plan_move(list: &TodoItemList, item_id: &str, target: i64) -> Option<MovePlan> {
    let start = list.find(item_id)?.position;
    let end = clamp_target(target, list.count);

    let shifts = list
        .items
        .iter()
        .filter(|item| item.id != item_id)
        .filter_map(|item| {
            let to = if start < end && item.position > start && item.position <= end {
                item.position - 1
            } else if start > end && item.position >= end && item.position < start {
                item.position + 1
            } else {
                return None;
            };
            Some(PositionChange {
                id: item.id.clone(),
                from: item.position,
                to,
            })
        })
        .collect();

    Some(MovePlan {
        mover: PositionChange {
            id: item_id.to_string(),
            from: start,
            to: end,
        },
        shifts,
    })
}

/// Plans closing the hole left by an item removed from `removed_position`.
pub fn plan_close_gap(list: &TodoItemList, removed_position: i64) -> Vec<PositionChange> {
    list.items
        .iter()
        .filter(|item| item.position > removed_position)
        .map(|item| PositionChange {
            id: item.id.clone(),
            from: item.position,
            to: item.position - 1,
        })
        .collect()
}

/// Moves one item inside an open transaction and returns it at its new slot.
///
/// When `expected_start` is given and the stored position differs, the move
/// is refused with `StalePosition` before anything is written.
pub fn move_within(
    txn: &dyn ItemTxn,
    item_id: &str,
    target: i64,
    expected_start: Option<i64>,
) -> ServiceResult<TodoItem> {
    let mut item = txn.get(item_id)?;
    if let Some(expected) = expected_start {
        if expected != item.position {
            return Err(ServiceError::StalePosition {
                id: item.id,
                expected,
                actual: item.position,
            });
        }
    }

    let list = txn.list()?;
    let plan =
        plan_move(&list, item_id, target).ok_or_else(|| ServiceError::NotFound(item_id.into()))?;
    if plan.is_noop() {
        return Ok(item);
    }

    apply_changes(txn, &list, &plan.shifts)?;

    item.position = plan.mover.to;
    txn.update(&item).map_err(|err| update_failed(&item.id, err))?;

    info!(
        "event=item_move module=order status=ok from={} to={} shifted={}",
        plan.mover.from,
        plan.mover.to,
        plan.shifts.len()
    );
    Ok(item)
}

/// Re-densifies positions after an item at `removed_position` was deleted.
///
/// Returns how many items were shifted.
pub fn close_gap(txn: &dyn ItemTxn, removed_position: i64) -> ServiceResult<usize> {
    let list = txn.list()?;
    let changes = plan_close_gap(&list, removed_position);
    apply_changes(txn, &list, &changes)?;
    Ok(changes.len())
}

fn apply_changes(
    txn: &dyn ItemTxn,
    list: &TodoItemList,
    changes: &[PositionChange],
) -> ServiceResult<()> {
    let texts: HashMap<&str, &str> = list
        .items
        .iter()
        .map(|item| (item.id.as_str(), item.text.as_str()))
        .collect();

    for change in changes {
        let text = texts
            .get(change.id.as_str())
            .copied()
            .ok_or_else(|| update_failed(&change.id, RepoError::NotFound(change.id.clone())))?;
        let record = TodoItem::with_id(change.id.clone(), text, change.to);
        txn.update(&record)
            .map_err(|err| update_failed(&change.id, err))?;
    }
    Ok(())
}

fn update_failed(id: &str, source: RepoError) -> ServiceError {
    ServiceError::UpdateFailed {
        id: id.to_string(),
        source,
    }
}
