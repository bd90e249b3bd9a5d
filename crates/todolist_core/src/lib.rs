//! Core domain logic for the ordered todo list.
//! This crate is the single source of truth for ordering invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogDestination};
pub use model::item::{ItemId, ItemValidationError, TodoItem, TodoItemList};
pub use repo::item_repo::{
    Cancellation, ItemStore, ItemTxn, RepoError, RepoResult, SqliteItemStore,
};
pub use service::item_service::{ItemService, ServiceError, ServiceResult};
pub use service::order_engine::{plan_move, MovePlan, PositionChange};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
