//! Domain model for the ordered todo list.
//!
//! # Responsibility
//! - Define the item record shared by storage, ordering and HTTP layers.
//! - Keep list snapshots as plain read models rebuilt on every scan.
//!
//! # Invariants
//! - Every item is identified by an immutable id string.
//! - Positions across one list are exactly `1..=N`.

pub mod item;
