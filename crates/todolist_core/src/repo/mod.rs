//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record store primitives and the transaction boundary.
//! - Isolate SQLite query details from ordering and service orchestration.
//!
//! # Invariants
//! - Every primitive runs inside a caller-provided transaction.
//! - Point primitives return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod item_repo;
