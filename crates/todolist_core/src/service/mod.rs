//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store calls into use-case level APIs.
//! - Own the order maintenance algorithm.
//! - Keep HTTP layers decoupled from storage details.

pub mod item_service;
pub mod order_engine;
