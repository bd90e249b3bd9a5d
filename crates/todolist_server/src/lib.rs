//! HTTP surface for the ordered todo list.
//!
//! Handlers are glue: they decode requests, run one service call on a
//! blocking worker, and encode the result.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{AppError, AppResult, ServerError, ServerResult};
pub use router::build_router;
pub use server::TodoServer;
pub use state::AppState;
