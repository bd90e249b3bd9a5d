use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;
use log::{info, warn};
use tokio::net::TcpListener;

/// Todo list HTTP server.
pub struct TodoServer {
    config: ServerConfig,
    state: AppState,
}

impl TodoServer {
    /// Opens the configured database and prepares shared state.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let state = AppState::open(&config.db_path)?;
        Ok(Self { config, state })
    }

    /// Create server with existing state (in-memory databases, tests).
    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Serve requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(
            "event=server_start module=server status=ok bind_addr={} db_path={}",
            self.config.bind_addr,
            self.config.db_path.display()
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("event=server_stop module=server status=ok");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=shutdown_signal module=server status=error error={err}");
    }
}
