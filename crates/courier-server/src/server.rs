use std::future::Future;
use std::sync::Arc;

use courier_db::Services;
use tokio::net::TcpListener;

use crate::auth::AuthProvider;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Courier HTTP server.
pub struct CourierServer {
    config: ServerConfig,
    state: AppState,
}

impl CourierServer {
    pub fn new(config: ServerConfig, services: Services, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            config,
            state: AppState::new(services, auth),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn services(&self) -> &Services {
        &self.state.services
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.max_body_bytes)
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "courier server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        tracing::info!("courier server stopped");
        Ok(())
    }
}
