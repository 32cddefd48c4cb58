//! Folio API Server
//!
//! The HTTP backend of the Folio portfolio: an auth gateway and a project
//! store proxy in front of a hosted database.
//!
//! # Architecture
//!
//! - **Routes**: HTTP endpoint definitions
//! - **Handlers**: Request extraction and response shaping
//! - **Services**: Credential, identity, project and upload logic
//! - **Store**: Ports to the persistence collaborator and their adapters
//! - **Middleware**: Authentication, authorization and CORS
//!
//! A request to a protected route passes the credential validator, then the
//! identity resolver, then the authorization check before the store is
//! touched.

#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routes;
pub mod services;
pub mod shutdown;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::Router;
use shutdown::ShutdownCoordinator;
use std::future::IntoFuture;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Server builder for constructing and running the API server.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self, anyhow::Error> {
        let state = AppState::new(&config)?;
        Ok(Self { config, state })
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }

    /// Run the server until SIGINT or SIGTERM, then drain in-flight requests
    /// for at most the configured shutdown timeout.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, backend = ?self.config.backend.kind, "Server listening");

        let coordinator = ShutdownCoordinator::new(self.config.server.shutdown_timeout());
        coordinator.listen_for_signals();

        let serve = axum::serve(listener, self.router())
            .with_graceful_shutdown(coordinator.wait())
            .into_future();

        tokio::select! {
            result = serve => result?,
            _ = coordinator.drain_deadline() => {
                warn!(
                    timeout_secs = coordinator.timeout().as_secs(),
                    "Drain timed out, dropping in-flight requests"
                );
            }
        }

        Ok(())
    }

    /// Get the server's socket address.
    pub fn addr(&self) -> Result<SocketAddr, config::ConfigError> {
        self.config.socket_addr()
    }
}
