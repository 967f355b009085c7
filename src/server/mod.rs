pub mod connections;
pub mod handler;
pub mod jsonrpc;
pub mod transport;

use crate::client::RadioSearch;
use crate::service::{discovery, health};
use crate::{Config, Error, Result};
use axum::routing::get;
use axum::Router;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use connections::ConnectionRegistry;
pub use handler::RadioServerHandler;
pub use transport::{AppState, MCP_PATH};

pub struct Server {
    state: AppState,
    cancellation_token: CancellationToken,
}

impl Server {
    /// Create a server talking to the configured radio directory
    pub fn new(config: Config) -> Result<Self> {
        let handler = RadioServerHandler::new(&config)?;
        Ok(Self::from_handler(config, handler))
    }

    /// Create a server around a custom search backend
    pub fn with_backend(config: Config, backend: Arc<dyn RadioSearch>) -> Self {
        let handler = RadioServerHandler::with_backend(backend, &config);
        Self::from_handler(config, handler)
    }

    fn from_handler(config: Config, handler: RadioServerHandler) -> Self {
        Self {
            state: AppState {
                handler: Arc::new(handler),
                connections: ConnectionRegistry::new(),
                config: Arc::new(config),
            },
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Assemble all routes
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(health::health_handler))
            .route(
                "/.well-known/oauth-authorization-server",
                get(discovery::authorization_server_handler),
            )
            .route(
                "/.well-known/oauth-protected-resource",
                get(discovery::protected_resource_handler),
            )
            .route(
                MCP_PATH,
                get(transport::sse_handler).post(transport::post_handler),
            )
            .with_state(self.state.clone())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(&self) -> Result<()> {
        let addr = self.config().bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Service(format!("Failed to bind {addr}: {e}")))?;

        self.spawn_signal_listener();
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!("MCP server listening on http://{}{}", local_addr, MCP_PATH);

        let token = self.cancellation_token.clone();
        let connections = self.state.connections.clone();
        let shutdown = async move {
            token.cancelled().await;
            info!("Shutdown signal received, closing SSE connections");
            connections.close_all();
        };

        let serve = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .into_future();

        let grace = Duration::from_secs(self.config().server.graceful_shutdown_timeout_secs);
        let token = self.cancellation_token.clone();
        let deadline = async move {
            token.cancelled().await;
            tokio::time::sleep(grace).await;
        };

        tokio::select! {
            result = serve => {
                result.map_err(|e| Error::Service(format!("MCP server error: {e}")))?;
            }
            () = deadline => {
                warn!("Graceful shutdown timeout exceeded, forcing shutdown");
            }
        }

        info!("MCP server shutdown complete");
        Ok(())
    }

    fn spawn_signal_listener(&self) {
        let shutdown_token = self.cancellation_token.clone();
        tokio::spawn(async move {
            let ctrl_c = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for SIGINT: {}", e);
                    std::future::pending::<()>().await;
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        warn!("Failed to listen for SIGTERM: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                () = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
                () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
            }

            shutdown_token.cancel();
        });
    }

    pub fn shutdown(&self) {
        warn!("Initiating server shutdown");
        self.cancellation_token.cancel();
    }

    /// Check if the server has been requested to shutdown
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    #[must_use]
    pub fn connections(&self) -> &ConnectionRegistry {
        &self.state.connections
    }
}
