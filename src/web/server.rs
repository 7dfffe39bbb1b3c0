//! Web server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::ServerConfig;
use crate::oauth::CredentialStore;
use crate::{HandoverError, Result};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// How often idle sessions are swept.
const SESSION_CLEANUP_INTERVAL_SECS: u64 = 600;

/// HTTP server for the pages.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    session_idle: chrono::Duration,
}

impl WebServer {
    pub fn new(config: &ServerConfig, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| {
                HandoverError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    config.host, config.port
                ))
            })?;

        let session_idle = chrono::Duration::from_std(Duration::from_secs(config.session_idle_secs))
            .unwrap_or(chrono::Duration::MAX);

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            session_idle,
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the session cleanup background task.
    ///
    /// Every few minutes this drops sessions unused for longer than
    /// `max_idle`, including abandoned logins whose cookie never came back.
    fn start_session_cleanup_task(sessions: CredentialStore, max_idle: chrono::Duration) {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(SESSION_CLEANUP_INTERVAL_SECS));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                let count = sessions.cleanup_expired(max_idle).await;
                if count > 0 {
                    tracing::info!(deleted_count = count, "Cleaned up idle sessions");
                } else {
                    tracing::debug!("No idle sessions to clean up");
                }
            }
        });
    }

    fn router(self) -> Router {
        create_router(self.app_state)
            .merge(create_health_router())
            .layer(CompressionLayer::new())
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        Self::start_session_cleanup_task(self.app_state.sessions.clone(), self.session_idle);

        axum::serve(listener, self.router()).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        Self::start_session_cleanup_task(self.app_state.sessions.clone(), self.session_idle);

        let router = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
