// WizCare - HTTP surface
// Lets a chat UI dispatch turns and read tier/alert snapshots

mod handlers;
mod session;

pub use handlers::{create_router, AppError, MessageRequest, SessionSnapshot, TurnResponse};
pub use session::{SessionError, SessionManager, SessionState};

pub use crate::config::ServerConfig;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::emotion::EmotionAnalyzer;
use crate::engine::ChatEngine;
use crate::metrics::Metrics;

/// Shared state behind every route
pub struct WellbeingServer {
    engine: Arc<ChatEngine>,
    session_manager: Arc<SessionManager>,
    emotion: EmotionAnalyzer,
    metrics: Metrics,
    started_at: Instant,
    config: ServerConfig,
}

impl WellbeingServer {
    pub fn new(engine: ChatEngine, metrics: Metrics, config: ServerConfig) -> Self {
        let session_manager =
            SessionManager::new(config.max_sessions, config.session_timeout_minutes);

        Self {
            engine: Arc::new(engine.with_metrics(metrics.clone())),
            session_manager: Arc::new(session_manager),
            emotion: EmotionAnalyzer::new(),
            metrics,
            started_at: Instant::now(),
            config,
        }
    }

    /// Start the HTTP server
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.config.bind_address))?;

        let cleanup = self.session_manager.start_cleanup_task();
        let app = create_router(Arc::new(self))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        tracing::info!("Starting WizCare server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        let result = axum::serve(listener, app).await;
        cleanup.abort();
        result.context("Server error")?;

        Ok(())
    }

    pub fn engine(&self) -> &Arc<ChatEngine> {
        &self.engine
    }

    pub fn session_manager(&self) -> &Arc<SessionManager> {
        &self.session_manager
    }

    pub fn emotion(&self) -> &EmotionAnalyzer {
        &self.emotion
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
