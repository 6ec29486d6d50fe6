// HTTP request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::session::{SessionError, SessionState};
use super::WellbeingServer;
use crate::crisis::AlertView;
use crate::emotion::EmotionReport;
use crate::errors::TurnError;
use crate::session::{Message, TurnCommit};

/// Create the main application router
pub fn create_router(server: Arc<WellbeingServer>) -> Router {
    Router::new()
        .route("/v1/sessions", post(create_session))
        .route("/v1/sessions/:id", get(get_session).delete(delete_session))
        .route("/v1/sessions/:id/messages", post(send_message))
        .route("/v1/sessions/:id/reset", post(reset_session))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .with_state(server)
}

/// Request body for a turn: `{ "message": ... }`
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

/// Everything a renderer needs about one session
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub created_at: String,
    pub last_activity: String,
    pub messages: Vec<Message>,
    pub turn_pending: bool,
    pub alert: AlertView,
}

impl SessionSnapshot {
    fn new(state: &SessionState, server: &WellbeingServer) -> Self {
        Self {
            id: state.id.clone(),
            created_at: state.created_at.to_rfc3339(),
            last_activity: state.last_activity.to_rfc3339(),
            messages: state.conversation.messages().to_vec(),
            turn_pending: state.conversation.is_turn_pending(),
            alert: server.engine().alert_view(&state.conversation),
        }
    }
}

/// Result of one turn
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub session_id: String,
    /// Assistant text appended this turn (reply or fallback)
    pub reply: Option<String>,
    /// Error kind when fallback text was used
    pub fallback: Option<&'static str>,
    /// The session was reset or deleted before the reply arrived
    pub discarded: bool,
    pub alert: Option<AlertView>,
    pub emotion: EmotionReport,
}

/// Handle POST /v1/sessions - start a new chat
async fn create_session(
    State(server): State<Arc<WellbeingServer>>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let state = server
        .session_manager()
        .create(server.engine().new_session())?;
    server
        .metrics()
        .set_active_sessions(server.session_manager().active_count());

    Ok((StatusCode::CREATED, Json(SessionSnapshot::new(&state, &server))))
}

/// Handle GET /v1/sessions/:id
async fn get_session(
    State(server): State<Arc<WellbeingServer>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let state = server.session_manager().get(&session_id)?;
    Ok(Json(SessionSnapshot::new(&state, &server)))
}

/// Handle POST /v1/sessions/:id/messages - run one turn
async fn send_message(
    State(server): State<Arc<WellbeingServer>>,
    Path(session_id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let engine = Arc::clone(server.engine());
    let pending = server.session_manager().with_session(&session_id, |state| {
        engine.begin(&mut state.conversation, &request.message)
    })??;

    // The rest of the turn runs detached so it still commits if the client
    // goes away. No session guard is held while the backend works.
    let manager = Arc::clone(server.session_manager());
    let metrics = server.metrics().clone();
    let id = session_id.clone();
    let completion = tokio::spawn(async move {
        let reply = engine.fetch_reply(&pending).await;
        let finished = manager.with_session(&id, |state| {
            let commit = engine.finish(&mut state.conversation, pending, reply);
            (commit, engine.alert_view(&state.conversation))
        });
        if let Err(SessionError::NotFound(_)) = &finished {
            tracing::info!(session_id = %id, "Session ended before reply arrived");
            metrics.record_turn("discarded");
        }
        finished
    });

    let finished = completion
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Turn task failed: {}", e)))?;

    let emotion = server.emotion().analyze(&request.message);
    let response = match finished {
        Ok((TurnCommit::Committed(turn), alert)) => TurnResponse {
            session_id,
            reply: Some(turn.assistant_message.text),
            fallback: turn.error.as_ref().map(TurnError::kind),
            discarded: false,
            alert: Some(alert),
            emotion,
        },
        Ok((TurnCommit::Discarded, alert)) => TurnResponse {
            session_id,
            reply: None,
            fallback: None,
            discarded: true,
            alert: Some(alert),
            emotion,
        },
        Err(SessionError::NotFound(_)) => TurnResponse {
            session_id,
            reply: None,
            fallback: None,
            discarded: true,
            alert: None,
            emotion,
        },
        Err(e) => return Err(e.into()),
    };

    Ok(Json(response))
}

/// Handle POST /v1/sessions/:id/reset - new chat on the same id
async fn reset_session(
    State(server): State<Arc<WellbeingServer>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let state = server.session_manager().with_session(&session_id, |state| {
        state.conversation.reset();
        state.clone()
    })?;
    tracing::info!(session_id = %session_id, "Session reset");

    Ok(Json(SessionSnapshot::new(&state, &server)))
}

/// Handle DELETE /v1/sessions/:id - logout
async fn delete_session(
    State(server): State<Arc<WellbeingServer>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if server.session_manager().delete(&session_id) {
        server
            .metrics()
            .set_active_sessions(server.session_manager().active_count());
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(SessionError::NotFound(session_id).into())
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
}

/// Handle GET /health
async fn health_check(State(server): State<Arc<WellbeingServer>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        uptime_seconds: server.uptime_seconds(),
        active_sessions: server.session_manager().active_count(),
    })
}

/// Handle GET /metrics - Prometheus metrics endpoint
async fn metrics_endpoint(
    State(server): State<Arc<WellbeingServer>>,
) -> Result<Response, AppError> {
    server
        .metrics()
        .set_active_sessions(server.session_manager().active_count());
    let body = server.metrics().render()?;

    Ok((StatusCode::OK, body).into_response())
}

/// Application error wrapper for proper HTTP error responses
#[derive(Debug)]
pub enum AppError {
    Turn(TurnError),
    Session(SessionError),
    Internal(anyhow::Error),
}

impl AppError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Turn(TurnError::InvalidInput) => (StatusCode::BAD_REQUEST, "invalid_input"),
            AppError::Turn(TurnError::TurnInProgress) => (StatusCode::CONFLICT, "turn_in_progress"),
            AppError::Turn(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.kind()),
            AppError::Session(SessionError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Session(SessionError::Capacity { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "capacity")
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();
        let message = match &self {
            AppError::Turn(e) => e.to_string(),
            AppError::Session(e) => e.to_string(),
            AppError::Internal(e) => e.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        } else {
            tracing::debug!(error = %message, "Request rejected");
        }

        let body = serde_json::json!({
            "error": {
                "message": message,
                "type": error_type
            }
        });

        (status, Json(body)).into_response()
    }
}

impl From<TurnError> for AppError {
    fn from(err: TurnError) -> Self {
        AppError::Turn(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Session(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
