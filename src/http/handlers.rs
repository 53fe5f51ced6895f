use super::state::AppState;
use crate::audio::AudioFile;
use crate::intake::VoiceOutcome;
use crate::session::{Question, QuestionnaireSession, SessionView, SnapshotEntry};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SetAnswerRequest {
    /// Question label (defaults to the current question)
    pub label: Option<String>,

    /// Raw answer text, stored as given
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub view: SessionView,
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub moved: bool,
    pub view: SessionView,
}

#[derive(Debug, Serialize)]
pub struct VoiceAnswerResponse {
    pub outcome: VoiceOutcome,
    pub message: String,
    pub view: SessionView,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn session_not_found(session_id: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Session {} not found", session_id),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions
/// Start a new questionnaire session at the first question
pub async fn create_session(State(state): State<AppState>) -> Response {
    let session = match QuestionnaireSession::new(state.questions.as_ref().clone()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create session: {:#}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create session: {}", e),
            );
        }
    };

    let session_id = format!("intake-{}", uuid::Uuid::new_v4());
    let view = SessionView::render(&session);

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id.clone(), session);
    }

    info!("Created questionnaire session: {}", session_id);

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse { session_id, view }),
    )
        .into_response()
}

/// GET /sessions/:session_id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => (StatusCode::OK, Json(SessionView::render(session))).into_response(),
        None => session_not_found(&session_id),
    }
}

/// DELETE /sessions/:session_id
/// Discard a session and its answers
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let removed = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id)
    };

    match removed {
        Some(_) => {
            info!("Discarded questionnaire session: {}", session_id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// PUT /sessions/:session_id/answer
/// Store an answer for the current (or a named) question
pub async fn set_answer(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SetAnswerRequest>,
) -> Response {
    let mut sessions = state.sessions.write().await;

    let Some(session) = sessions.get_mut(&session_id) else {
        return session_not_found(&session_id);
    };

    let label = match req.label {
        Some(label) => {
            if session.question(&label).is_none() {
                return error_response(
                    StatusCode::NOT_FOUND,
                    format!("Question '{}' not found", label),
                );
            }
            label
        }
        None => session.current_question().label.clone(),
    };

    session.set_answer(label, req.value);

    (StatusCode::OK, Json(SessionView::render(session))).into_response()
}

/// POST /sessions/:session_id/next
pub async fn next_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    navigate(state, session_id, QuestionnaireSession::advance).await
}

/// POST /sessions/:session_id/previous
pub async fn previous_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    navigate(state, session_id, QuestionnaireSession::retreat).await
}

async fn navigate(
    state: AppState,
    session_id: String,
    step: fn(&mut QuestionnaireSession) -> bool,
) -> Response {
    let mut sessions = state.sessions.write().await;

    match sessions.get_mut(&session_id) {
        Some(session) => {
            let moved = step(session);
            let view = SessionView::render(session);
            (StatusCode::OK, Json(NavigationResponse { moved, view })).into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// POST /sessions/:session_id/voice
/// Answer the current question from an uploaded WAV recording
pub async fn voice_answer(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Response {
    let Some(assistant) = state.assistant.clone() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Voice answers are not configured".to_string(),
        );
    };

    let question: Question = {
        let sessions = state.sessions.read().await;
        match sessions.get(&session_id) {
            Some(session) => session.current_question().clone(),
            None => return session_not_found(&session_id),
        }
    };

    let decoded = AudioFile::from_wav_bytes(&body).and_then(|audio| audio.to_clip(&state.capture));
    let clip = match decoded {
        Ok(clip) => clip,
        Err(e) => {
            warn!("Rejected voice upload for {}: {:#}", session_id, e);
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid audio: {}", e),
            );
        }
    };

    // Session lock is released while the remote calls run
    let outcome = assistant.resolve_clip(&session_id, &question, &clip).await;

    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&session_id) else {
        return session_not_found(&session_id);
    };
    assistant.apply(session, &outcome);

    info!(
        "Voice answer for {} / '{}': {}",
        session_id,
        outcome.label(),
        outcome.message()
    );

    (
        StatusCode::OK,
        Json(VoiceAnswerResponse {
            message: outcome.message(),
            outcome,
            view: SessionView::render(session),
        }),
    )
        .into_response()
}

/// GET /sessions/:session_id/snapshot
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => {
            let snapshot: Vec<SnapshotEntry> = session.snapshot();
            (StatusCode::OK, Json(snapshot)).into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// GET /sessions/:session_id/report
/// Download the answers as a PDF report
pub async fn export_report(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let snapshot = {
        let sessions = state.sessions.read().await;
        match sessions.get(&session_id) {
            Some(session) => session.snapshot(),
            None => return session_not_found(&session_id),
        }
    };

    match state.exporter.export(&state.report.title, &snapshot) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, state.exporter.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", state.report.file_name),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to export report for {}: {:#}", session_id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to export report: {}", e),
            )
        }
    }
}

/// GET /questions
pub async fn list_questions(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.questions.as_ref().clone()))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
