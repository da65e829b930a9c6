//! Axum route handlers for the Interview API.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::Response,
    Json,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::identity::Owner;
use crate::interview::capture::{
    CaptureEvent, CaptureOutcome, CaptureReport, CaptureSession, CaptureTarget,
};
use crate::interview::feedback::{build_feedback_report, FeedbackReport};
use crate::interview::generator::{generate_interview, CreateInterviewRequest, InterviewDetail};
use crate::interview::registry::CaptureClaim;
use crate::models::interview::InterviewRow;
use crate::state::AppState;

/// Pending client events per capture socket.
const CAPTURE_EVENT_BUFFER: usize = 64;
const CAPTURE_REPORT_BUFFER: usize = 8;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub user_answer: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Interviews
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Generates a question set for the role and stores the new interview.
pub async fn handle_create_interview(
    State(state): State<AppState>,
    owner: Owner,
    Json(request): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewDetail>), AppError> {
    if request.job_position.trim().is_empty() {
        return Err(AppError::Validation(
            "job_position cannot be empty".to_string(),
        ));
    }

    let detail = generate_interview(
        state.store.as_ref(),
        state.llm.as_ref(),
        state.config.question_count,
        state.config.llm_timeout,
        owner.as_str(),
        request,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<Vec<InterviewRow>>, AppError> {
    Ok(Json(state.store.list_interviews(owner.as_str()).await?))
}

/// GET /api/v1/interviews/:mock_id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    _owner: Owner,
) -> Result<Json<InterviewDetail>, AppError> {
    let interview = find_interview(&state, &mock_id).await?;
    Ok(Json(InterviewDetail::from_row(interview)?))
}

/// DELETE /api/v1/interviews/:mock_id
///
/// Recorded answers are not removed with the interview.
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    owner: Owner,
) -> Result<StatusCode, AppError> {
    if !state
        .store
        .delete_interview(&mock_id, owner.as_str())
        .await?
    {
        return Err(AppError::NotFound(format!("Interview {mock_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/interviews/:mock_id/feedback
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    _owner: Owner,
) -> Result<Json<FeedbackReport>, AppError> {
    let answers = state.store.list_answers(&mock_id).await?;
    Ok(Json(build_feedback_report(&mock_id, answers)))
}

// ────────────────────────────────────────────────────────────────────────────
// Answer capture
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews/:mock_id/questions/:index/answers
///
/// Runs one complete capture cycle over an already-transcribed answer.
/// 201 with the saved record, or 200 with `too_short` when nothing was scored.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path((mock_id, index)): Path<(String, usize)>,
    owner: Owner,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<(StatusCode, Json<CaptureOutcome>), AppError> {
    let target = load_target(&state, &mock_id, index, &owner).await?;
    let _claim = claim_capture(&state, &mock_id, index)?;

    let mut session = new_session(&state, target);
    session.start();
    session.push_transcript(&request.user_answer);
    let outcome = session.stop().await.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("capture session was not listening"))
    })??;

    let status = match outcome {
        CaptureOutcome::Saved { .. } => StatusCode::CREATED,
        CaptureOutcome::TooShort { .. } => StatusCode::OK,
    };
    Ok((status, Json(outcome)))
}

/// GET /api/v1/interviews/:mock_id/questions/:index/capture (WebSocket)
///
/// Client frames: `{"type":"start"}`, `{"type":"transcript","text":"..."}`,
/// `{"type":"stop"}`. One report frame is sent back per finished cycle.
pub async fn handle_capture_socket(
    State(state): State<AppState>,
    Path((mock_id, index)): Path<(String, usize)>,
    owner: Owner,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let target = load_target(&state, &mock_id, index, &owner).await?;
    let claim = claim_capture(&state, &mock_id, index)?;
    let session = new_session(&state, target);

    info!("Capture socket opened for {mock_id}#{index} ({})", owner.as_str());
    Ok(ws.on_upgrade(move |socket| drive_capture(socket, session, claim)))
}

/// Frame transport under the capture relay. Implemented by the axum socket.
#[async_trait]
trait FrameChannel: Send {
    async fn recv_frame(&mut self) -> Option<Result<Message, axum::Error>>;
    async fn send_frame(&mut self, frame: Message) -> Result<(), axum::Error>;
}

#[async_trait]
impl FrameChannel for WebSocket {
    async fn recv_frame(&mut self) -> Option<Result<Message, axum::Error>> {
        self.recv().await
    }

    async fn send_frame(&mut self, frame: Message) -> Result<(), axum::Error> {
        self.send(frame).await
    }
}

/// Relays socket frames into the session's event channel and reports back out.
/// Closing the socket abandons any scoring still in flight and frees the claim.
async fn drive_capture<S: FrameChannel>(
    mut socket: S,
    session: CaptureSession,
    _claim: CaptureClaim,
) {
    let (event_tx, event_rx) = mpsc::channel(CAPTURE_EVENT_BUFFER);
    let (report_tx, mut report_rx) = mpsc::channel(CAPTURE_REPORT_BUFFER);
    let worker = tokio::spawn(session.run(event_rx, report_tx));

    loop {
        tokio::select! {
            incoming = socket.recv_frame() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<CaptureEvent>(&text) {
                    Ok(event) => {
                        if event_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Rejected capture frame: {e}");
                        let rejection = json!({
                            "status": "rejected",
                            "message": format!("Unrecognised capture event: {e}"),
                        });
                        if socket.send_frame(Message::Text(rejection.to_string())).await.is_err() {
                            break;
                        }
                    }
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("Capture socket error: {e}");
                    break;
                }
            },
            report = report_rx.recv() => {
                let Some(report) = report else { break };
                if send_report(&mut socket, &report).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(event_tx);
    worker.abort();
    debug!("Capture socket closed");
}

async fn send_report<S: FrameChannel>(
    socket: &mut S,
    report: &CaptureReport,
) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(report).map_err(axum::Error::new)?;
    socket.send_frame(Message::Text(payload)).await
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn find_interview(state: &AppState, mock_id: &str) -> Result<InterviewRow, AppError> {
    state
        .store
        .find_interview(mock_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {mock_id} not found")))
}

async fn load_target(
    state: &AppState,
    mock_id: &str,
    index: usize,
    owner: &Owner,
) -> Result<CaptureTarget, AppError> {
    let interview = find_interview(state, mock_id).await?;
    let detail = InterviewDetail::from_row(interview)?;
    let question = detail.questions.into_iter().nth(index).ok_or_else(|| {
        AppError::NotFound(format!("Question {index} not found in interview {mock_id}"))
    })?;

    Ok(CaptureTarget {
        mock_id: mock_id.to_string(),
        owner: owner.as_str().to_string(),
        question_index: index,
        question,
    })
}

fn claim_capture(state: &AppState, mock_id: &str, index: usize) -> Result<CaptureClaim, AppError> {
    state.captures.claim(mock_id, index).ok_or_else(|| {
        AppError::Conflict(format!(
            "An answer to question {index} of interview {mock_id} is already being captured"
        ))
    })
}

fn new_session(state: &AppState, target: CaptureTarget) -> CaptureSession {
    CaptureSession::new(
        target,
        state.llm.start_chat(),
        state.store.clone(),
        state.capture_settings(),
    )
}
