//! Capture Session: one record/transcribe/score/persist cycle per question.
//!
//! States: Idle -> Listening -> Stopped -> Scoring -> Persisted | Failed -> Idle.
//! Stopped, Scoring, Persisted and Failed are passed through inside `stop()`;
//! between calls the session is either Idle or Listening, unless a `stop()`
//! future was abandoned mid-score, in which case the next `start()` recovers.
//!
//! Transcript deltas are appended verbatim and only while Listening. Deltas
//! arriving in any other state are dropped for the current cycle.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::interview::extractor::{extract_answer_feedback, ExtractionError};
use crate::interview::prompts::answer_feedback_prompt;
use crate::llm_client::{CompletionService, LlmError};
use crate::models::answer::{AnswerRow, NewAnswer};
use crate::models::interview::QuestionAnswerPair;
use crate::store::{InterviewStore, StorageError};

/// Answers whose trimmed length is below this many chars are discarded unscored.
pub const MIN_ANSWER_CHARS: usize = 10;
const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Idle,
    Listening,
    Stopped,
    Scoring,
    Persisted,
    Failed,
}

/// Events pushed by the speech source (or a client relaying it).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptureEvent {
    Start,
    Transcript { text: String },
    Stop,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("completion service failed: {0}")]
    Service(#[from] LlmError),

    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    #[error("storage write failed: {0}")]
    Storage(#[from] StorageError),

    #[error("{stage} did not finish in time")]
    TimedOut { stage: &'static str },
}

impl CaptureError {
    pub fn code(&self) -> &'static str {
        match self {
            CaptureError::Service(_) => "LLM_ERROR",
            CaptureError::Extraction(_) => "AI_RESPONSE_INVALID",
            CaptureError::Storage(_) => "DATABASE_ERROR",
            CaptureError::TimedOut { .. } => "TIMEOUT",
        }
    }

    /// Message safe to show to the user; every failure here is retryable by hand.
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureError::Service(_) => "The AI service failed to respond. Please try again.",
            CaptureError::Extraction(_) => "The AI response was invalid. Please try again.",
            CaptureError::Storage(_) => "Your answer could not be saved. Please try again.",
            CaptureError::TimedOut { .. } => "Scoring took too long. Please try again.",
        }
    }
}

/// Result of a cycle that did not fail.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaptureOutcome {
    Saved { answer: AnswerRow },
    TooShort { chars: usize, min_chars: usize },
}

/// One message per finished cycle, as sent back over the capture channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaptureReport {
    Saved {
        answer: AnswerRow,
    },
    TooShort {
        chars: usize,
        min_chars: usize,
    },
    Failed {
        code: &'static str,
        message: &'static str,
    },
}

impl From<Result<CaptureOutcome, CaptureError>> for CaptureReport {
    fn from(result: Result<CaptureOutcome, CaptureError>) -> Self {
        match result {
            Ok(CaptureOutcome::Saved { answer }) => CaptureReport::Saved { answer },
            Ok(CaptureOutcome::TooShort { chars, min_chars }) => {
                CaptureReport::TooShort { chars, min_chars }
            }
            Err(e) => CaptureReport::Failed {
                code: e.code(),
                message: e.user_message(),
            },
        }
    }
}

/// The question being answered and on whose behalf.
#[derive(Debug, Clone)]
pub struct CaptureTarget {
    pub mock_id: String,
    pub owner: String,
    pub question_index: usize,
    pub question: QuestionAnswerPair,
}

#[derive(Debug, Clone, Copy)]
pub struct CaptureSettings {
    pub min_chars: usize,
    /// Applied separately to the completion call and to the storage write.
    pub stage_timeout: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            min_chars: MIN_ANSWER_CHARS,
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }
}

pub struct CaptureSession {
    state: CaptureState,
    buffer: String,
    target: CaptureTarget,
    completion: Arc<dyn CompletionService>,
    store: Arc<dyn InterviewStore>,
    settings: CaptureSettings,
}

impl CaptureSession {
    pub fn new(
        target: CaptureTarget,
        completion: Arc<dyn CompletionService>,
        store: Arc<dyn InterviewStore>,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            state: CaptureState::Idle,
            buffer: String::new(),
            target,
            completion,
            store,
            settings,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Begins listening with an empty buffer. Ignored while already Listening,
    /// so a repeated start never discards the answer in progress.
    pub fn start(&mut self) -> bool {
        if self.state == CaptureState::Listening {
            debug!(
                "Capture {}#{}: start ignored, already listening",
                self.target.mock_id, self.target.question_index
            );
            return false;
        }
        self.buffer.clear();
        self.state = CaptureState::Listening;
        debug!(
            "Capture {}#{}: listening",
            self.target.mock_id, self.target.question_index
        );
        true
    }

    /// Appends a transcript delta. Returns false if it was dropped.
    pub fn push_transcript(&mut self, delta: &str) -> bool {
        if self.state != CaptureState::Listening {
            debug!(
                "Capture {}#{}: dropped transcript delta in state {:?}",
                self.target.mock_id, self.target.question_index, self.state
            );
            return false;
        }
        self.buffer.push_str(delta);
        true
    }

    /// Stops listening and finishes the cycle. Returns `None` when not Listening.
    pub async fn stop(&mut self) -> Option<Result<CaptureOutcome, CaptureError>> {
        if self.state != CaptureState::Listening {
            return None;
        }
        self.state = CaptureState::Stopped;
        Some(self.finish().await)
    }

    pub async fn apply(
        &mut self,
        event: CaptureEvent,
    ) -> Option<Result<CaptureOutcome, CaptureError>> {
        match event {
            CaptureEvent::Start => {
                self.start();
                None
            }
            CaptureEvent::Transcript { text } => {
                self.push_transcript(&text);
                None
            }
            CaptureEvent::Stop => self.stop().await,
        }
    }

    /// Consumes events strictly in arrival order and reports each finished cycle.
    /// Returns when the event channel closes or the report receiver goes away.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<CaptureEvent>,
        reports: mpsc::Sender<CaptureReport>,
    ) {
        while let Some(event) = events.recv().await {
            if let Some(result) = self.apply(event).await {
                if reports.send(CaptureReport::from(result)).await.is_err() {
                    break;
                }
            }
        }
        debug!(
            "Capture {}#{}: session closed",
            self.target.mock_id, self.target.question_index
        );
    }

    async fn finish(&mut self) -> Result<CaptureOutcome, CaptureError> {
        let answer = self.buffer.trim().to_string();
        let chars = answer.chars().count();

        if chars < self.settings.min_chars {
            debug!(
                "Capture {}#{}: answer too short ({chars} < {}), discarded",
                self.target.mock_id, self.target.question_index, self.settings.min_chars
            );
            self.reset();
            return Ok(CaptureOutcome::TooShort {
                chars,
                min_chars: self.settings.min_chars,
            });
        }

        self.state = CaptureState::Scoring;
        let result = self.score_and_persist(answer).await;

        match &result {
            Ok(_) => {
                self.state = CaptureState::Persisted;
                info!(
                    "Capture {}#{}: answer scored and saved",
                    self.target.mock_id, self.target.question_index
                );
            }
            Err(e) => {
                self.state = CaptureState::Failed;
                warn!(
                    "Capture {}#{}: failed: {e}",
                    self.target.mock_id, self.target.question_index
                );
            }
        }

        self.reset();
        result
    }

    async fn score_and_persist(&self, answer: String) -> Result<CaptureOutcome, CaptureError> {
        let prompt = answer_feedback_prompt(&self.target.question.question, &answer);

        let reply = timeout(
            self.settings.stage_timeout,
            self.completion.send_prompt(&prompt),
        )
        .await
        .map_err(|_| CaptureError::TimedOut {
            stage: "completion",
        })??;

        let feedback = extract_answer_feedback(&reply)?;

        let record = NewAnswer {
            mock_id_ref: self.target.mock_id.clone(),
            question_index: self.target.question_index as i32,
            question: self.target.question.question.clone(),
            correct_ans: self.target.question.answer.clone(),
            user_ans: answer,
            feedback: feedback.feedback,
            rating: feedback.rating,
            user_email: self.target.owner.clone(),
        };

        let answer = timeout(self.settings.stage_timeout, self.store.insert_answer(record))
            .await
            .map_err(|_| CaptureError::TimedOut { stage: "storage" })??;

        Ok(CaptureOutcome::Saved { answer })
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.state = CaptureState::Idle;
    }
}
