//! Interview creation: orchestrates question generation and persistence.
//!
//! Flow: build prompt → fresh chat → send → extract question set →
//!       serialize to `json_mock_resp` → INSERT → return profile + questions.
//!
//! Nothing is written unless the model's reply yields a complete, valid question set.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::extractor::extract_question_set;
use crate::interview::prompts::{question_set_prompt, QuestionSetInput};
use crate::llm_client::ChatBackend;
use crate::models::interview::{InterviewRow, NewInterview, QuestionAnswerPair};
use crate::store::InterviewStore;

/// Request body for interview creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInterviewRequest {
    pub job_position: String,
    #[serde(default)]
    pub job_desc: String,
    pub job_experience: u32,
}

/// An interview profile with its question set already parsed.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewDetail {
    pub interview: InterviewRow,
    pub questions: Vec<QuestionAnswerPair>,
}

impl InterviewDetail {
    pub fn from_row(interview: InterviewRow) -> Result<Self, AppError> {
        let questions = interview.questions().map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Stored question set for {} is unreadable: {e}",
                interview.mock_id
            ))
        })?;
        Ok(Self {
            interview,
            questions,
        })
    }
}

pub async fn generate_interview(
    store: &dyn InterviewStore,
    llm: &dyn ChatBackend,
    question_count: u32,
    llm_timeout: Duration,
    owner: &str,
    request: CreateInterviewRequest,
) -> Result<InterviewDetail, AppError> {
    let job_experience = i32::try_from(request.job_experience)
        .map_err(|_| AppError::Validation("job_experience is out of range".to_string()))?;

    let prompt = question_set_prompt(&QuestionSetInput {
        job_position: &request.job_position,
        job_desc: &request.job_desc,
        job_experience: request.job_experience,
        question_count,
    });

    info!(
        "Generating {question_count} questions for '{}' ({owner})",
        request.job_position
    );
    let chat = llm.start_chat();
    let reply = timeout(llm_timeout, chat.send_prompt(&prompt))
        .await
        .map_err(|_| AppError::Timeout("question generation".to_string()))??;

    let questions = extract_question_set(&reply)?;
    info!("Extracted {} questions", questions.len());

    let json_mock_resp = serde_json::to_string(&questions)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize questions: {e}")))?;

    let interview = store
        .insert_interview(NewInterview {
            mock_id: Uuid::new_v4().to_string(),
            json_mock_resp,
            job_position: request.job_position,
            job_desc: request.job_desc,
            job_experience,
            created_by: owner.to_string(),
        })
        .await?;

    Ok(InterviewDetail {
        interview,
        questions,
    })
}
