//! Storage collaborator: persistence of interviews and scored answers.
//!
//! `AppState` holds an `Arc<dyn InterviewStore>`; production uses `PgStore`.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::answer::{AnswerRow, NewAnswer};
use crate::models::interview::{InterviewRow, NewInterview};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("duplicate mock_id {0}")]
    DuplicateMockId(String),
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn insert_interview(&self, new: NewInterview) -> Result<InterviewRow, StorageError>;

    async fn find_interview(&self, mock_id: &str) -> Result<Option<InterviewRow>, StorageError>;

    /// Interviews created by `owner`, newest (highest id) first.
    async fn list_interviews(&self, owner: &str) -> Result<Vec<InterviewRow>, StorageError>;

    /// Deletes the owner's interview. Returns false when no row matched.
    /// Answers referencing the interview are left in place.
    async fn delete_interview(&self, mock_id: &str, owner: &str) -> Result<bool, StorageError>;

    async fn insert_answer(&self, new: NewAnswer) -> Result<AnswerRow, StorageError>;

    /// Answers recorded against `mock_id`, oldest (lowest id) first.
    async fn list_answers(&self, mock_id: &str) -> Result<Vec<AnswerRow>, StorageError>;
}
