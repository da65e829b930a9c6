use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::{InterviewStore, StorageError};
use crate::models::answer::{AnswerRow, NewAnswer};
use crate::models::interview::{InterviewRow, NewInterview};

/// PostgreSQL-backed store. Writes are plain INSERT/DELETE; rows are never updated.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewStore for PgStore {
    async fn insert_interview(&self, new: NewInterview) -> Result<InterviewRow, StorageError> {
        let row = sqlx::query_as::<_, InterviewRow>(
            r#"
            INSERT INTO mock_interviews
                (mock_id, json_mock_resp, job_position, job_desc, job_experience, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&new.mock_id)
        .bind(&new.json_mock_resp)
        .bind(&new.job_position)
        .bind(&new.job_desc)
        .bind(new.job_experience)
        .bind(&new.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                StorageError::DuplicateMockId(new.mock_id.clone())
            } else {
                StorageError::Database(e)
            }
        })?;

        info!("Inserted interview {} for {}", row.mock_id, row.created_by);
        Ok(row)
    }

    async fn find_interview(&self, mock_id: &str) -> Result<Option<InterviewRow>, StorageError> {
        Ok(
            sqlx::query_as::<_, InterviewRow>("SELECT * FROM mock_interviews WHERE mock_id = $1")
                .bind(mock_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_interviews(&self, owner: &str) -> Result<Vec<InterviewRow>, StorageError> {
        Ok(sqlx::query_as::<_, InterviewRow>(
            "SELECT * FROM mock_interviews WHERE created_by = $1 ORDER BY id DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_interview(&self, mock_id: &str, owner: &str) -> Result<bool, StorageError> {
        let result =
            sqlx::query("DELETE FROM mock_interviews WHERE mock_id = $1 AND created_by = $2")
                .bind(mock_id)
                .bind(owner)
                .execute(&self.pool)
                .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted interview {mock_id} for {owner}");
        }
        Ok(deleted)
    }

    async fn insert_answer(&self, new: NewAnswer) -> Result<AnswerRow, StorageError> {
        let row = sqlx::query_as::<_, AnswerRow>(
            r#"
            INSERT INTO user_answers
                (mock_id_ref, question_index, question, correct_ans, user_ans,
                 feedback, rating, user_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&new.mock_id_ref)
        .bind(new.question_index)
        .bind(&new.question)
        .bind(&new.correct_ans)
        .bind(&new.user_ans)
        .bind(&new.feedback)
        .bind(&new.rating)
        .bind(&new.user_email)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Inserted answer {} for interview {} question {}",
            row.id, row.mock_id_ref, row.question_index
        );
        Ok(row)
    }

    async fn list_answers(&self, mock_id: &str) -> Result<Vec<AnswerRow>, StorageError> {
        Ok(sqlx::query_as::<_, AnswerRow>(
            "SELECT * FROM user_answers WHERE mock_id_ref = $1 ORDER BY id ASC",
        )
        .bind(mock_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
