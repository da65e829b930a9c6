//! In-memory store with the same ordering semantics as `PgStore`. Test-only.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{InterviewStore, StorageError};
use crate::models::answer::{AnswerRow, NewAnswer};
use crate::models::interview::{InterviewRow, NewInterview};

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    interviews: Vec<InterviewRow>,
    answers: Vec<AnswerRow>,
    next_interview_id: i32,
    next_answer_id: i32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn answer_count(&self) -> usize {
        self.inner.lock().await.answers.len()
    }
}

#[async_trait]
impl InterviewStore for MemoryStore {
    async fn insert_interview(&self, new: NewInterview) -> Result<InterviewRow, StorageError> {
        let mut tables = self.inner.lock().await;
        if tables.interviews.iter().any(|i| i.mock_id == new.mock_id) {
            return Err(StorageError::DuplicateMockId(new.mock_id));
        }
        tables.next_interview_id += 1;
        let row = InterviewRow {
            id: tables.next_interview_id,
            mock_id: new.mock_id,
            json_mock_resp: new.json_mock_resp,
            job_position: new.job_position,
            job_desc: new.job_desc,
            job_experience: new.job_experience,
            created_by: new.created_by,
            created_at: Utc::now(),
        };
        tables.interviews.push(row.clone());
        Ok(row)
    }

    async fn find_interview(&self, mock_id: &str) -> Result<Option<InterviewRow>, StorageError> {
        let tables = self.inner.lock().await;
        Ok(tables.interviews.iter().find(|i| i.mock_id == mock_id).cloned())
    }

    async fn list_interviews(&self, owner: &str) -> Result<Vec<InterviewRow>, StorageError> {
        let tables = self.inner.lock().await;
        let mut rows: Vec<_> = tables
            .interviews
            .iter()
            .filter(|i| i.created_by == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn delete_interview(&self, mock_id: &str, owner: &str) -> Result<bool, StorageError> {
        let mut tables = self.inner.lock().await;
        let before = tables.interviews.len();
        tables
            .interviews
            .retain(|i| !(i.mock_id == mock_id && i.created_by == owner));
        Ok(tables.interviews.len() < before)
    }

    async fn insert_answer(&self, new: NewAnswer) -> Result<AnswerRow, StorageError> {
        let mut tables = self.inner.lock().await;
        tables.next_answer_id += 1;
        let row = AnswerRow {
            id: tables.next_answer_id,
            mock_id_ref: new.mock_id_ref,
            question_index: new.question_index,
            question: new.question,
            correct_ans: new.correct_ans,
            user_ans: new.user_ans,
            feedback: new.feedback,
            rating: new.rating,
            user_email: new.user_email,
            created_at: Utc::now(),
        };
        tables.answers.push(row.clone());
        Ok(row)
    }

    async fn list_answers(&self, mock_id: &str) -> Result<Vec<AnswerRow>, StorageError> {
        let tables = self.inner.lock().await;
        let mut rows: Vec<_> = tables
            .answers
            .iter()
            .filter(|a| a.mock_id_ref == mock_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.id);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interview(mock_id: &str, owner: &str) -> NewInterview {
        NewInterview {
            mock_id: mock_id.to_string(),
            json_mock_resp: r#"[{"question":"Q1","answer":"A1"}]"#.to_string(),
            job_position: "Backend Engineer".to_string(),
            job_desc: "APIs".to_string(),
            job_experience: 3,
            created_by: owner.to_string(),
        }
    }

    fn answer(mock_id: &str) -> NewAnswer {
        NewAnswer {
            mock_id_ref: mock_id.to_string(),
            question_index: 0,
            question: "Q1".to_string(),
            correct_ans: "A1".to_string(),
            user_ans: "My answer".to_string(),
            feedback: "Fine".to_string(),
            rating: "4".to_string(),
            user_email: "a@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_is_owner_filtered_newest_first() {
        let store = MemoryStore::new();
        store.insert_interview(interview("m1", "a@example.com")).await.unwrap();
        store.insert_interview(interview("m2", "b@example.com")).await.unwrap();
        store.insert_interview(interview("m3", "a@example.com")).await.unwrap();

        let rows = store.list_interviews("a@example.com").await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.mock_id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m1"]);
    }

    #[tokio::test]
    async fn test_delete_leaves_orphan_answers() {
        let store = MemoryStore::new();
        store.insert_interview(interview("m1", "a@example.com")).await.unwrap();
        store.insert_interview(interview("m2", "a@example.com")).await.unwrap();
        store.insert_answer(answer("m1")).await.unwrap();

        assert!(store.delete_interview("m1", "a@example.com").await.unwrap());

        let remaining = store.list_interviews("a@example.com").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].mock_id, "m2");

        let orphans = store.list_answers("m1").await.unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].user_ans, "My answer");
    }

    #[tokio::test]
    async fn test_delete_requires_matching_owner() {
        let store = MemoryStore::new();
        store.insert_interview(interview("m1", "a@example.com")).await.unwrap();
        assert!(!store.delete_interview("m1", "b@example.com").await.unwrap());
        assert!(store.find_interview("m1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_mock_id_rejected() {
        let store = MemoryStore::new();
        store.insert_interview(interview("m1", "a@example.com")).await.unwrap();
        let err = store
            .insert_interview(interview("m1", "a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateMockId(_)));
    }
}
