//! Test doubles shared by module tests: scripted completion sessions and a
//! store whose every call fails.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm_client::{ChatBackend, CompletionService, LlmError};
use crate::models::answer::{AnswerRow, NewAnswer};
use crate::models::interview::{InterviewRow, NewInterview};
use crate::store::{InterviewStore, StorageError};

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(u16),
    Hang,
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Reply::Text(s.to_string())
    }
}

/// Answers prompts from a fixed script, in order. An exhausted script fails with 503.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn send_prompt(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(status)) => Err(LlmError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(LlmError::Api {
                status: 503,
                message: "script exhausted".to_string(),
            }),
        }
    }
}

/// Every chat started from this backend shares the same script.
pub struct ScriptedBackend(pub Arc<ScriptedCompletion>);

impl ChatBackend for ScriptedBackend {
    fn start_chat(&self) -> Arc<dyn CompletionService> {
        self.0.clone()
    }
}

pub struct FailingStore;

fn unavailable() -> StorageError {
    StorageError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl InterviewStore for FailingStore {
    async fn insert_interview(&self, _new: NewInterview) -> Result<InterviewRow, StorageError> {
        Err(unavailable())
    }

    async fn find_interview(&self, _mock_id: &str) -> Result<Option<InterviewRow>, StorageError> {
        Err(unavailable())
    }

    async fn list_interviews(&self, _owner: &str) -> Result<Vec<InterviewRow>, StorageError> {
        Err(unavailable())
    }

    async fn delete_interview(&self, _mock_id: &str, _owner: &str) -> Result<bool, StorageError> {
        Err(unavailable())
    }

    async fn insert_answer(&self, _new: NewAnswer) -> Result<AnswerRow, StorageError> {
        Err(unavailable())
    }

    async fn list_answers(&self, _mock_id: &str) -> Result<Vec<AnswerRow>, StorageError> {
        Err(unavailable())
    }
}
