use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One generated interview question with its reference answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswerPair {
    #[serde(alias = "Question")]
    pub question: String,
    #[serde(alias = "Answer")]
    pub answer: String,
}

/// A requested mock interview. `json_mock_resp` holds the question set as
/// serialized JSON text and is re-parsed on every read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: i32,
    pub mock_id: String,
    pub json_mock_resp: String,
    pub job_position: String,
    pub job_desc: String,
    pub job_experience: i32,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl InterviewRow {
    pub fn questions(&self) -> Result<Vec<QuestionAnswerPair>, serde_json::Error> {
        serde_json::from_str(&self.json_mock_resp)
    }
}

/// Insert payload for `mock_interviews`; `id` and `created_at` come from the store.
#[derive(Debug, Clone)]
pub struct NewInterview {
    pub mock_id: String,
    pub json_mock_resp: String,
    pub job_position: String,
    pub job_desc: String,
    pub job_experience: i32,
    pub created_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(json: &str) -> InterviewRow {
        InterviewRow {
            id: 1,
            mock_id: "m-1".to_string(),
            json_mock_resp: json.to_string(),
            job_position: "Backend Engineer".to_string(),
            job_desc: "APIs".to_string(),
            job_experience: 3,
            created_by: "dev@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_questions_parse_stored_text() {
        let interview = row(r#"[{"question":"Q1","answer":"A1"},{"question":"Q2","answer":"A2"}]"#);
        let questions = interview.questions().unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].answer, "A2");
    }

    #[test]
    fn test_questions_parse_legacy_capitalized_rows() {
        let interview = row(r#"[{"Question":"Q1","Answer":"A1"}]"#);
        assert_eq!(interview.questions().unwrap()[0].question, "Q1");
    }

    #[test]
    fn test_questions_corrupt_text_is_error() {
        assert!(row("not json").questions().is_err());
    }
}
