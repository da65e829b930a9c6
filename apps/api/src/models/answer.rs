use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Scoring result recovered from the model's reply. `rating` is opaque display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub rating: String,
    pub feedback: String,
}

/// One scored user answer. Question and reference answer are denormalized copies.
/// `mock_id_ref` is not a foreign key: rows outlive a deleted interview.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnswerRow {
    pub id: i32,
    pub mock_id_ref: String,
    pub question_index: i32,
    pub question: String,
    pub correct_ans: String,
    pub user_ans: String,
    pub feedback: String,
    pub rating: String,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

impl AnswerRow {
    /// Best-effort numeric reading of the rating ("4", "3.5", "4/5" -> 4).
    pub fn numeric_rating(&self) -> Option<f64> {
        let head = self.rating.split('/').next()?.trim();
        head.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub mock_id_ref: String,
    pub question_index: i32,
    pub question: String,
    pub correct_ans: String,
    pub user_ans: String,
    pub feedback: String,
    pub rating: String,
    pub user_email: String,
}
