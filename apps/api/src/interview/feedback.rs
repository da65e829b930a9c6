use serde::Serialize;

use crate::models::answer::AnswerRow;

/// Feedback page payload: every recorded answer plus an advisory average.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReport {
    pub mock_id: String,
    /// Mean of the ratings that read as numbers, to one decimal place.
    pub average_rating: Option<f64>,
    pub rated_answers: usize,
    pub answers: Vec<AnswerRow>,
}

pub fn build_feedback_report(mock_id: &str, answers: Vec<AnswerRow>) -> FeedbackReport {
    let ratings: Vec<f64> = answers.iter().filter_map(AnswerRow::numeric_rating).collect();
    let average_rating = if ratings.is_empty() {
        None
    } else {
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        Some((mean * 10.0).round() / 10.0)
    };

    FeedbackReport {
        mock_id: mock_id.to_string(),
        average_rating,
        rated_answers: ratings.len(),
        answers,
    }
}
