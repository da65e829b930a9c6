//! Response Extractor: recovers the JSON payload embedded in free-form model text.
//!
//! Contract: take the first opening delimiter and the last matching closing
//! delimiter, slice inclusively, parse. Prose, markdown fences and commentary
//! around the payload are ignored. Anything that does not yield a well-formed
//! payload is rejected outright; nothing is repaired or partially accepted.

use serde_json::Value;
use thiserror::Error;

use crate::models::answer::AnswerFeedback;
use crate::models::interview::QuestionAnswerPair;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no JSON span found in AI response")]
    NoJsonSpanFound,

    #[error("malformed JSON in AI response: {source}")]
    MalformedJson {
        /// The offending substring, kept for diagnostics.
        span: String,
        source: serde_json::Error,
    },

    #[error("AI response does not match the expected schema: {0}")]
    SchemaMismatch(String),
}

/// Which kind of JSON value the caller expects to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Array,
    Object,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonShape::Array => ('[', ']'),
            JsonShape::Object => ('{', '}'),
        }
    }
}

/// Returns the slice from the first opening delimiter to the last closing one, inclusive.
/// A closing delimiter that only appears before the opening one counts as not found.
pub fn locate_span(text: &str, shape: JsonShape) -> Option<&str> {
    let (open, close) = shape.delimiters();
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Locates and parses the JSON span. Shape validation is left to the caller.
pub fn extract_json(text: &str, shape: JsonShape) -> Result<Value, ExtractionError> {
    let span = locate_span(text, shape).ok_or(ExtractionError::NoJsonSpanFound)?;
    serde_json::from_str(span).map_err(|source| ExtractionError::MalformedJson {
        span: span.to_string(),
        source,
    })
}

/// Extracts a generated question set. Every entry must carry non-empty
/// `question` and `answer` text, and the set must not be empty.
pub fn extract_question_set(text: &str) -> Result<Vec<QuestionAnswerPair>, ExtractionError> {
    let value = extract_json(text, JsonShape::Array)?;
    let Value::Array(items) = value else {
        return Err(ExtractionError::SchemaMismatch(
            "expected a JSON array of question/answer objects".to_string(),
        ));
    };

    if items.is_empty() {
        return Err(ExtractionError::SchemaMismatch(
            "question set is empty".to_string(),
        ));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let pair: QuestionAnswerPair = serde_json::from_value(item).map_err(|e| {
                ExtractionError::SchemaMismatch(format!("entry {index}: {e}"))
            })?;
            if pair.question.trim().is_empty() || pair.answer.trim().is_empty() {
                return Err(ExtractionError::SchemaMismatch(format!(
                    "entry {index}: question and answer must be non-empty"
                )));
            }
            Ok(pair)
        })
        .collect()
}

/// Extracts a `{rating, feedback}` object. The rating is kept as opaque text:
/// strings pass through, numbers are rendered, anything else is a mismatch.
pub fn extract_answer_feedback(text: &str) -> Result<AnswerFeedback, ExtractionError> {
    let value = extract_json(text, JsonShape::Object)?;
    let Value::Object(map) = value else {
        return Err(ExtractionError::SchemaMismatch(
            "expected a JSON object".to_string(),
        ));
    };

    let rating = match map.get("rating") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            return Err(ExtractionError::SchemaMismatch(
                "rating must be a non-empty string or a number".to_string(),
            ))
        }
        None => {
            return Err(ExtractionError::SchemaMismatch(
                "missing field `rating`".to_string(),
            ))
        }
    };

    let feedback = match map.get("feedback") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(_) => {
            return Err(ExtractionError::SchemaMismatch(
                "feedback must be a non-empty string".to_string(),
            ))
        }
        None => {
            return Err(ExtractionError::SchemaMismatch(
                "missing field `feedback`".to_string(),
            ))
        }
    };

    Ok(AnswerFeedback { rating, feedback })
}
