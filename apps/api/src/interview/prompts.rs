//! Prompt Builder: renders completion prompts from typed inputs.
//!
//! Pure functions. Every field is interpolated; blank fields render as a
//! placeholder instead of disappearing from the prompt.

use crate::llm_client::prompts::{JSON_PAYLOAD_INSTRUCTION, MISSING_FIELD};

/// Question-set prompt template.
/// Replace: {job_position}, {job_desc}, {job_experience}, {question_count}, {json_instruction}
pub const QUESTION_SET_PROMPT_TEMPLATE: &str = r#"Job Position: {job_position}, Job Description: {job_desc}, Years of Experience: {job_experience}. Provide {question_count} interview questions and answers in JSON format.

Return a JSON ARRAY with this EXACT shape:
[
  {"question": "The interview question", "answer": "A strong reference answer"}
]

{json_instruction}"#;

/// Answer feedback prompt template.
/// Replace: {question}, {user_answer}, {json_instruction}
pub const ANSWER_FEEDBACK_PROMPT_TEMPLATE: &str = r#"Question: {question}
User Answer: {user_answer}
Based on the above question and user answer, give a rating from 0 to 5 and feedback (3-5 lines) for improvement in JSON format:
{
  "rating": "...",
  "feedback": "..."
}

{json_instruction}"#;

/// Structured inputs for question generation.
#[derive(Debug, Clone, Default)]
pub struct QuestionSetInput<'a> {
    pub job_position: &'a str,
    pub job_desc: &'a str,
    pub job_experience: u32,
    pub question_count: u32,
}

pub fn question_set_prompt(input: &QuestionSetInput<'_>) -> String {
    let job_experience = input.job_experience.to_string();
    let question_count = input.question_count.to_string();
    render(
        QUESTION_SET_PROMPT_TEMPLATE,
        &[
            ("{job_position}", or_placeholder(input.job_position)),
            ("{job_desc}", or_placeholder(input.job_desc)),
            ("{job_experience}", &job_experience),
            ("{question_count}", &question_count),
            ("{json_instruction}", JSON_PAYLOAD_INSTRUCTION),
        ],
    )
}

pub fn answer_feedback_prompt(question: &str, user_answer: &str) -> String {
    render(
        ANSWER_FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("{question}", or_placeholder(question)),
            ("{user_answer}", or_placeholder(user_answer)),
            ("{json_instruction}", JSON_PAYLOAD_INSTRUCTION),
        ],
    )
}

/// Single pass over the template: substituted values are never rescanned,
/// so placeholder-looking text inside a field is kept verbatim.
fn render(template: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match fields.iter().find(|(key, _)| rest.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &rest[key.len()..];
            }
            None => {
                out.push('{');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        MISSING_FIELD
    } else {
        value
    }
}
