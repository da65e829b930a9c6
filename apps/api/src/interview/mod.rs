// Mock interview engine: question generation, answer capture, scoring, feedback.
// All completion calls go through llm_client; all persistence through store.

pub mod capture;
pub mod extractor;
pub mod feedback;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod registry;
