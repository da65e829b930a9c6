// Shared prompt fragments.
// Each service that needs completion calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Appended to every prompt whose reply is parsed by the response extractor.
/// The extractor tolerates prose around the payload; this just keeps it small.
pub const JSON_PAYLOAD_INSTRUCTION: &str = "\
    Reply with the JSON payload only. \
    Do NOT add explanations before or after it. \
    Use double-quoted keys and strings, and no trailing commas.";

/// Placeholder rendered in place of an absent or blank prompt field.
pub const MISSING_FIELD: &str = "(not provided)";
