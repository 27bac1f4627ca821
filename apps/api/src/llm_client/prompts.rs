// Shared prompt fragments.
// Each service that calls the model keeps its own templates in a prompts.rs
// beside it; only cross-cutting pieces live here.

/// Closing instruction for any prompt whose answer is parsed as a JSON object.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond ONLY with the JSON object, no additional text.";
