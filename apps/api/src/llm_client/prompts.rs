// Shared prompt fragments.
// Task-specific prompts live next to the module that uses them
// (see screening/prompts.rs).

/// Appended after every output schema. Keeps the model from wrapping the
/// array in prose.
pub const JSON_ARRAY_DIRECTIVE: &str = "Return the result strictly as a JSON Array of objects.";
