//! Per-path schema validation failures, rendered as the protocol's
//! `isError: true` + text-block form rather than a single `ErrorData`.

use rmcp::model::{CallToolResult, Content};

/// One field that failed schema validation.
pub struct FieldError {
    pub path: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(path: &'static str, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

/// Builds an `isError: true` tool result listing each `path: message` pair,
/// one per line.
pub fn schema_error(errors: Vec<FieldError>) -> CallToolResult {
    let text = errors
        .iter()
        .map(|e| format!("{}: {}", e.path, e.message))
        .collect::<Vec<_>>()
        .join("\n");
    CallToolResult::error(vec![Content::text(text)])
}
