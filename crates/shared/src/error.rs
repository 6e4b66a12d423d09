use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const MISSING_DOCUMENT_MARKER: &str = "No document uploaded";
pub const UPLOAD_FIRST_MESSAGE: &str = "Please upload a document before asking questions.";

/// Body of a failed service response: `{"detail": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("service rejected request with status {status}")]
    Rejected { status: u16, detail: Option<Value> },
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ServiceError {
    pub fn rejected(status: u16, detail: Option<Value>) -> Self {
        Self::Rejected { status, detail }
    }

    pub fn detail(&self) -> Option<&Value> {
        match self {
            ServiceError::Rejected { detail, .. } => detail.as_ref(),
            ServiceError::Transport(_) => None,
        }
    }

    /// User-facing text for this failure, see [`describe_detail`].
    pub fn message(&self, fallback: &str) -> String {
        describe_detail(self.detail(), fallback)
    }
}

/// Collapses a service `detail` into one line of text.
///
/// Plain strings pass through, lists of field errors are joined by their
/// `msg`, anything else structured is rendered as JSON. A detail that says the
/// document is missing is replaced by an instruction to upload first.
pub fn describe_detail(detail: Option<&Value>, fallback: &str) -> String {
    let text = match detail {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(field_error_message)
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    };

    if text.contains(MISSING_DOCUMENT_MARKER) {
        return UPLOAD_FIRST_MESSAGE.to_string();
    }
    if text.trim().is_empty() {
        return fallback.to_string();
    }
    text
}

fn field_error_message(item: &Value) -> String {
    match item {
        Value::String(text) => text.clone(),
        Value::Object(fields) => match fields.get("msg") {
            Some(Value::String(msg)) => msg.clone(),
            Some(other) => other.to_string(),
            None => item.to_string(),
        },
        other => other.to_string(),
    }
}
