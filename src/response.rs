//! Response interpretation: raw status, headers and body to a normalized [`Outcome`].

use crate::error::GenerationError;
use crate::mode::{GenerationTarget, ResponseShape};
use serde_json::Value;

/// Message for a success status whose body lacks `success: true` or a string `result`
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid response format from server";

/// Characters of a plain-text error body kept in the failure message
pub const ERROR_BODY_PREVIEW_CHARS: usize = 100;

/// Response as read off the wire, before interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            content_disposition: None,
            body: body.into(),
        }
    }

    pub fn with_content_disposition(mut self, value: impl Into<String>) -> Self {
        self.content_disposition = Some(value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Binary result to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    /// Name from the dispatch table; authoritative for saving
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Name the server offered in `Content-Disposition`, for display only
    pub suggested_filename: Option<String>,
}

/// Normalized result of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    FilePayload(FilePayload),
    InlineResult { text: String },
    Failure { message: String },
}

impl Outcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Outcome::Failure {
            message: message.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure { .. })
    }

    pub fn inline_text(&self) -> Option<&str> {
        match self {
            Outcome::InlineResult { text } => Some(text),
            _ => None,
        }
    }
}

impl From<GenerationError> for Outcome {
    fn from(err: GenerationError) -> Self {
        Outcome::failure(err.to_string())
    }
}

/// Stateless mapping from response metadata and bytes to an [`Outcome`]
pub struct ResponseHandler;

impl ResponseHandler {
    pub fn interpret(response: RawResponse, expects_file: bool, target: GenerationTarget) -> Outcome {
        match Self::try_interpret(response, expects_file, target) {
            Ok(outcome) => outcome,
            Err(err) => Outcome::from(err),
        }
    }

    fn try_interpret(
        response: RawResponse,
        expects_file: bool,
        target: GenerationTarget,
    ) -> Result<Outcome, GenerationError> {
        if !response.is_success() {
            return Err(server_error(&response));
        }

        match (expects_file, target.entry().response) {
            (true, ResponseShape::File { filename }) => {
                let suggested_filename = response
                    .content_disposition
                    .as_deref()
                    .and_then(filename_from_disposition);
                Ok(Outcome::FilePayload(FilePayload {
                    filename: filename.to_string(),
                    bytes: response.body,
                    suggested_filename,
                }))
            }
            (false, ResponseShape::Inline) => {
                let text = inline_result(&response.body)?;
                Ok(Outcome::InlineResult { text })
            }
            // The caller's expectation disagrees with the dispatch table
            _ => Err(GenerationError::Format(INVALID_FORMAT_MESSAGE.to_string())),
        }
    }
}

fn server_error(response: &RawResponse) -> GenerationError {
    let structured = is_json(response.content_type.as_deref())
        .then(|| serde_json::from_slice::<Value>(&response.body).ok())
        .flatten()
        .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_string));

    let message = match structured {
        Some(message) => message,
        None => format!(
            "Server error: {} - {}",
            response.status,
            truncate_preview(&String::from_utf8_lossy(&response.body), ERROR_BODY_PREVIEW_CHARS)
        ),
    };

    GenerationError::Server {
        status: response.status,
        message,
    }
}

fn inline_result(body: &[u8]) -> Result<String, GenerationError> {
    let invalid = || GenerationError::Format(INVALID_FORMAT_MESSAGE.to_string());
    let value: Value = serde_json::from_slice(body).map_err(|_| invalid())?;

    if value.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(invalid());
    }
    value
        .get("result")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(invalid)
}

/// Whether a content type denotes JSON (`application/json`, `*+json`)
pub fn is_json(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// Keep the first `max_chars` characters, marking the cut with `...`
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Extract `filename` from a `Content-Disposition` header value
pub fn filename_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| {
            let (key, raw) = part.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("filename") {
                return None;
            }
            let name = raw.trim().trim_matches('"');
            (!name.is_empty()).then(|| name.to_string())
        })
}
