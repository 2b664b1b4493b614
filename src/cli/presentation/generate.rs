//! Generate presentation: submission outcome formatters and interactive status lines.

use crate::clipboard::{CopyPath, CopyResult};
use crate::download::SavedFile;
use crate::error::FlexgenError;
use crate::lifecycle::SubmissionState;
use crate::mode::GenerationTarget;
use crate::response::Outcome;
use owo_colors::OwoColorize;

/// Text output for a resolved submission. Inline results print verbatim so they can be
/// piped; file results print where the file landed.
pub fn format_outcome_text(
    state: &SubmissionState,
    saved: Option<&SavedFile>,
    copy: Option<&CopyResult>,
) -> String {
    let mut out = match state {
        SubmissionState::Succeeded(Outcome::InlineResult { text }) => text.clone(),
        SubmissionState::Succeeded(Outcome::FilePayload(payload)) => {
            let mut s = match saved.and_then(|f| f.location.as_ref()) {
                Some(path) => format!("Saved {} to {}", payload.filename, path.display()),
                None => format!("Saved {}", payload.filename),
            };
            s.push_str(&format!("\n  Size: {} bytes", payload.bytes.len()));
            if let Some(suggested) = payload
                .suggested_filename
                .as_ref()
                .filter(|name| **name != payload.filename)
            {
                s.push_str(&format!("\n  Server suggested: {}", suggested));
            }
            s
        }
        SubmissionState::Succeeded(Outcome::Failure { message })
        | SubmissionState::Failed(message) => message.clone(),
        SubmissionState::Idle => "No submission".to_string(),
        SubmissionState::Submitting => "Generating...".to_string(),
    };

    if let Some(copy) = copy {
        out.push_str("\n\n");
        out.push_str(&format_copy_result(copy));
    }
    out
}

pub fn format_outcome_json(
    target: GenerationTarget,
    state: &SubmissionState,
    saved: Option<&SavedFile>,
    copy: Option<&CopyResult>,
) -> Result<String, FlexgenError> {
    let mut value = serde_json::json!({
        "mode": target.mode().slug(),
        "endpoint": target.entry().endpoint,
        "state": state.name(),
    });

    match state {
        SubmissionState::Succeeded(Outcome::InlineResult { text }) => {
            value["result"] = serde_json::json!(text);
        }
        SubmissionState::Succeeded(Outcome::FilePayload(payload)) => {
            value["file"] = serde_json::json!({
                "filename": payload.filename,
                "path": saved.and_then(|f| f.location.as_ref()).map(|p| p.display().to_string()),
                "bytes": payload.bytes.len(),
                "suggested_filename": payload.suggested_filename,
            });
        }
        SubmissionState::Succeeded(Outcome::Failure { message })
        | SubmissionState::Failed(message) => {
            value["error"] = serde_json::json!(message);
        }
        SubmissionState::Idle | SubmissionState::Submitting => {}
    }

    if let Some(copy) = copy {
        value["copied"] = serde_json::json!(copy.is_success());
    }

    serde_json::to_string_pretty(&value)
        .map_err(|e| FlexgenError::InputError(format!("Failed to serialize outcome: {}", e)))
}

pub fn format_copy_result(copy: &CopyResult) -> String {
    match copy {
        CopyResult::CopySucceeded(CopyPath::Primary) => "Copied to clipboard".to_string(),
        CopyResult::CopySucceeded(CopyPath::Fallback) => {
            "Copied to clipboard (fallback)".to_string()
        }
        CopyResult::CopyFailed(e) => format!("Copy failed: {}. Select the text manually.", e),
    }
}

/// Coloured one-line status for interactive sessions
pub fn status_line(state: &SubmissionState) -> String {
    match state {
        SubmissionState::Idle => format!("{}", "idle".dimmed()),
        SubmissionState::Submitting => format!("{}", "generating...".yellow()),
        SubmissionState::Succeeded(_) => format!("{}", "done".green().bold()),
        SubmissionState::Failed(message) => format!("{} {}", "error:".red().bold(), message),
    }
}
