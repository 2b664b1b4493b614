//! Workbench flows: validation, mode changes, stale responses, copy fallbacks

use super::test_utils::{config_for, recording_clipboard, ClipboardLog, ScriptedTransport};
use flexgen::clipboard::{CopyPath, CopyResult, CopyState};
use flexgen::config::FlexgenConfig;
use flexgen::download::DirectorySaver;
use flexgen::lifecycle::{Resolution, StaleResponsePolicy, SubmissionState, SubmitDecision};
use flexgen::mode::GenerationMode;
use flexgen::response::{FilePayload, Outcome, RawResponse};
use flexgen::workbench::Workbench;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn bench_with(
    config: &FlexgenConfig,
    output: &Path,
    transport: ScriptedTransport,
    log: &ClipboardLog,
    primary_clipboard: bool,
) -> Workbench {
    Workbench::new(
        config,
        Box::new(transport),
        Box::new(DirectorySaver::new(output)),
        recording_clipboard(primary_clipboard, log),
    )
}

fn doc_payload() -> Outcome {
    Outcome::FilePayload(FilePayload {
        filename: "function_specification.docx".to_string(),
        bytes: b"doc".to_vec(),
        suggested_filename: None,
    })
}

#[tokio::test]
async fn test_blank_text_rejected_for_every_text_mode() {
    let out = TempDir::new().unwrap();
    let config = config_for("http://localhost:8080", out.path());
    for mode in [
        GenerationMode::FunctionDoc,
        GenerationMode::TestCases,
        GenerationMode::CodeGen,
    ] {
        let transport = ScriptedTransport::new(vec![]);
        let sent = transport.sent.clone();
        let mut bench = bench_with(&config, out.path(), transport, &ClipboardLog::default(), true);
        bench.set_mode(mode);
        bench.set_text(" \n\t ");
        let state = bench.submit().await.clone();
        assert_eq!(
            state,
            SubmissionState::Failed("Please enter your requirements before generating".to_string())
        );
        assert!(sent.lock().unwrap().is_empty(), "{} sent a request", mode);
    }
}

#[tokio::test]
async fn test_data_generation_needs_no_text() {
    let out = TempDir::new().unwrap();
    let config = config_for("http://localhost:8080", out.path());
    let transport = ScriptedTransport::new(vec![Ok(RawResponse::new(200, None, vec![7u8]))]);
    let sent = transport.sent.clone();
    let mut bench = bench_with(&config, out.path(), transport, &ClipboardLog::default(), true);
    bench.set_mode(GenerationMode::DataGeneration);
    bench.submit().await;

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].endpoint, "http://localhost:8080/generate-stdcif");
    assert!(out.path().join("STDCIF_Cases.xlsx").exists());
}

#[test]
fn test_stale_response_applied_by_default() {
    let out = TempDir::new().unwrap();
    let config = config_for("http://localhost:8080", out.path());
    let mut bench = bench_with(
        &config,
        out.path(),
        ScriptedTransport::default(),
        &ClipboardLog::default(),
        true,
    );
    bench.set_text("requirement");
    let SubmitDecision::Started { ticket, .. } = bench.begin_submit() else {
        panic!("submit should start");
    };

    bench.set_mode(GenerationMode::CodeGen);
    assert_eq!(bench.state(), &SubmissionState::Submitting);
    assert!(!bench.can_submit());

    let resolution = bench.finish_submit(&ticket, Ok(doc_payload()));
    assert!(matches!(resolution, Resolution::Applied { saved: Some(_) }));
    assert!(out.path().join("function_specification.docx").exists());
}

#[test]
fn test_stale_response_discarded_when_configured() {
    let out = TempDir::new().unwrap();
    let mut config = config_for("http://localhost:8080", out.path());
    config.lifecycle.stale_responses = StaleResponsePolicy::Discard;
    let mut bench = bench_with(
        &config,
        out.path(),
        ScriptedTransport::default(),
        &ClipboardLog::default(),
        true,
    );
    bench.set_text("requirement");
    let SubmitDecision::Started { ticket, .. } = bench.begin_submit() else {
        panic!("submit should start");
    };
    bench.set_mode(GenerationMode::TestCases);

    assert_eq!(
        bench.finish_submit(&ticket, Ok(doc_payload())),
        Resolution::Discarded
    );
    assert_eq!(bench.state(), &SubmissionState::Idle);
    assert!(!out.path().join("function_specification.docx").exists());

    // A duplicate resolution of the same ticket is ignored
    assert_eq!(
        bench.finish_submit(&ticket, Ok(doc_payload())),
        Resolution::Discarded
    );
}

#[tokio::test]
async fn test_copy_falls_back_when_primary_unavailable() {
    let out = TempDir::new().unwrap();
    let config = config_for("http://localhost:8080", out.path());
    let transport = ScriptedTransport::new(vec![Ok(RawResponse::new(
        200,
        Some("application/json"),
        r#"{"success":true,"result":"SELECT 1 FROM dual;"}"#,
    ))]);
    let log = ClipboardLog::default();
    let mut bench = bench_with(&config, out.path(), transport, &log, false);
    bench.set_mode(GenerationMode::CodeGen);
    bench.set_text("query");
    bench.submit().await;

    let now = Instant::now();
    assert_eq!(
        bench.copy_result(now),
        Some(CopyResult::CopySucceeded(CopyPath::Fallback))
    );
    assert_eq!(*log.written.lock().unwrap(), vec!["SELECT 1 FROM dual;".to_string()]);
    assert_eq!(bench.copy_state(now), CopyState::Copied);
    assert_eq!(
        bench.copy_state(now + Duration::from_millis(2500)),
        CopyState::Idle
    );
}

#[tokio::test]
async fn test_resubmit_after_failure() {
    let out = TempDir::new().unwrap();
    let config = config_for("http://localhost:8080", out.path());
    let transport = ScriptedTransport::new(vec![
        Ok(RawResponse::new(503, Some("text/plain"), "busy")),
        Ok(RawResponse::new(
            200,
            Some("application/json"),
            r#"{"success":true,"result":"ok"}"#,
        )),
    ]);
    let mut bench = bench_with(&config, out.path(), transport, &ClipboardLog::default(), true);
    bench.set_mode(GenerationMode::CodeGen);
    bench.set_text("retry me");

    let first = bench.submit().await.clone();
    assert_eq!(first.error_message(), Some("Server error: 503 - busy"));
    let second = bench.submit().await.clone();
    assert_eq!(second.error_message(), None);
    assert_eq!(bench.inline_result(), Some("ok"));
}
