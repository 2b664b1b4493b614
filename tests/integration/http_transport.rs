//! End-to-end submissions through the reqwest transport against a mock server

use super::test_utils::{config_for, recording_clipboard, ClipboardLog};
use flexgen::clipboard::{CopyPath, CopyResult};
use flexgen::download::DirectorySaver;
use flexgen::lifecycle::SubmissionState;
use flexgen::mode::{DataGenerationSubtype, GenerationMode};
use flexgen::response::Outcome;
use flexgen::transport::HttpTransport;
use flexgen::workbench::Workbench;
use serde_json::json;
use std::path::Path;
use std::time::Instant;
use tempfile::TempDir;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn workbench(server: &MockServer, output: &Path, log: &ClipboardLog) -> Workbench {
    let config = config_for(&server.uri(), output);
    let transport = HttpTransport::new(&config.server).unwrap();
    Workbench::new(
        &config,
        Box::new(transport),
        Box::new(DirectorySaver::new(output)),
        recording_clipboard(true, log),
    )
}

fn staged_leftovers(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
        .count()
}

#[tokio::test]
async fn test_stdcusac_download_saved_under_table_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-stdcusac"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "count": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x50, 0x4b, 0x03, 0x04], XLSX))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let log = ClipboardLog::default();
    let mut bench = workbench(&server, out.path(), &log);
    bench.set_mode(GenerationMode::DataGeneration);
    bench.set_subtype(DataGenerationSubtype::Stdcusac);
    bench.set_count(7);

    let state = bench.submit().await.clone();
    assert!(matches!(
        state,
        SubmissionState::Succeeded(Outcome::FilePayload(_))
    ));

    let saved = out.path().join("STDCUSAC_Cases.xlsx");
    assert_eq!(std::fs::read(&saved).unwrap(), vec![0x50, 0x4b, 0x03, 0x04]);
    assert_eq!(
        bench.last_saved().and_then(|s| s.location.clone()),
        Some(saved)
    );
    assert_eq!(staged_leftovers(out.path()), 0);
}

#[tokio::test]
async fn test_count_clamped_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-stdcif"))
        .and(body_json(json!({ "count": 1000 })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1], XLSX))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let mut bench = workbench(&server, out.path(), &ClipboardLog::default());
    bench.set_mode(GenerationMode::DataGeneration);
    bench.set_count_raw("5000");
    bench.submit().await;

    assert!(out.path().join("STDCIF_Cases.xlsx").exists());
}

#[tokio::test]
async fn test_plain_text_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-doc"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let mut bench = workbench(&server, out.path(), &ClipboardLog::default());
    bench.set_text("customer onboarding");
    let state = bench.submit().await.clone();

    assert_eq!(state, SubmissionState::Failed("Server error: 500 - boom".to_string()));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    assert!(bench.can_submit());
}

#[tokio::test]
async fn test_json_error_message_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-test-cases"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Text is too short" })),
        )
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let mut bench = workbench(&server, out.path(), &ClipboardLog::default());
    bench.set_mode(GenerationMode::TestCases);
    bench.set_text("x");
    let state = bench.submit().await.clone();

    assert_eq!(state.error_message(), Some("Text is too short"));
}

#[tokio::test]
async fn test_code_gen_inline_result_and_copy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .and(body_json(json!({ "text": "close dormant accounts" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": "CREATE OR REPLACE PROCEDURE close_dormant IS BEGIN NULL; END;"
        })))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let log = ClipboardLog::default();
    let mut bench = workbench(&server, out.path(), &log);
    bench.set_mode(GenerationMode::CodeGen);
    bench.set_text("close dormant accounts");
    bench.submit().await;

    assert_eq!(
        bench.inline_result(),
        Some("CREATE OR REPLACE PROCEDURE close_dormant IS BEGIN NULL; END;")
    );
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);

    let copied = bench.copy_result(Instant::now()).unwrap();
    assert_eq!(copied, CopyResult::CopySucceeded(CopyPath::Primary));
    assert_eq!(
        *log.written.lock().unwrap(),
        vec!["CREATE OR REPLACE PROCEDURE close_dormant IS BEGIN NULL; END;".to_string()]
    );
}

#[tokio::test]
async fn test_code_gen_missing_result_is_invalid_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let mut bench = workbench(&server, out.path(), &ClipboardLog::default());
    bench.set_mode(GenerationMode::CodeGen);
    bench.set_text("anything");
    let state = bench.submit().await.clone();

    assert_eq!(
        state,
        SubmissionState::Failed("Invalid response format from server".to_string())
    );
}

#[tokio::test]
async fn test_content_disposition_kept_as_suggestion_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-doc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    b"docx".to_vec(),
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                )
                .insert_header(
                    "content-disposition",
                    "attachment; filename=\"spec_2024.docx\"",
                ),
        )
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let mut bench = workbench(&server, out.path(), &ClipboardLog::default());
    bench.set_text("interest accrual");
    let state = bench.submit().await.clone();

    match state {
        SubmissionState::Succeeded(Outcome::FilePayload(payload)) => {
            assert_eq!(payload.filename, "function_specification.docx");
            assert_eq!(payload.suggested_filename.as_deref(), Some("spec_2024.docx"));
        }
        other => panic!("expected file payload, got {:?}", other),
    }
    assert!(out.path().join("function_specification.docx").exists());
    assert!(!out.path().join("spec_2024.docx").exists());
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let out = TempDir::new().unwrap();
    let config = config_for(&uri, out.path());
    let mut bench = Workbench::new(
        &config,
        Box::new(HttpTransport::new(&config.server).unwrap()),
        Box::new(DirectorySaver::new(out.path())),
        recording_clipboard(true, &ClipboardLog::default()),
    );
    bench.set_text("anything");
    let state = bench.submit().await.clone();

    let message = state.error_message().unwrap_or_default();
    assert!(message.starts_with("Network error:"), "got {}", message);
    assert!(bench.can_submit());
}
