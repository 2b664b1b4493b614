//! Shared test utilities for integration tests
//!
//! Recording clipboard ports, a scripted transport, and environment isolation for
//! config loading.

use async_trait::async_trait;
use flexgen::clipboard::{
    ClipboardService, LegacyCopySurface, ManualSelection, RegionId, SystemClipboard,
};
use flexgen::config::FlexgenConfig;
use flexgen::error::{ClipboardError, GenerationError};
use flexgen::request::RequestDescriptor;
use flexgen::response::RawResponse;
use flexgen::transport::Transport;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Serializes HOME / XDG_CONFIG_HOME / FLEXGEN__* mutation across tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variables saved on creation and restored on drop
pub struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    pub fn new(home: &Path) -> Self {
        let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut guard = Self {
            saved: Vec::new(),
            _lock: lock,
        };
        guard.set("HOME", Some(&home.to_string_lossy()));
        guard.set("XDG_CONFIG_HOME", None);
        guard
    }

    pub fn set(&mut self, key: &str, value: Option<&str>) {
        if !self.saved.iter().any(|(k, _)| k == key) {
            self.saved.push((key.to_string(), std::env::var(key).ok()));
        }
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..).rev() {
            match value {
                Some(v) => std::env::set_var(&key, v),
                None => std::env::remove_var(&key),
            }
        }
    }
}

/// Default config pointed at `base_url`, saving into `output`
pub fn config_for(base_url: &str, output: &Path) -> FlexgenConfig {
    let mut config = FlexgenConfig::default();
    config.server.base_url = base_url.to_string();
    config.server.request_timeout_secs = 5;
    config.output.directory = Some(output.to_path_buf());
    config
}

/// Texts written through any clipboard path
#[derive(Default, Clone)]
pub struct ClipboardLog {
    pub written: Arc<Mutex<Vec<String>>>,
}

struct RecordingClipboard {
    available: bool,
    log: ClipboardLog,
}

impl SystemClipboard for RecordingClipboard {
    fn is_available(&self) -> bool {
        self.available
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.log.written.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct RecordingSurface {
    log: ClipboardLog,
    pending: Option<String>,
}

impl LegacyCopySurface for RecordingSurface {
    fn create_region(&mut self, text: &str) -> Result<RegionId, ClipboardError> {
        self.pending = Some(text.to_string());
        Ok(RegionId::new(1))
    }

    fn focus_and_select(&mut self, _region: &RegionId) -> Result<(), ClipboardError> {
        Ok(())
    }

    fn exec_copy(&mut self, _region: &RegionId) -> Result<bool, ClipboardError> {
        if let Some(text) = self.pending.clone() {
            self.log.written.lock().unwrap().push(text);
        }
        Ok(true)
    }

    fn remove_region(&mut self, _region: RegionId) {
        self.pending = None;
    }
}

struct NoopSelection;

impl ManualSelection for NoopSelection {
    fn select_result(&mut self, _text: &str) {}
}

/// Clipboard service whose primary path is available or not, recording into `log`
pub fn recording_clipboard(primary_available: bool, log: &ClipboardLog) -> ClipboardService {
    ClipboardService::new(
        Box::new(RecordingClipboard {
            available: primary_available,
            log: log.clone(),
        }),
        Box::new(RecordingSurface {
            log: log.clone(),
            pending: None,
        }),
        Box::new(NoopSelection),
    )
}

/// Transport replaying canned responses and recording requests
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<Vec<Result<RawResponse, GenerationError>>>,
    pub sent: Arc<Mutex<Vec<RequestDescriptor>>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<RawResponse, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, GenerationError> {
        self.sent.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(GenerationError::Transport("no scripted response".to_string()));
        }
        responses.remove(0)
    }
}
