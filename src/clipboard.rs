//! Copy-to-clipboard with a legacy fallback and a manual-selection last resort.
//!
//! Order of attempts:
//! 1. the system clipboard, when the capability is available;
//! 2. an off-screen staging region handed to the platform copy command, removed on
//!    every exit path;
//! 3. selecting the rendered result so the user can copy it by hand.

use crate::error::ClipboardError;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Default time the "copied" indicator stays on
pub const COPIED_INDICATOR_RESET: Duration = Duration::from_secs(2);

/// Primary clipboard capability
pub trait SystemClipboard {
    fn is_available(&self) -> bool;
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Identifier of an off-screen staging region
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RegionId(u64);

impl RegionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Legacy synchronous copy through a hidden editable region
pub trait LegacyCopySurface {
    /// Create a non-visible region populated with `text`
    fn create_region(&mut self, text: &str) -> Result<RegionId, ClipboardError>;
    /// Focus the region and select all of its contents
    fn focus_and_select(&mut self, region: &RegionId) -> Result<(), ClipboardError>;
    /// Run the copy command against the selection; `Ok(false)` if it reported failure
    fn exec_copy(&mut self, region: &RegionId) -> Result<bool, ClipboardError>;
    /// Remove the region. Must not fail.
    fn remove_region(&mut self, region: RegionId);
}

/// Selects the rendered result so the user can copy manually
pub trait ManualSelection {
    fn select_result(&mut self, text: &str);
}

/// Which path completed a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPath {
    Primary,
    Fallback,
}

/// Result of [`ClipboardService::copy`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyResult {
    CopySucceeded(CopyPath),
    CopyFailed(ClipboardError),
}

impl CopyResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CopyResult::CopySucceeded(_))
    }
}

/// Removes its region on drop
struct ScopedRegion<'a> {
    surface: &'a mut dyn LegacyCopySurface,
    region: Option<RegionId>,
}

impl<'a> ScopedRegion<'a> {
    fn create(surface: &'a mut dyn LegacyCopySurface, text: &str) -> Result<Self, ClipboardError> {
        let region = surface.create_region(text)?;
        Ok(Self {
            surface,
            region: Some(region),
        })
    }

    fn copy(&mut self) -> Result<bool, ClipboardError> {
        let Some(region) = self.region.as_ref() else {
            return Ok(false);
        };
        self.surface.focus_and_select(region)?;
        self.surface.exec_copy(region)
    }
}

impl Drop for ScopedRegion<'_> {
    fn drop(&mut self) {
        if let Some(region) = self.region.take() {
            self.surface.remove_region(region);
        }
    }
}

pub struct ClipboardService {
    primary: Box<dyn SystemClipboard>,
    fallback: Box<dyn LegacyCopySurface>,
    selection: Box<dyn ManualSelection>,
}

impl ClipboardService {
    pub fn new(
        primary: Box<dyn SystemClipboard>,
        fallback: Box<dyn LegacyCopySurface>,
        selection: Box<dyn ManualSelection>,
    ) -> Self {
        Self {
            primary,
            fallback,
            selection,
        }
    }

    /// Native ports: `arboard`, the platform copy command, and stderr selection
    pub fn native(fallback_command: Option<Vec<String>>, lifetime: ClipboardLifetime) -> Self {
        Self::new(
            Box::new(ArboardClipboard::new(lifetime)),
            Box::new(CommandCopySurface::new(fallback_command)),
            Box::new(TerminalSelection),
        )
    }

    pub fn copy(&mut self, text: &str) -> CopyResult {
        if self.primary.is_available() {
            match self.primary.write_text(text) {
                Ok(()) => {
                    info!(chars = text.chars().count(), "Copied via system clipboard");
                    return CopyResult::CopySucceeded(CopyPath::Primary);
                }
                Err(e) => warn!(error = %e, "System clipboard write failed, trying fallback"),
            }
        } else {
            debug!("System clipboard unavailable, using fallback");
        }

        match self.copy_with_fallback(text) {
            Ok(()) => {
                info!(chars = text.chars().count(), "Copied via fallback command");
                CopyResult::CopySucceeded(CopyPath::Fallback)
            }
            Err(e) => {
                warn!(error = %e, "Fallback copy failed, selecting result for manual copy");
                self.selection.select_result(text);
                CopyResult::CopyFailed(e)
            }
        }
    }

    fn copy_with_fallback(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut region = ScopedRegion::create(self.fallback.as_mut(), text)?;
        if region.copy()? {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed(
                "copy command reported failure".to_string(),
            ))
        }
    }
}

/// Presentation state of the copy control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
    Unavailable,
}

/// Tracks [`CopyState`] and reverts `Copied` after a delay
#[derive(Debug, Clone)]
pub struct CopyIndicator {
    state: CopyState,
    copied_at: Option<Instant>,
    reset_after: Duration,
}

impl CopyIndicator {
    pub fn new(reset_after: Duration) -> Self {
        Self {
            state: CopyState::Idle,
            copied_at: None,
            reset_after,
        }
    }

    pub fn record(&mut self, result: &CopyResult, now: Instant) {
        match result {
            CopyResult::CopySucceeded(_) => {
                self.state = CopyState::Copied;
                self.copied_at = Some(now);
            }
            CopyResult::CopyFailed(_) => {
                self.state = CopyState::Unavailable;
                self.copied_at = None;
            }
        }
    }

    /// Current state, reverting `Copied` to `Idle` once the delay has passed
    pub fn poll(&mut self, now: Instant) -> CopyState {
        if let (CopyState::Copied, Some(at)) = (self.state, self.copied_at) {
            if now.saturating_duration_since(at) >= self.reset_after {
                self.reset();
            }
        }
        self.state
    }

    pub fn state(&self) -> CopyState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = CopyState::Idle;
        self.copied_at = None;
    }
}

impl Default for CopyIndicator {
    fn default() -> Self {
        Self::new(COPIED_INDICATOR_RESET)
    }
}

/// How long copied text must stay readable relative to the process that copied it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardLifetime {
    /// The process keeps running after the copy, as in an interactive session
    Session,
    /// The process exits right after the copy, as with `generate --copy`
    OneShot,
}

/// X11 and Wayland selections are served by the owning process and vanish when it exits
const SELECTION_DIES_WITH_OWNER: bool = cfg!(target_os = "linux");

impl ClipboardLifetime {
    /// Whether an in-process clipboard owner keeps the text available long enough.
    /// When it does not, copies go through the platform copy command, whose tools keep
    /// serving the selection after flexgen exits.
    pub fn in_process_owner_suffices(self) -> bool {
        match self {
            ClipboardLifetime::Session => true,
            ClipboardLifetime::OneShot => !SELECTION_DIES_WITH_OWNER,
        }
    }
}

/// System clipboard through `arboard`
pub struct ArboardClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ArboardClipboard {
    pub fn new(lifetime: ClipboardLifetime) -> Self {
        if !lifetime.in_process_owner_suffices() {
            debug!(?lifetime, "Selection would not outlive this process, deferring to copy command");
            return Self { inner: None };
        }
        let inner = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                debug!(error = %e, "System clipboard not available");
                None
            }
        };
        Self { inner }
    }
}

impl SystemClipboard for ArboardClipboard {
    fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| ClipboardError::Unavailable("no system clipboard".to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
    }
}

/// Fallback surface: text is staged in a temporary file and piped to the platform
/// copy command.
pub struct CommandCopySurface {
    candidates: Vec<Vec<String>>,
    regions: HashMap<u64, NamedTempFile>,
    next_id: u64,
}

impl CommandCopySurface {
    /// `command` overrides the platform default (program followed by its arguments)
    pub fn new(command: Option<Vec<String>>) -> Self {
        match command.filter(|c| !c.is_empty()) {
            Some(command) => Self::with_candidates(vec![command]),
            None => Self::with_candidates(
                PLATFORM_COPY_COMMANDS
                    .iter()
                    .map(|argv| argv.iter().map(|s| s.to_string()).collect())
                    .collect(),
            ),
        }
    }

    /// Copy tools tried in order until one exits successfully
    pub fn with_candidates(candidates: Vec<Vec<String>>) -> Self {
        Self {
            candidates,
            regions: HashMap::new(),
            next_id: 1,
        }
    }

    /// Number of regions not yet removed
    pub fn outstanding(&self) -> usize {
        self.regions.len()
    }
}

#[cfg(target_os = "macos")]
const PLATFORM_COPY_COMMANDS: &[&[&str]] = &[&["pbcopy"]];

#[cfg(target_os = "linux")]
const PLATFORM_COPY_COMMANDS: &[&[&str]] = &[
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
];

#[cfg(target_os = "windows")]
const PLATFORM_COPY_COMMANDS: &[&[&str]] = &[&["cmd", "/C", "clip"]];

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const PLATFORM_COPY_COMMANDS: &[&[&str]] = &[];

impl LegacyCopySurface for CommandCopySurface {
    fn create_region(&mut self, text: &str) -> Result<RegionId, ClipboardError> {
        let mut staged = tempfile::Builder::new()
            .prefix("flexgen-copy-")
            .tempfile()
            .map_err(|e| ClipboardError::CommandFailed(format!("staging failed: {}", e)))?;
        staged
            .write_all(text.as_bytes())
            .and_then(|_| staged.flush())
            .map_err(|e| ClipboardError::CommandFailed(format!("staging failed: {}", e)))?;

        let id = self.next_id;
        self.next_id += 1;
        self.regions.insert(id, staged);
        Ok(RegionId::new(id))
    }

    fn focus_and_select(&mut self, region: &RegionId) -> Result<(), ClipboardError> {
        if self.regions.contains_key(&region.id()) {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed(format!(
                "unknown staging region {}",
                region.id()
            )))
        }
    }

    fn exec_copy(&mut self, region: &RegionId) -> Result<bool, ClipboardError> {
        let staged = self.regions.get(&region.id()).ok_or_else(|| {
            ClipboardError::CommandFailed(format!("unknown staging region {}", region.id()))
        })?;

        let mut failed: Vec<String> = Vec::new();
        for argv in &self.candidates {
            let Some((program, args)) = argv.split_first() else {
                continue;
            };
            let input = File::open(staged.path())
                .map_err(|e| ClipboardError::CommandFailed(e.to_string()))?;
            let status = Command::new(program)
                .args(args)
                .stdin(Stdio::from(input))
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            match status {
                Ok(status) if status.success() => {
                    debug!(program = %program, "Copy command finished");
                    return Ok(true);
                }
                Ok(status) => {
                    debug!(program = %program, %status, "Copy command failed, trying next");
                    failed.push(format!("{} ({})", program, status));
                }
                Err(e) => debug!(program = %program, error = %e, "Copy command not runnable"),
            }
        }

        if failed.is_empty() {
            Err(ClipboardError::Unavailable(
                "no clipboard tool available (install wl-copy, xclip or xsel)".to_string(),
            ))
        } else {
            Err(ClipboardError::CommandFailed(format!(
                "every copy tool failed: {}",
                failed.join(", ")
            )))
        }
    }

    fn remove_region(&mut self, region: RegionId) {
        if let Some(staged) = self.regions.remove(&region.id()) {
            if let Err(e) = staged.close() {
                warn!(error = %e, "Failed to remove clipboard staging file");
            }
        }
    }
}

/// Re-prints the result on stderr between markers for manual selection
pub struct TerminalSelection;

impl ManualSelection for TerminalSelection {
    fn select_result(&mut self, text: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "----- copy manually: begin -----");
        let _ = writeln!(stderr, "{}", text);
        let _ = writeln!(stderr, "----- copy manually: end -----");
    }
}
