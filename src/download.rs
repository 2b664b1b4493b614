//! File download side effect.
//!
//! A save is a scoped acquisition: the port hands out a transient handle for the bytes,
//! a link named after the target file is activated, and the handle is released when the
//! scope ends, whether activation succeeded or not.

use crate::error::SaveError;
use crate::response::FilePayload;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Opaque handle to staged download content
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SaveHandle(u64);

impl SaveHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Where a saved file ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub location: Option<PathBuf>,
}

/// Host capability for saving binary content under a filename
pub trait FileSavePort {
    /// Stage `bytes` behind a transient handle
    fn create_handle(&mut self, bytes: &[u8]) -> Result<SaveHandle, SaveError>;

    /// Activate a link to `handle` that saves it as `filename`
    fn activate(&mut self, handle: &SaveHandle, filename: &str) -> Result<SavedFile, SaveError>;

    /// Release the transient handle. Must not fail.
    fn release(&mut self, handle: SaveHandle);
}

/// Releases its handle on drop
struct ScopedHandle<'a> {
    port: &'a mut dyn FileSavePort,
    handle: Option<SaveHandle>,
}

impl<'a> ScopedHandle<'a> {
    fn acquire(port: &'a mut dyn FileSavePort, bytes: &[u8]) -> Result<Self, SaveError> {
        let handle = port.create_handle(bytes)?;
        Ok(Self {
            port,
            handle: Some(handle),
        })
    }

    fn activate(&mut self, filename: &str) -> Result<SavedFile, SaveError> {
        match self.handle.as_ref() {
            Some(handle) => self.port.activate(handle, filename),
            None => Err(SaveError::Stage("handle already released".to_string())),
        }
    }
}

impl Drop for ScopedHandle<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(handle = handle.id(), "Releasing download handle");
            self.port.release(handle);
        }
    }
}

/// One-shot save of a [`FilePayload`]
pub struct DownloadTrigger;

impl DownloadTrigger {
    pub fn save(port: &mut dyn FileSavePort, payload: &FilePayload) -> Result<SavedFile, SaveError> {
        let mut scoped = ScopedHandle::acquire(port, &payload.bytes)?;
        let saved = scoped.activate(&payload.filename)?;
        info!(
            filename = %saved.filename,
            bytes = payload.bytes.len(),
            "Download saved"
        );
        Ok(saved)
    }
}

/// Saves downloads into a directory on the local filesystem.
///
/// Content is staged in a temporary file inside the directory. Activation renames it
/// over the final name, replacing any existing file atomically; release deletes the
/// staging file if activation never moved it.
pub struct DirectorySaver {
    directory: PathBuf,
    staged: HashMap<u64, NamedTempFile>,
    persisted: HashSet<u64>,
    next_id: u64,
}

impl DirectorySaver {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            staged: HashMap::new(),
            persisted: HashSet::new(),
            next_id: 1,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Number of handles not yet released
    pub fn outstanding(&self) -> usize {
        self.staged.len()
    }
}

impl FileSavePort for DirectorySaver {
    fn create_handle(&mut self, bytes: &[u8]) -> Result<SaveHandle, SaveError> {
        std::fs::create_dir_all(&self.directory)?;
        let mut staged = tempfile::Builder::new()
            .prefix(".flexgen-")
            .suffix(".part")
            .tempfile_in(&self.directory)
            .map_err(|e| SaveError::Stage(e.to_string()))?;
        staged.write_all(bytes)?;
        staged.flush()?;

        let id = self.next_id;
        self.next_id += 1;
        self.staged.insert(id, staged);
        Ok(SaveHandle::new(id))
    }

    fn activate(&mut self, handle: &SaveHandle, filename: &str) -> Result<SavedFile, SaveError> {
        // Only the final component is honoured so a name cannot escape the directory
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SaveError::Activate {
                filename: filename.to_string(),
                reason: "not a file name".to_string(),
            })?;
        let target = self.directory.join(name);

        let staged = self.staged.remove(&handle.id()).ok_or_else(|| {
            SaveError::Stage(format!("unknown download handle {}", handle.id()))
        })?;
        match staged.persist(&target) {
            Ok(_) => {
                self.persisted.insert(handle.id());
                debug!(path = %target.display(), "Staged download moved into place");
            }
            Err(e) => {
                // Hand the staging file back so release still removes it
                self.staged.insert(handle.id(), e.file);
                return Err(SaveError::Activate {
                    filename: filename.to_string(),
                    reason: e.error.to_string(),
                });
            }
        }

        Ok(SavedFile {
            filename: name.to_string(),
            location: Some(target),
        })
    }

    fn release(&mut self, handle: SaveHandle) {
        match self.staged.remove(&handle.id()) {
            Some(staged) => {
                if let Err(e) = staged.close() {
                    warn!(error = %e, "Failed to remove staged download");
                }
            }
            None if self.persisted.remove(&handle.id()) => {
                debug!(handle = handle.id(), "Download handle already moved into place");
            }
            None => warn!(handle = handle.id(), "Release of unknown download handle"),
        }
    }
}
