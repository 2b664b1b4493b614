//! Flexgen: client for a banking test-artifact generation service
//!
//! Four generation modes share one form: free-text requirements go out as JSON, and
//! results come back either as a spreadsheet download or as inline code to copy. The
//! crate owns request construction, response interpretation, the submission lifecycle,
//! and the clipboard and file-save ports.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod download;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod mode;
pub mod request;
pub mod response;
pub mod transport;
pub mod workbench;
