//! Request construction and pre-flight validation.

use crate::error::GenerationError;
use crate::mode::{DataGenerationSubtype, GenerationMode, GenerationTarget, PayloadKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message for a submit without requirement text
pub const BLANK_REQUIREMENT_MESSAGE: &str = "Please enter your requirements before generating";

/// Number of records requested from the data generation endpoints, always in `[1, 1000]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u32")]
pub struct RecordCount(u32);

impl RecordCount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 1000;
    pub const DEFAULT: u32 = 10;

    pub fn new(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u32)
    }

    /// Parse raw form input. Fractions are truncated; anything non-numeric counts as 1.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(value) = raw.parse::<i64>() {
            return Self::new(value);
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                Self::new(value.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
            }
            _ => Self(Self::MIN),
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for RecordCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<i64> for RecordCount {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<RecordCount> for u32 {
    fn from(count: RecordCount) -> Self {
        count.0
    }
}

impl fmt::Display for RecordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// JSON body of a generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestPayload {
    Text { text: String },
    Count { count: RecordCount },
}

/// Fully resolved request for one submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub target: GenerationTarget,
    pub endpoint: String,
    pub payload: RequestPayload,
    pub expects_file: bool,
}

/// Free-text and record count inputs of the submission form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInputs {
    pub text: String,
    pub count: RecordCount,
}

impl RequestInputs {
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_count(&mut self, count: i64) {
        self.count = RecordCount::new(count);
    }

    pub fn set_count_raw(&mut self, raw: &str) {
        self.count = RecordCount::parse(raw);
    }
}

/// Maps form inputs onto the dispatch table
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of the endpoint serving `target`
    pub fn endpoint_for(&self, target: GenerationTarget) -> String {
        format!("{}{}", self.base_url, target.entry().endpoint)
    }

    pub fn build(
        &self,
        mode: GenerationMode,
        subtype: DataGenerationSubtype,
        text: &str,
        count: RecordCount,
    ) -> Result<RequestDescriptor, GenerationError> {
        if mode.requires_text() && text.trim().is_empty() {
            return Err(GenerationError::Validation(
                BLANK_REQUIREMENT_MESSAGE.to_string(),
            ));
        }

        let target = mode.target(subtype);
        let entry = target.entry();
        let payload = match entry.payload {
            PayloadKind::Text => RequestPayload::Text {
                text: text.to_string(),
            },
            PayloadKind::Count => RequestPayload::Count { count },
        };

        Ok(RequestDescriptor {
            target,
            endpoint: self.endpoint_for(target),
            payload,
            expects_file: target.expects_file(),
        })
    }
}
