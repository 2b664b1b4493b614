//! Generation modes and the dispatch table.
//!
//! Every mode-dependent decision (endpoint, payload shape, expected response, saved
//! filename) is read from [`GenerationTarget::entry`]. A target is resolved once from the
//! active mode and sub-option; nothing downstream compares mode names again.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Top-level choice of artifact to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    /// Word function specification document
    #[default]
    FunctionDoc,
    /// Test case spreadsheet
    TestCases,
    /// Synthetic test data spreadsheet (see [`DataGenerationSubtype`])
    DataGeneration,
    /// PL/SQL code displayed inline
    CodeGen,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 4] = [
        GenerationMode::FunctionDoc,
        GenerationMode::TestCases,
        GenerationMode::DataGeneration,
        GenerationMode::CodeGen,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            GenerationMode::FunctionDoc => "function-doc",
            GenerationMode::TestCases => "test-cases",
            GenerationMode::DataGeneration => "data-generation",
            GenerationMode::CodeGen => "code-gen",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GenerationMode::FunctionDoc => "Function Document",
            GenerationMode::TestCases => "Test Cases",
            GenerationMode::DataGeneration => "Test Data",
            GenerationMode::CodeGen => "Code Generation",
        }
    }

    /// Whether a non-blank requirement text must accompany a submit
    pub fn requires_text(self) -> bool {
        self != GenerationMode::DataGeneration
    }

    /// Resolve the dispatch target. The subtype only matters for `DataGeneration`.
    pub fn target(self, subtype: DataGenerationSubtype) -> GenerationTarget {
        match (self, subtype) {
            (GenerationMode::FunctionDoc, _) => GenerationTarget::FunctionDoc,
            (GenerationMode::TestCases, _) => GenerationTarget::TestCases,
            (GenerationMode::DataGeneration, DataGenerationSubtype::Stdcif) => {
                GenerationTarget::Stdcif
            }
            (GenerationMode::DataGeneration, DataGenerationSubtype::Stdcusac) => {
                GenerationTarget::Stdcusac
            }
            (GenerationMode::CodeGen, _) => GenerationTarget::CodeGen,
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "function-doc" | "doc" => Ok(GenerationMode::FunctionDoc),
            "test-cases" | "tests" => Ok(GenerationMode::TestCases),
            "data-generation" | "data" => Ok(GenerationMode::DataGeneration),
            "code-gen" | "code" => Ok(GenerationMode::CodeGen),
            other => Err(format!(
                "Unknown mode '{}' (expected function-doc, test-cases, data-generation or code-gen)",
                other
            )),
        }
    }
}

/// Data-generation sub-option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataGenerationSubtype {
    #[default]
    #[serde(rename = "STDCIF")]
    Stdcif,
    #[serde(rename = "STDCUSAC")]
    Stdcusac,
}

impl DataGenerationSubtype {
    pub const ALL: [DataGenerationSubtype; 2] =
        [DataGenerationSubtype::Stdcif, DataGenerationSubtype::Stdcusac];

    pub fn code(self) -> &'static str {
        match self {
            DataGenerationSubtype::Stdcif => "STDCIF",
            DataGenerationSubtype::Stdcusac => "STDCUSAC",
        }
    }
}

impl fmt::Display for DataGenerationSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DataGenerationSubtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STDCIF" => Ok(DataGenerationSubtype::Stdcif),
            "STDCUSAC" => Ok(DataGenerationSubtype::Stdcusac),
            other => Err(format!(
                "Unknown data subtype '{}' (expected STDCIF or STDCUSAC)",
                other
            )),
        }
    }
}

/// Payload shape sent to an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// `{"text": ...}`
    Text,
    /// `{"count": ...}`
    Count,
}

/// Response shape expected from an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Binary body saved under a fixed filename
    File { filename: &'static str },
    /// JSON `{success, result}` displayed inline
    Inline,
}

/// One row of the dispatch table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchEntry {
    pub endpoint: &'static str,
    pub payload: PayloadKind,
    pub response: ResponseShape,
}

/// Resolved (mode, subtype) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationTarget {
    FunctionDoc,
    TestCases,
    Stdcif,
    Stdcusac,
    CodeGen,
}

impl GenerationTarget {
    pub const ALL: [GenerationTarget; 5] = [
        GenerationTarget::FunctionDoc,
        GenerationTarget::TestCases,
        GenerationTarget::Stdcif,
        GenerationTarget::Stdcusac,
        GenerationTarget::CodeGen,
    ];

    pub const fn entry(self) -> DispatchEntry {
        match self {
            GenerationTarget::FunctionDoc => DispatchEntry {
                endpoint: "/generate-doc",
                payload: PayloadKind::Text,
                response: ResponseShape::File {
                    filename: "function_specification.docx",
                },
            },
            GenerationTarget::TestCases => DispatchEntry {
                endpoint: "/generate-test-cases",
                payload: PayloadKind::Text,
                response: ResponseShape::File {
                    filename: "test_cases.xlsx",
                },
            },
            GenerationTarget::Stdcif => DispatchEntry {
                endpoint: "/generate-stdcif",
                payload: PayloadKind::Count,
                response: ResponseShape::File {
                    filename: "STDCIF_Cases.xlsx",
                },
            },
            GenerationTarget::Stdcusac => DispatchEntry {
                endpoint: "/generate-stdcusac",
                payload: PayloadKind::Count,
                response: ResponseShape::File {
                    filename: "STDCUSAC_Cases.xlsx",
                },
            },
            GenerationTarget::CodeGen => DispatchEntry {
                endpoint: "/generate-code",
                payload: PayloadKind::Text,
                response: ResponseShape::Inline,
            },
        }
    }

    pub fn mode(self) -> GenerationMode {
        match self {
            GenerationTarget::FunctionDoc => GenerationMode::FunctionDoc,
            GenerationTarget::TestCases => GenerationMode::TestCases,
            GenerationTarget::Stdcif | GenerationTarget::Stdcusac => {
                GenerationMode::DataGeneration
            }
            GenerationTarget::CodeGen => GenerationMode::CodeGen,
        }
    }

    pub fn subtype(self) -> Option<DataGenerationSubtype> {
        match self {
            GenerationTarget::Stdcif => Some(DataGenerationSubtype::Stdcif),
            GenerationTarget::Stdcusac => Some(DataGenerationSubtype::Stdcusac),
            _ => None,
        }
    }

    pub fn expects_file(self) -> bool {
        matches!(self.entry().response, ResponseShape::File { .. })
    }

    /// Filename a successful file response is saved under
    pub fn filename(self) -> Option<&'static str> {
        match self.entry().response {
            ResponseShape::File { filename } => Some(filename),
            ResponseShape::Inline => None,
        }
    }
}

/// Result of a mode transition, consumed by the lifecycle and copy indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub previous: GenerationMode,
    pub current: GenerationMode,
}

impl ModeChange {
    /// Leaving code generation discards any stored inline result
    pub fn left_code_gen(&self) -> bool {
        self.previous == GenerationMode::CodeGen
    }
}

/// Active mode and sub-option
#[derive(Debug, Clone, Default)]
pub struct ModeSelector {
    mode: GenerationMode,
    subtype: DataGenerationSubtype,
}

impl ModeSelector {
    pub fn new(mode: GenerationMode) -> Self {
        Self {
            mode,
            subtype: DataGenerationSubtype::default(),
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn subtype(&self) -> DataGenerationSubtype {
        self.subtype
    }

    pub fn target(&self) -> GenerationTarget {
        self.mode.target(self.subtype)
    }

    /// Replace the active mode unconditionally. Selecting the current mode again still
    /// reports a change so transient flags are reset.
    pub fn set_mode(&mut self, new_mode: GenerationMode) -> ModeChange {
        let change = ModeChange {
            previous: self.mode,
            current: new_mode,
        };
        self.mode = new_mode;
        debug!(previous = %change.previous, current = %change.current, "Mode changed");
        change
    }

    pub fn set_subtype(&mut self, subtype: DataGenerationSubtype) {
        self.subtype = subtype;
    }
}
