//! Shared types for the execution round trip.
//!
//! These types define the contract between the session state, the request
//! builder, the renderer and the execution client. They carry no I/O.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Target language of the session. Serialized with the service's wire names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Java,
    Cpp,
    Python,
}

impl Language {
    /// Every supported language, in selector order.
    pub const ALL: [Language; 3] = [Language::Java, Language::Cpp, Language::Python];

    /// Wire name sent to the execution service.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Python => "python",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::Python => "Python",
        }
    }

    /// Syntax highlighting mode for the editor widget.
    pub fn editor_mode(self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Cpp => "c_cpp",
            Language::Python => "python",
        }
    }

    /// Source used to seed a fresh session in this language.
    pub fn starter_snippet(self) -> &'static str {
        match self {
            Language::Java => {
                "public class Main {\n  public static void main(String[] args) {\n    System.out.println(\"Hello, World!\");\n  }\n}"
            }
            Language::Cpp => {
                "#include <iostream>\n\nint main() {\n  std::cout << \"Hello, World!\" << std::endl;\n  return 0;\n}"
            }
            Language::Python => "print(\"Hello, World!\")",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language `{0}` (expected one of: java, cpp, python)")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "java" => Ok(Language::Java),
            "cpp" | "c++" => Ok(Language::Cpp),
            "python" => Ok(Language::Python),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// What `run()` does while a run is already outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPolicy {
    /// The trigger is disabled: a second `run()` is a no-op.
    #[default]
    Ignore,
    /// A second `run()` dispatches a new generation and cancels the old one.
    Supersede,
}

/// Monotonically increasing tag attached to every dispatched run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload posted to the execution service. Built fresh on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionRequest {
    pub language: Language,
    #[serde(rename = "code")]
    pub source_code: String,
    #[serde(rename = "input")]
    pub stdin: String,
}

/// Successful response: the service's combined stdout/diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub output: String,
}

impl ExecutionResult {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

/// Coarse classification used by the UI-facing error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network unreachable, DNS failure, connection reset, transport timeout.
    Transport,
    /// Non-2xx status or a response body of the wrong shape.
    Service,
}

/// A run that did not produce an [`ExecutionResult`].
///
/// The details are for the diagnostic log only; the renderer maps every
/// variant to the same fixed sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionFailure {
    #[error("transport error: {message}")]
    Transport { message: String },
    #[error("service responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response body: {reason}")]
    MalformedBody { reason: String },
}

impl ExecutionFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExecutionFailure::Transport { .. } => FailureKind::Transport,
            ExecutionFailure::Status { .. } | ExecutionFailure::MalformedBody { .. } => {
                FailureKind::Service
            }
        }
    }
}

/// Settled outcome of one execution request.
pub type ExecutionOutcome = Result<ExecutionResult, ExecutionFailure>;
