//! Error type shared by the survey crates
//!
//! Every [`Error`] carries an [`ErrorCode`]. Codes group into a [`Category`],
//! and the category decides the exit code a command-line tool reports.
//! Errors collect context while they travel up the stack and may carry a
//! hint telling the user how to recover.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Broad class of an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Anything without a more specific category
    General,
    /// Filesystem and stream errors
    Io,
    /// Configuration loading
    Config,
    /// Respondent input
    Validation,
    /// Survey and question definitions
    Survey,
}

impl Category {
    /// Process exit code for errors of this category.
    pub fn exit_code(self) -> i32 {
        match self {
            Category::General | Category::Io => exit_codes::FAILURE,
            Category::Config => exit_codes::CONFIG_ERROR,
            Category::Validation => exit_codes::VALIDATION_ERROR,
            Category::Survey => exit_codes::SURVEY_ERROR,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::General => "general",
            Category::Io => "io",
            Category::Config => "config",
            Category::Validation => "validation",
            Category::Survey => "survey",
        };
        f.write_str(name)
    }
}

/// Stable numeric error codes; the thousands digit is the category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Unexpected internal failure
    Internal = 1000,

    /// Generic I/O failure
    Io = 2000,
    /// File does not exist
    FileNotFound = 2001,
    /// File cannot be read or written
    PermissionDenied = 2002,

    /// Generic configuration error
    Config = 3000,
    /// Configuration file does not exist
    ConfigNotFound = 3001,
    /// Configuration file is not valid TOML
    ConfigParse = 3002,

    /// Generic validation error
    Validation = 6000,
    /// A required value is missing
    RequiredFieldMissing = 6001,
    /// A value has the wrong format
    InvalidFormat = 6002,

    /// Generic survey error
    Survey = 7000,
    /// Question definition is malformed
    InvalidQuestion = 7001,
    /// Contact field id is not known
    UnknownField = 7002,
}

impl ErrorCode {
    /// Numeric value of the code
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Category given by the thousands digit
    pub fn category(self) -> Category {
        match self.code() / 1000 {
            2 => Category::Io,
            3 => Category::Config,
            6 => Category::Validation,
            7 => Category::Survey,
            _ => Category::General,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// An error with a code, a context trail and an optional recovery hint
#[derive(Error, Debug)]
#[error("[{code}] {message}")]
pub struct Error {
    /// What went wrong
    pub code: ErrorCode,
    /// Message for the user
    pub message: String,
    /// Outermost context last
    pub context: Vec<String>,
    /// How to recover, if known
    pub hint: Option<String>,
    /// Underlying error
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    /// Error with a code and message and nothing else
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Vec::new(),
            hint: None,
            source: None,
        }
    }

    /// Push a context entry; later calls describe outer frames
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Set the recovery hint
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Keep the underlying error
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Category of the code
    pub fn category(&self) -> Category {
        self.code.category()
    }

    /// Exit code a command-line tool should terminate with.
    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    /// Multi-line rendering for terminals: the error, its context trail
    /// (outermost first) and the hint.
    pub fn render(&self) -> String {
        let mut out = self.to_string();
        for context in self.context.iter().rev() {
            out.push_str("\n  while: ");
            out.push_str(context);
        }
        if let Some(hint) = &self.hint {
            out.push_str("\n  hint: ");
            out.push_str(hint);
        }
        out
    }

    /// Serializable copy of this error
    pub fn report(&self) -> ErrorReport {
        ErrorReport::from(self)
    }

    /// `FileNotFound` for `path`
    pub fn file_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.as_ref().display()),
        )
    }

    /// Generic configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, message)
    }

    /// `ConfigNotFound` for `path`, with a hint
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_hint("Create a .survey-widgets.toml file or pass --config with an existing path")
    }

    /// Generic validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    /// Malformed question definition
    pub fn invalid_question(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidQuestion, message)
    }

    /// Unknown contact field id, with the valid ids as hint
    pub fn unknown_field(field: &str) -> Self {
        Self::new(ErrorCode::UnknownField, format!("Unknown contact field: {}", field))
            .with_hint("Use one of: firstName, lastName, email, phone, company")
    }
}

/// Serializable form of an [`Error`] for `--json` output and log fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Code as displayed, e.g. `E3001`
    pub code: String,
    /// Category of the code
    pub category: Category,
    /// Message for the user
    pub message: String,
    /// Context trail, innermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    /// Recovery hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Underlying error, rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Exit code the process ends with
    pub exit_code: i32,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code.to_string(),
            category: err.category(),
            message: err.message.clone(),
            context: err.context.clone(),
            hint: err.hint.clone(),
            source: err.source.as_ref().map(ToString::to_string),
            exit_code: err.exit_code(),
        }
    }
}

/// Result with the survey [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes used by the command-line tools
pub mod exit_codes {
    /// Command succeeded
    pub const SUCCESS: i32 = 0;
    /// Generic failure
    pub const FAILURE: i32 = 1;
    /// Input failed validation
    pub const VALIDATION_ERROR: i32 = 2;
    /// Configuration could not be loaded
    pub const CONFIG_ERROR: i32 = 3;
    /// Survey or question definition is invalid
    pub const SURVEY_ERROR: i32 = 4;
    /// A search matched nothing
    pub const NO_MATCH: i32 = 5;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::Io,
        };
        Self::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorCode::InvalidFormat, format!("Invalid JSON: {}", err)).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorCode::ConfigParse, format!("Invalid TOML: {}", err)).with_source(err)
    }
}

/// Attach context or a hint to any result whose error converts into [`Error`]
pub trait ResultExt<T> {
    /// Add a context entry to the error
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Set the recovery hint of the error
    fn hint(self, hint: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn hint(self, hint: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_hint(hint))
    }
}
