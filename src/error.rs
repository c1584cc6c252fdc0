//! Error taxonomy for cheatsheet loading and selection
//!
//! Per-document problems are recovered and collected into [`Diagnostics`];
//! only [`SheetError::InvalidFallback`] and [`SheetError::UnknownCheatsheet`]
//! are ever returned to the caller as hard errors.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Everything that can go wrong between reading a sheet file and picking
/// the cheatsheet to display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetError {
    /// The file could not be read or is not valid TOML / not the expected shape
    #[error("{}: malformed document: {reason}", path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    /// A required field (e.g. `id`) is absent or empty
    #[error("{}: missing required field '{field}'", path.display())]
    MissingRequiredField { path: PathBuf, field: String },

    /// The document declares a schema newer than this build understands
    #[error("{}: unsupported schema_version {found} (supported: {supported})", path.display())]
    UnsupportedSchemaVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },

    /// A second file in the same root reuses an id
    #[error("{}: duplicate id '{id}' (already defined in {})", path.display(), first.display())]
    DuplicateId {
        id: String,
        path: PathBuf,
        first: PathBuf,
    },

    /// An `include` entry names an id that does not exist
    #[error("cheatsheet '{id}' includes unknown cheatsheet '{include}'")]
    UnknownInclude { id: String, include: String },

    /// An `include` entry names a document dropped for being on an include cycle
    #[error("cheatsheet '{id}' includes dropped cheatsheet '{include}' (include cycle)")]
    DroppedInclude { id: String, include: String },

    /// The include graph loops back onto a document still being expanded
    #[error("cheatsheet '{id}' is part of an include cycle: {}", cycle.join(" -> "))]
    CyclicInclude { id: String, cycle: Vec<String> },

    /// The configured fallback does not name any loaded cheatsheet
    #[error("fallback cheatsheet '{id}' does not exist")]
    InvalidFallback { id: String },

    /// An explicitly requested cheatsheet does not exist
    #[error("cheatsheet '{id}' does not exist")]
    UnknownCheatsheet { id: String },
}

/// Machine-readable error kind, used in JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MalformedDocument,
    MissingRequiredField,
    UnsupportedSchemaVersion,
    DuplicateId,
    UnknownInclude,
    CyclicInclude,
    InvalidFallback,
    UnknownCheatsheet,
}

impl SheetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SheetError::MalformedDocument { .. } => ErrorKind::MalformedDocument,
            SheetError::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            SheetError::UnsupportedSchemaVersion { .. } => ErrorKind::UnsupportedSchemaVersion,
            SheetError::DuplicateId { .. } => ErrorKind::DuplicateId,
            SheetError::UnknownInclude { .. } | SheetError::DroppedInclude { .. } => {
                ErrorKind::UnknownInclude
            }
            SheetError::CyclicInclude { .. } => ErrorKind::CyclicInclude,
            SheetError::InvalidFallback { .. } => ErrorKind::InvalidFallback,
            SheetError::UnknownCheatsheet { .. } => ErrorKind::UnknownCheatsheet,
        }
    }

    /// Whether the error aborts startup instead of being recovered
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SheetError::InvalidFallback { .. } | SheetError::UnknownCheatsheet { .. }
        )
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedDocument => "MALFORMED_DOCUMENT",
            ErrorKind::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorKind::UnsupportedSchemaVersion => "UNSUPPORTED_SCHEMA_VERSION",
            ErrorKind::DuplicateId => "DUPLICATE_ID",
            ErrorKind::UnknownInclude => "UNKNOWN_INCLUDE",
            ErrorKind::CyclicInclude => "CYCLIC_INCLUDE",
            ErrorKind::InvalidFallback => "INVALID_FALLBACK",
            ErrorKind::UnknownCheatsheet => "UNKNOWN_CHEATSHEET",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recovered errors, collected across all pipeline stages and reported
/// together once the pipeline has run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    errors: Vec<SheetError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recovered error and log it
    pub fn push(&mut self, error: SheetError) {
        tracing::warn!(kind = %error.kind(), "{}", error);
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = SheetError>) {
        for error in errors {
            self.push(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SheetError> {
        self.errors.iter()
    }

    /// Count of errors of the given kind
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn into_vec(self) -> Vec<SheetError> {
        self.errors
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a SheetError;
    type IntoIter = std::slice::Iter<'a, SheetError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
