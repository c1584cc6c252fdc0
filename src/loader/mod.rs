//! Document loader
//!
//! Reads every `*.toml` file from the built-in root and the user root, in
//! file-name order within each root, and turns each into a
//! [`LoadedDocument`]. A broken file is reported and skipped; it never stops
//! the other files from loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::document::schema;
use crate::document::{
    compile, DocumentFields, DocumentSource, LoadedDocument, Provenance, RawDocument,
};
use crate::error::SheetError;

/// Extension of sheet files
pub const SHEET_EXTENSION: &str = "toml";

/// Result of loading one or more roots
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    /// Built-in documents first, then user documents; file-name order within each
    pub documents: Vec<LoadedDocument>,

    /// Files that were skipped
    pub errors: Vec<SheetError>,
}

impl LoadOutcome {
    /// Paths of every document that loaded
    pub fn paths(&self) -> Vec<&Path> {
        self.documents.iter().map(|d| d.source.path.as_path()).collect()
    }

    fn append(&mut self, other: LoadOutcome) {
        self.documents.extend(other.documents);
        self.errors.extend(other.errors);
    }
}

/// The two sheet roots
#[derive(Debug, Clone)]
pub struct Loader {
    builtin_dir: PathBuf,
    user_dir: PathBuf,
}

impl Loader {
    pub fn new(builtin_dir: impl Into<PathBuf>, user_dir: impl Into<PathBuf>) -> Self {
        Self {
            builtin_dir: builtin_dir.into(),
            user_dir: user_dir.into(),
        }
    }

    pub fn builtin_dir(&self) -> &Path {
        &self.builtin_dir
    }

    pub fn user_dir(&self) -> &Path {
        &self.user_dir
    }

    /// Load both roots, built-in first
    pub fn load(&self) -> LoadOutcome {
        let mut outcome = load_root(&self.builtin_dir, Provenance::BuiltIn);
        outcome.append(load_root(&self.user_dir, Provenance::User));
        tracing::debug!(
            documents = outcome.documents.len(),
            skipped = outcome.errors.len(),
            "loaded sheet files"
        );
        outcome
    }
}

/// Load every sheet file directly inside `dir`.
///
/// A missing directory is not an error: a fresh install has no user sheets.
pub fn load_root(dir: &Path, provenance: Provenance) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();

    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "sheet directory does not exist, skipping");
        return outcome;
    }

    let root = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());

    for entry in WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                outcome.errors.push(SheetError::MalformedDocument {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || !is_sheet_file(path) {
            continue;
        }

        match load_file(path, provenance) {
            Ok(document) => {
                tracing::debug!(
                    id = %document.id,
                    path = %path.display(),
                    provenance = provenance.as_str(),
                    "loaded sheet"
                );
                outcome.documents.push(document);
            }
            Err(e) => outcome.errors.push(e),
        }
    }

    outcome
}

fn is_sheet_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SHEET_EXTENSION)
}

/// Read, migrate and validate a single sheet file
pub fn load_file(path: &Path, provenance: Provenance) -> Result<LoadedDocument, SheetError> {
    let malformed = |reason: String| SheetError::MalformedDocument {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = fs::read(path).map_err(|e| malformed(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents =
        String::from_utf8(bytes).map_err(|e| malformed(format!("invalid UTF-8: {}", e)))?;

    let source = DocumentSource {
        provenance,
        path: path.to_path_buf(),
        digest,
    };
    parse_document(&contents, source)
}

/// Parse sheet text that came from `source`
pub fn parse_document(contents: &str, source: DocumentSource) -> Result<LoadedDocument, SheetError> {
    let path = source.path.as_path();
    let malformed = |reason: String| SheetError::MalformedDocument {
        path: path.to_path_buf(),
        reason,
    };

    let mut table: toml::Table =
        toml::from_str(contents).map_err(|e| malformed(format!("TOML parse error: {}", e)))?;

    schema::migrate(&mut table, path)?;

    let raw = RawDocument::deserialize(toml::Value::Table(table))
        .map_err(|e| malformed(e.to_string()))?;

    let id = match raw.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(SheetError::MissingRequiredField {
                path: path.to_path_buf(),
                field: "id".to_string(),
            })
        }
    };

    if let Some(patterns) = &raw.match_patterns {
        for (field, pattern) in [
            ("regex_wmclass", &patterns.regex_wmclass),
            ("regex_title", &patterns.regex_title),
        ] {
            if let Some(pattern) = pattern {
                compile(pattern).map_err(|e| malformed(format!("invalid match.{}: {}", field, e)))?;
            }
        }
    }

    Ok(LoadedDocument {
        id,
        source,
        fields: DocumentFields::from(raw),
    })
}
