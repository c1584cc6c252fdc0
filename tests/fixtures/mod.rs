//! Shared fixtures for integration tests
//!
//! - Temporary built-in and user sheet roots
//! - Path to the sheets bundled with the crate

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use keyhint::{Catalog, Loader};
use tempfile::TempDir;

/// Sheets shipped with the crate
pub fn bundled_sheets_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("sheets")
}

/// A pair of empty sheet roots that clean up on drop
pub struct SheetRoots {
    pub builtin: TempDir,
    pub user: TempDir,
}

impl SheetRoots {
    pub fn new() -> Self {
        Self {
            builtin: TempDir::new().unwrap(),
            user: TempDir::new().unwrap(),
        }
    }

    pub fn write_builtin(&self, name: &str, contents: &str) -> &Self {
        fs::write(self.builtin.path().join(name), contents).unwrap();
        self
    }

    pub fn write_user(&self, name: &str, contents: &str) -> &Self {
        fs::write(self.user.path().join(name), contents).unwrap();
        self
    }

    pub fn loader(&self) -> Loader {
        Loader::new(self.builtin.path(), self.user.path())
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::load(self.loader())
    }
}

/// Minimal fallback sheet
pub const FALLBACK_SHEET: &str = r#"
id = "keyhint"
[section."Keyhint"]
"Esc" = "Close"
"#;

/// A sheet with a match rule and one section
pub fn matching_sheet(id: &str, wmclass: &str, title: &str) -> String {
    format!(
        "id = \"{id}\"\n[match]\nregex_wmclass = \"{wmclass}\"\nregex_title = \"{title}\"\n[section.\"{id}\"]\n\"k\" = \"{id} shortcut\"\n"
    )
}
