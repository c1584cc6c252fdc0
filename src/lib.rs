//! Keyhint - context-aware keyboard shortcut cheatsheets
//!
//! Loads cheatsheet documents from a bundled root and a user root, merges
//! user overrides onto the bundled sheets, expands includes, picks the
//! cheatsheet matching the focused window, and assembles a sortable,
//! filterable view of its sections.

pub mod assemble;
pub mod catalog;
pub mod document;
pub mod error;
pub mod include;
pub mod loader;
pub mod logging;
pub mod matcher;
pub mod merge;
pub mod report;
pub mod settings;

pub use assemble::{ResolvedCheatsheet, Section, Shortcut, SortMode};
pub use catalog::Catalog;
pub use document::{ConfigDocument, MatchRule, Provenance};
pub use error::{Diagnostics, ErrorKind, SheetError};
pub use loader::Loader;
pub use matcher::{ActiveWindow, Selection, SelectionReason, SelectionRequest};
pub use report::Report;
pub use settings::{EffectiveSettings, Settings, SettingsError, SettingsOverrides};
