//! Section assembler
//!
//! Turns a resolved [`ConfigDocument`] into the view handed to a presentation
//! layer. Sorting and filtering are pure functions over the assembled
//! sections and never touch the catalog.

pub mod keys;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::ConfigDocument;

/// One key label and what it does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub key: String,
    pub description: String,
}

impl Shortcut {
    /// Key label rendered as keycaps
    pub fn keycaps(&self) -> Vec<keys::KeyToken> {
        keys::tokenize(&self.key)
    }

    /// `needle` must already be lowercase
    fn contains(&self, needle: &str) -> bool {
        self.key.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub shortcuts: Vec<Shortcut>,
}

impl Section {
    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }
}

/// A cheatsheet ready for display, sections in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCheatsheet {
    pub id: String,
    pub hidden: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub sections: Vec<Section>,
}

impl ResolvedCheatsheet {
    /// Flatten a resolved document. Sections left without shortcuts are
    /// omitted.
    pub fn from_document(document: &ConfigDocument) -> Self {
        let sections = document
            .sections
            .iter()
            .filter(|(_, shortcuts)| !shortcuts.is_empty())
            .map(|(title, shortcuts)| Section {
                title: title.clone(),
                shortcuts: shortcuts
                    .iter()
                    .map(|(key, description)| Shortcut {
                        key: key.clone(),
                        description: description.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: document.id.clone(),
            hidden: document.hidden,
            url: document.url.clone(),
            sections,
        }
    }

    /// Total number of shortcuts
    pub fn size(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    /// Sections sorted by `mode`, then filtered by `query`
    pub fn view(&self, mode: SortMode, query: &str) -> Vec<Section> {
        filter_sections(&sort_sections(&self.sections, mode), query)
    }
}

/// Section presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Declaration order
    Native,
    /// Most shortcuts first
    #[default]
    Size,
    /// Case-insensitive by title
    Title,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [SortMode::Native, SortMode::Size, SortMode::Title];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Native => "native",
            SortMode::Size => "size",
            SortMode::Title => "title",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort mode '{0}' (expected native, size or title)")]
pub struct ParseSortModeError(pub String);

impl FromStr for SortMode {
    type Err = ParseSortModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSortModeError(s.to_string()))
    }
}

/// Sections reordered by `mode`. Both sorts are stable, so ties keep their
/// incoming order.
pub fn sort_sections(sections: &[Section], mode: SortMode) -> Vec<Section> {
    let mut sorted = sections.to_vec();
    match mode {
        SortMode::Native => {}
        SortMode::Size => sorted.sort_by(|a, b| b.len().cmp(&a.len())),
        SortMode::Title => sorted.sort_by_cached_key(|s| s.title.to_lowercase()),
    }
    sorted
}

/// Sections restricted to shortcuts whose key label or description contains
/// `query`, ignoring case. Sections with no hit are dropped; order is kept.
/// An empty query keeps everything. Whitespace in the query is significant.
pub fn filter_sections(sections: &[Section], query: &str) -> Vec<Section> {
    if query.is_empty() {
        return sections.to_vec();
    }
    let needle = query.to_lowercase();

    sections
        .iter()
        .filter_map(|section| {
            let shortcuts: Vec<Shortcut> = section
                .shortcuts
                .iter()
                .filter(|s| s.contains(&needle))
                .cloned()
                .collect();
            if shortcuts.is_empty() {
                None
            } else {
                Some(Section {
                    title: section.title.clone(),
                    shortcuts,
                })
            }
        })
        .collect()
}
