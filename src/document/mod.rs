//! Cheatsheet documents
//!
//! A document is one TOML file describing a cheatsheet:
//!
//! ```toml
//! id = "firefox"
//! url = "https://support.mozilla.org/kb/keyboard-shortcuts"
//! include = ["browser"]
//!
//! [match]
//! regex_wmclass = "firefox"
//! regex_title = ".*"
//!
//! [section."Tabs"]
//! "Ctrl + t" = "New tab"
//! ```
//!
//! Documents move through three shapes: [`RawDocument`] (straight from serde),
//! [`LoadedDocument`] (validated, tagged with provenance) and [`ConfigDocument`]
//! (one per id, after the built-in/user merge).

pub mod schema;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use regex_lite::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Shortcut key label -> description, in declaration order
pub type ShortcutMap = IndexMap<String, String>;

/// Section title -> shortcuts, in declaration order
pub type Sections = IndexMap<String, ShortcutMap>;

/// Deep-union `overlay` into `base`.
///
/// Section titles are unioned; within a shared title the key labels are
/// unioned and the overlay's description wins. Titles and labels already in
/// `base` keep their position, new ones are appended.
pub fn union_sections(base: &mut Sections, overlay: Sections) {
    for (title, shortcuts) in overlay {
        let target = base.entry(title).or_default();
        for (key, description) in shortcuts {
            target.insert(key, description);
        }
    }
}

/// Which root a document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Bundled with the program
    BuiltIn,
    /// User override directory
    User,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::BuiltIn => "built_in",
            Provenance::User => "user",
        }
    }
}

/// A file that contributed to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    pub provenance: Provenance,

    /// Absolute path of the file
    pub path: PathBuf,

    /// SHA-256 digest of raw file bytes
    pub digest: String,
}

/// The `[match]` table as written; either pattern may be absent in an
/// override file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPatterns {
    #[serde(default)]
    pub regex_wmclass: Option<String>,

    #[serde(default)]
    pub regex_title: Option<String>,
}

/// A document as deserialized, before any validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub schema_version: Option<u32>,

    #[serde(default)]
    pub hidden: Option<bool>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default, rename = "match")]
    pub match_patterns: Option<MatchPatterns>,

    #[serde(default)]
    pub include: Option<Vec<String>>,

    #[serde(default)]
    pub section: Sections,
}

/// The overridable content of a document.
///
/// `None` means "not set in this file", which is different from an explicit
/// value: an unset field in a user file never blanks out the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFields {
    pub hidden: Option<bool>,
    pub url: Option<String>,
    pub match_patterns: Option<MatchPatterns>,
    pub include: Option<Vec<String>>,
    pub sections: Sections,
}

impl From<RawDocument> for DocumentFields {
    fn from(raw: RawDocument) -> Self {
        Self {
            hidden: raw.hidden,
            url: raw.url,
            match_patterns: raw.match_patterns,
            include: raw.include,
            sections: raw.section,
        }
    }
}

/// One successfully parsed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub id: String,
    pub source: DocumentSource,
    pub fields: DocumentFields,
}

impl LoadedDocument {
    pub fn provenance(&self) -> Provenance {
        self.source.provenance
    }
}

/// Compiled auto-selection rule. Both patterns are case-insensitive and
/// unanchored; both must match.
#[derive(Debug, Clone)]
pub struct MatchRule {
    regex_wmclass: String,
    regex_title: String,
    wmclass: Regex,
    title: Regex,
}

impl MatchRule {
    pub fn new(regex_wmclass: &str, regex_title: &str) -> Result<Self, regex_lite::Error> {
        Ok(Self {
            regex_wmclass: regex_wmclass.to_string(),
            regex_title: regex_title.to_string(),
            wmclass: compile(regex_wmclass)?,
            title: compile(regex_title)?,
        })
    }

    pub fn regex_wmclass(&self) -> &str {
        &self.regex_wmclass
    }

    pub fn regex_title(&self) -> &str {
        &self.regex_title
    }

    pub fn matches_wmclass(&self, wmclass: &str) -> bool {
        self.wmclass.is_match(wmclass)
    }

    pub fn matches_title(&self, title: &str) -> bool {
        self.title.is_match(title)
    }

    pub fn matches(&self, wmclass: &str, title: &str) -> bool {
        self.matches_wmclass(wmclass) && self.matches_title(title)
    }
}

impl PartialEq for MatchRule {
    fn eq(&self, other: &Self) -> bool {
        self.regex_wmclass == other.regex_wmclass && self.regex_title == other.regex_title
    }
}

impl Eq for MatchRule {}

/// Compile a pattern the way match rules use it
pub fn compile(pattern: &str) -> Result<Regex, regex_lite::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// One logical cheatsheet after the built-in/user merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    pub id: String,
    pub hidden: bool,
    pub url: Option<String>,
    pub match_rule: Option<MatchRule>,
    pub include: Vec<String>,
    pub sections: Sections,

    /// Provenance of the last file applied
    pub provenance: Provenance,

    /// Path of the last file applied
    pub source_path: PathBuf,

    /// Every contributing file, built-in first
    pub sources: Vec<DocumentSource>,
}

impl ConfigDocument {
    /// File name used for match ordering
    pub fn file_name(&self) -> &str {
        file_name(&self.source_path)
    }

    /// Total number of shortcuts across sections
    pub fn shortcut_count(&self) -> usize {
        self.sections.values().map(|s| s.len()).sum()
    }
}

pub(crate) fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(entries: &[(&str, &[(&str, &str)])]) -> Sections {
        entries
            .iter()
            .map(|(title, shortcuts)| {
                let map = shortcuts
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                (title.to_string(), map)
            })
            .collect()
    }

    #[test]
    fn test_union_overlay_wins_on_shared_label() {
        let mut base = sections(&[("A", &[("k1", "x")])]);
        union_sections(&mut base, sections(&[("A", &[("k1", "y"), ("k2", "z")])]));

        assert_eq!(base["A"]["k1"], "y");
        assert_eq!(base["A"]["k2"], "z");
        assert_eq!(base["A"].len(), 2);
    }

    #[test]
    fn test_union_keeps_existing_positions() {
        let mut base = sections(&[("First", &[("a", "1")]), ("Second", &[("b", "2")])]);
        union_sections(
            &mut base,
            sections(&[("Third", &[("c", "3")]), ("First", &[("a", "9")])]),
        );

        let titles: Vec<&str> = base.keys().map(|s| s.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
        assert_eq!(base["First"]["a"], "9");
    }

    #[test]
    fn test_match_rule_is_case_insensitive() {
        let rule = MatchRule::new("firefox", "github").unwrap();
        assert!(rule.matches("Firefox", "GitHub - foo"));
        assert!(!rule.matches("firefox", "Mozilla"));
        assert!(!rule.matches("chromium", "GitHub"));
    }

    #[test]
    fn test_match_rule_empty_input_does_not_error() {
        let rule = MatchRule::new("code", ".+").unwrap();
        assert!(!rule.matches("", ""));

        let anything = MatchRule::new(".*", ".*").unwrap();
        assert!(anything.matches("", ""));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(MatchRule::new("(unclosed", ".*").is_err());
    }

    #[test]
    fn test_raw_document_preserves_section_order() {
        let raw: RawDocument = toml::from_str(
            r#"
            id = "demo"

            [section."Zeta"]
            "z" = "last letter"

            [section."Alpha"]
            "b" = "second"
            "a" = "first"
            "#,
        )
        .unwrap();

        let titles: Vec<&str> = raw.section.keys().map(|s| s.as_str()).collect();
        assert_eq!(titles, vec!["Zeta", "Alpha"]);
        let keys: Vec<&str> = raw.section["Alpha"].keys().map(|s| s.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert!(raw.hidden.is_none());
    }
}
