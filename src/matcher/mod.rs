//! Window matcher
//!
//! Picks the cheatsheet to show first for the focused window.
//!
//! Selection algorithm:
//! 1. An explicit id wins outright, even for hidden cheatsheets
//! 2. Otherwise walk documents in ascending file-name order (ties by id)
//! 3. Skip hidden documents and documents without a match rule
//! 4. The first document whose class AND title patterns both match wins
//! 5. No match selects the configured fallback, which must exist
//!
//! Step 4 is first-match-wins: a later, more specific document never beats
//! an earlier, looser one. That ordering is part of the user-facing contract.

pub mod explain;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::document::ConfigDocument;
use crate::error::SheetError;

/// Class and title of the focused window. Either may be empty when the
/// window system cannot tell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    pub wmclass: String,
    pub title: String,
}

impl ActiveWindow {
    pub fn new(wmclass: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            wmclass: wmclass.into(),
            title: title.into(),
        }
    }
}

/// Why a cheatsheet was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// Requested by id
    Explicit,
    /// Match rule matched the active window
    Matched,
    /// Nothing matched
    Fallback,
}

impl SelectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionReason::Explicit => "explicit",
            SelectionReason::Matched => "matched",
            SelectionReason::Fallback => "fallback",
        }
    }
}

/// Inputs to selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRequest {
    /// Explicit cheatsheet id, bypasses matching
    pub explicit: Option<String>,

    /// Id returned when no rule matches
    pub fallback: String,

    pub window: ActiveWindow,
}

impl SelectionRequest {
    pub fn new(fallback: impl Into<String>, window: ActiveWindow) -> Self {
        Self {
            explicit: None,
            fallback: fallback.into(),
            window,
        }
    }

    pub fn with_explicit(mut self, id: impl Into<String>) -> Self {
        self.explicit = Some(id.into());
        self
    }
}

/// The chosen cheatsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub id: String,
    pub reason: SelectionReason,
}

/// Order used for matching: file name, then id
pub fn match_order(a: &ConfigDocument, b: &ConfigDocument) -> Ordering {
    a.file_name()
        .cmp(b.file_name())
        .then_with(|| a.id.cmp(&b.id))
}

/// Documents sorted into match order
pub fn in_match_order(documents: &[ConfigDocument]) -> Vec<&ConfigDocument> {
    let mut ordered: Vec<&ConfigDocument> = documents.iter().collect();
    ordered.sort_by(|a, b| match_order(a, b));
    ordered
}

/// Whether a document may be auto-selected for `window`
pub fn is_candidate(document: &ConfigDocument, window: &ActiveWindow) -> bool {
    if document.hidden {
        return false;
    }
    match &document.match_rule {
        Some(rule) => rule.matches(&window.wmclass, &window.title),
        None => false,
    }
}

/// First document in match order whose rule matches `window`
pub fn first_match<'a>(
    documents: &'a [ConfigDocument],
    window: &ActiveWindow,
) -> Option<&'a ConfigDocument> {
    in_match_order(documents)
        .into_iter()
        .find(|document| is_candidate(document, window))
}

/// Select the cheatsheet to display first.
pub fn select(
    documents: &[ConfigDocument],
    request: &SelectionRequest,
) -> Result<Selection, SheetError> {
    let exists = |id: &str| documents.iter().any(|d| d.id == id);

    if let Some(id) = &request.explicit {
        if !exists(id) {
            return Err(SheetError::UnknownCheatsheet { id: id.clone() });
        }
        return Ok(Selection {
            id: id.clone(),
            reason: SelectionReason::Explicit,
        });
    }

    if let Some(document) = first_match(documents, &request.window) {
        tracing::debug!(
            id = %document.id,
            file = document.file_name(),
            wmclass = %request.window.wmclass,
            title = %request.window.title,
            "match rule selected cheatsheet"
        );
        return Ok(Selection {
            id: document.id.clone(),
            reason: SelectionReason::Matched,
        });
    }

    if !exists(&request.fallback) {
        return Err(SheetError::InvalidFallback {
            id: request.fallback.clone(),
        });
    }
    tracing::debug!(id = %request.fallback, "no match rule matched, using fallback");
    Ok(Selection {
        id: request.fallback.clone(),
        reason: SelectionReason::Fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MatchRule, Provenance, Sections};
    use std::path::PathBuf;

    fn doc(file: &str, id: &str, rule: Option<(&str, &str)>) -> ConfigDocument {
        ConfigDocument {
            id: id.to_string(),
            hidden: false,
            url: None,
            match_rule: rule.map(|(w, t)| MatchRule::new(w, t).unwrap()),
            include: vec![],
            sections: Sections::new(),
            provenance: Provenance::BuiltIn,
            source_path: PathBuf::from(format!("/sheets/{}", file)),
            sources: vec![],
        }
    }

    fn hidden(mut document: ConfigDocument) -> ConfigDocument {
        document.hidden = true;
        document
    }

    fn request(wmclass: &str, title: &str) -> SelectionRequest {
        SelectionRequest::new("keyhint", ActiveWindow::new(wmclass, title))
    }

    #[test]
    fn test_first_match_wins_in_file_name_order() {
        // Intentional: the earlier file wins even though the later one is
        // more specific to the window.
        let documents = vec![
            doc("b-github.toml", "github", Some(("firefox", "github"))),
            doc("a-firefox.toml", "firefox", Some(("firefox", ".*"))),
            doc("keyhint.toml", "keyhint", None),
        ];

        let selection = select(&documents, &request("firefox", "GitHub - foo")).unwrap();

        assert_eq!(selection.id, "firefox");
        assert_eq!(selection.reason, SelectionReason::Matched);
    }

    #[test]
    fn test_loose_earlier_rule_must_match_both_patterns() {
        let documents = vec![
            doc("a.toml", "loose", Some(("firefox", "gitlab"))),
            doc("b.toml", "exact", Some(("firefox", "github"))),
            doc("keyhint.toml", "keyhint", None),
        ];

        let selection = select(&documents, &request("firefox", "GitHub - foo")).unwrap();

        assert_eq!(selection.id, "exact");
    }

    #[test]
    fn test_hidden_never_auto_selected() {
        let documents = vec![
            hidden(doc("a.toml", "secret", Some((".*", ".*")))),
            doc("keyhint.toml", "keyhint", None),
        ];

        let selection = select(&documents, &request("anything", "anything")).unwrap();
        assert_eq!(selection.id, "keyhint");
        assert_eq!(selection.reason, SelectionReason::Fallback);
    }

    #[test]
    fn test_hidden_returned_when_explicit() {
        let documents = vec![
            hidden(doc("a.toml", "secret", Some((".*", ".*")))),
            doc("keyhint.toml", "keyhint", None),
        ];

        let selection = select(&documents, &request("x", "y").with_explicit("secret")).unwrap();
        assert_eq!(
            selection,
            Selection {
                id: "secret".to_string(),
                reason: SelectionReason::Explicit,
            }
        );
    }

    #[test]
    fn test_explicit_unknown_id_is_error() {
        let documents = vec![doc("keyhint.toml", "keyhint", None)];
        let err = select(&documents, &request("x", "y").with_explicit("nope")).unwrap_err();
        assert_eq!(err, SheetError::UnknownCheatsheet { id: "nope".to_string() });
    }

    #[test]
    fn test_document_without_rule_never_matches() {
        let documents = vec![doc("a.toml", "norule", None), doc("keyhint.toml", "keyhint", None)];
        let selection = select(&documents, &request("norule", "norule")).unwrap();
        assert_eq!(selection.reason, SelectionReason::Fallback);
    }

    #[test]
    fn test_missing_fallback_is_error() {
        let documents = vec![doc("a.toml", "only", Some(("code", ".*")))];
        let err = select(&documents, &request("firefox", "x")).unwrap_err();
        assert_eq!(err, SheetError::InvalidFallback { id: "keyhint".to_string() });
    }

    #[test]
    fn test_hidden_fallback_is_allowed() {
        let documents = vec![hidden(doc("keyhint.toml", "keyhint", None))];
        let selection = select(&documents, &request("", "")).unwrap();
        assert_eq!(selection.id, "keyhint");
        assert_eq!(selection.reason, SelectionReason::Fallback);
    }

    #[test]
    fn test_empty_window_is_not_an_error() {
        let documents = vec![
            doc("a.toml", "code", Some(("code", ".+"))),
            doc("keyhint.toml", "keyhint", None),
        ];
        let selection = select(&documents, &request("", "")).unwrap();
        assert_eq!(selection.reason, SelectionReason::Fallback);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let documents = vec![
            doc("a.toml", "code", Some(("^code$", "visual studio"))),
            doc("keyhint.toml", "keyhint", None),
        ];
        let selection = select(&documents, &request("Code", "main.rs - Visual Studio Code")).unwrap();
        assert_eq!(selection.id, "code");
    }

    #[test]
    fn test_match_order_ties_broken_by_id() {
        let documents = vec![
            doc("same.toml", "zeta", Some((".*", ".*"))),
            doc("same.toml", "alpha", Some((".*", ".*"))),
        ];
        let ids: Vec<&str> = in_match_order(&documents).iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }
}
