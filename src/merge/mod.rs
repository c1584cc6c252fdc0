//! Built-in/user document merge
//!
//! Merge semantics, per id:
//! - Scalars (`hidden`, `url`, `include`): the user value wins, but only when
//!   the user file sets it
//! - `match`: merged per pattern, same rule as scalars
//! - Sections: deep-union, user descriptions win for identical key labels
//!
//! An id that exists only in the user root is a new document.

use indexmap::IndexMap;

use crate::document::{
    union_sections, ConfigDocument, DocumentFields, DocumentSource, LoadedDocument, MatchPatterns,
    MatchRule, Provenance,
};
use crate::error::SheetError;

/// Overlay `over` onto `base`, field by field.
pub fn overlay(base: DocumentFields, over: DocumentFields) -> DocumentFields {
    let mut sections = base.sections;
    union_sections(&mut sections, over.sections);

    DocumentFields {
        hidden: over.hidden.or(base.hidden),
        url: over.url.or(base.url),
        match_patterns: overlay_match(base.match_patterns, over.match_patterns),
        include: over.include.or(base.include),
        sections,
    }
}

fn overlay_match(base: Option<MatchPatterns>, over: Option<MatchPatterns>) -> Option<MatchPatterns> {
    match (base, over) {
        (Some(base), Some(over)) => Some(MatchPatterns {
            regex_wmclass: over.regex_wmclass.or(base.regex_wmclass),
            regex_title: over.regex_title.or(base.regex_title),
        }),
        (base, over) => over.or(base),
    }
}

/// Fold several layers of the same document, lowest precedence first
pub fn overlay_all(layers: impl IntoIterator<Item = DocumentFields>) -> DocumentFields {
    layers.into_iter().fold(DocumentFields::default(), overlay)
}

/// Result of merging all loaded documents
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// One document per id, ordered by originating file name
    pub documents: Vec<ConfigDocument>,

    pub errors: Vec<SheetError>,
}

#[derive(Default)]
struct Layers {
    builtin: Option<LoadedDocument>,
    user: Option<LoadedDocument>,
}

/// Merge loaded documents into one logical document per id.
///
/// Input order must be the loader's order; within a root the first file
/// claiming an id keeps it and later ones are reported as duplicates.
pub fn merge_documents(loaded: Vec<LoadedDocument>) -> MergeOutcome {
    let mut errors = Vec::new();
    let mut by_id: IndexMap<String, Layers> = IndexMap::new();

    for document in loaded {
        let layers = by_id.entry(document.id.clone()).or_default();
        let slot = match document.provenance() {
            Provenance::BuiltIn => &mut layers.builtin,
            Provenance::User => &mut layers.user,
        };
        if let Some(first) = slot.as_ref() {
            errors.push(SheetError::DuplicateId {
                id: document.id.clone(),
                path: document.source.path.clone(),
                first: first.source.path.clone(),
            });
        } else {
            *slot = Some(document);
        }
    }

    let mut documents = Vec::with_capacity(by_id.len());
    for (id, layers) in by_id {
        let applied: Vec<LoadedDocument> = layers.builtin.into_iter().chain(layers.user).collect();
        let sources: Vec<DocumentSource> = applied.iter().map(|d| d.source.clone()).collect();
        if sources.len() > 1 {
            tracing::debug!(id = %id, "user sheet overrides built-in sheet");
        }
        let fields = overlay_all(applied.into_iter().map(|d| d.fields));
        let (document, finalize_errors) = finalize(id, fields, sources);
        errors.extend(finalize_errors);
        documents.push(document);
    }

    documents.sort_by(|a, b| a.file_name().cmp(b.file_name()).then_with(|| a.id.cmp(&b.id)));

    MergeOutcome { documents, errors }
}

/// Turn merged fields into a document, applying defaults and compiling the
/// match rule. A rule with a missing pattern is dropped, so the document can
/// still be shown but is never auto-selected.
pub fn finalize(
    id: String,
    fields: DocumentFields,
    sources: Vec<DocumentSource>,
) -> (ConfigDocument, Vec<SheetError>) {
    let mut errors = Vec::new();
    let last = sources.last().cloned();
    let (provenance, source_path) = match last {
        Some(source) => (source.provenance, source.path),
        None => (Provenance::BuiltIn, Default::default()),
    };

    let match_rule = match fields.match_patterns {
        None => None,
        Some(MatchPatterns {
            regex_wmclass: Some(wmclass),
            regex_title: Some(title),
        }) => match MatchRule::new(&wmclass, &title) {
            Ok(rule) => Some(rule),
            Err(e) => {
                errors.push(SheetError::MalformedDocument {
                    path: source_path.clone(),
                    reason: format!("invalid match rule: {}", e),
                });
                None
            }
        },
        Some(MatchPatterns { regex_wmclass, .. }) => {
            let field = if regex_wmclass.is_none() {
                "match.regex_wmclass"
            } else {
                "match.regex_title"
            };
            errors.push(SheetError::MissingRequiredField {
                path: source_path.clone(),
                field: field.to_string(),
            });
            None
        }
    };

    let document = ConfigDocument {
        id,
        hidden: fields.hidden.unwrap_or(false),
        url: fields.url.filter(|u| !u.is_empty()),
        match_rule,
        include: fields.include.unwrap_or_default(),
        sections: fields.sections,
        provenance,
        source_path,
        sources,
    };

    (document, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Sections;
    use std::path::PathBuf;

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

    fn loaded(id: &str, provenance: Provenance, file: &str, fields: DocumentFields) -> LoadedDocument {
        let root = match provenance {
            Provenance::BuiltIn => "/usr/share/keyhint",
            Provenance::User => "/home/me/.config/keyhint",
        };
        LoadedDocument {
            id: id.to_string(),
            source: DocumentSource {
                provenance,
                path: PathBuf::from(root).join(file),
                digest: String::new(),
            },
            fields,
        }
    }

    fn patterns(wmclass: Option<&str>, title: Option<&str>) -> Option<MatchPatterns> {
        Some(MatchPatterns {
            regex_wmclass: wmclass.map(String::from),
            regex_title: title.map(String::from),
        })
    }

    #[test]
    fn test_user_section_overrides_builtin_label() {
        let builtin = DocumentFields {
            sections: sections(&[("A", &[("k1", "x")])]),
            ..Default::default()
        };
        let user = DocumentFields {
            sections: sections(&[("A", &[("k1", "y"), ("k2", "z")])]),
            ..Default::default()
        };

        let merged = overlay(builtin, user);

        assert_eq!(merged.sections, sections(&[("A", &[("k1", "y"), ("k2", "z")])]));
    }

    #[test]
    fn test_unset_user_field_keeps_builtin_value() {
        let builtin = DocumentFields {
            hidden: Some(true),
            url: Some("https://example.com".to_string()),
            include: Some(vec!["common".to_string()]),
            match_patterns: patterns(Some("code"), Some(".*")),
            ..Default::default()
        };
        let user = DocumentFields {
            sections: sections(&[("Extra", &[("a", "b")])]),
            ..Default::default()
        };

        let merged = overlay(builtin.clone(), user);

        assert_eq!(merged.hidden, Some(true));
        assert_eq!(merged.url, builtin.url);
        assert_eq!(merged.include, builtin.include);
        assert_eq!(merged.match_patterns, builtin.match_patterns);
    }

    #[test]
    fn test_explicit_user_value_overrides() {
        let builtin = DocumentFields {
            hidden: Some(true),
            include: Some(vec!["common".to_string()]),
            ..Default::default()
        };
        let user = DocumentFields {
            hidden: Some(false),
            include: Some(vec![]),
            ..Default::default()
        };

        let merged = overlay(builtin, user);

        assert_eq!(merged.hidden, Some(false));
        assert_eq!(merged.include, Some(vec![]));
    }

    #[test]
    fn test_match_merged_per_pattern() {
        let builtin = DocumentFields {
            match_patterns: patterns(Some("firefox"), Some(".*")),
            ..Default::default()
        };
        let user = DocumentFields {
            match_patterns: patterns(None, Some("GitHub")),
            ..Default::default()
        };

        let merged = overlay(builtin, user);

        assert_eq!(merged.match_patterns, patterns(Some("firefox"), Some("GitHub")));
    }

    #[test]
    fn test_overlay_with_itself_is_identity() {
        let doc = DocumentFields {
            hidden: Some(false),
            url: Some("https://example.com".to_string()),
            match_patterns: patterns(Some("a"), Some("b")),
            include: Some(vec!["x".to_string()]),
            sections: sections(&[("S", &[("a", "1"), ("b", "2")]), ("T", &[("c", "3")])]),
        };

        assert_eq!(overlay(doc.clone(), doc.clone()), doc);
    }

    #[test]
    fn test_merge_documents_one_per_id() {
        let outcome = merge_documents(vec![
            loaded(
                "editor",
                Provenance::BuiltIn,
                "editor.toml",
                DocumentFields {
                    sections: sections(&[("A", &[("k1", "x")])]),
                    match_patterns: patterns(Some("code"), Some(".*")),
                    ..Default::default()
                },
            ),
            loaded(
                "editor",
                Provenance::User,
                "my-editor.toml",
                DocumentFields {
                    sections: sections(&[("A", &[("k1", "y")])]),
                    ..Default::default()
                },
            ),
            loaded("notes", Provenance::User, "notes.toml", DocumentFields::default()),
        ]);

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.documents.len(), 2);

        let editor = outcome.documents.iter().find(|d| d.id == "editor").unwrap();
        assert_eq!(editor.sections["A"]["k1"], "y");
        assert_eq!(editor.provenance, Provenance::User);
        assert!(editor.source_path.ends_with("my-editor.toml"));
        assert_eq!(editor.sources.len(), 2);
        assert_eq!(editor.sources[0].provenance, Provenance::BuiltIn);
        assert!(editor.match_rule.is_some());

        let notes = outcome.documents.iter().find(|d| d.id == "notes").unwrap();
        assert_eq!(notes.provenance, Provenance::User);
        assert!(!notes.hidden);
    }

    #[test]
    fn test_documents_sorted_by_file_name() {
        let outcome = merge_documents(vec![
            loaded("zeta", Provenance::BuiltIn, "a-zeta.toml", DocumentFields::default()),
            loaded("alpha", Provenance::BuiltIn, "b-alpha.toml", DocumentFields::default()),
            loaded("mid", Provenance::User, "aa-mid.toml", DocumentFields::default()),
        ]);

        let ids: Vec<&str> = outcome.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "mid", "alpha"]);
    }

    #[test]
    fn test_duplicate_id_in_same_root_keeps_first() {
        let outcome = merge_documents(vec![
            loaded(
                "dup",
                Provenance::BuiltIn,
                "a.toml",
                DocumentFields {
                    url: Some("first".to_string()),
                    ..Default::default()
                },
            ),
            loaded(
                "dup",
                Provenance::BuiltIn,
                "b.toml",
                DocumentFields {
                    url: Some("second".to_string()),
                    ..Default::default()
                },
            ),
        ]);

        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.documents[0].url.as_deref(), Some("first"));
        assert!(matches!(
            &outcome.errors[0],
            SheetError::DuplicateId { id, .. } if id == "dup"
        ));
    }

    #[test]
    fn test_incomplete_match_rule_dropped_with_error() {
        let outcome = merge_documents(vec![loaded(
            "half",
            Provenance::User,
            "half.toml",
            DocumentFields {
                match_patterns: patterns(Some("term"), None),
                ..Default::default()
            },
        )]);

        assert!(outcome.documents[0].match_rule.is_none());
        assert!(matches!(
            &outcome.errors[0],
            SheetError::MissingRequiredField { field, .. } if field == "match.regex_title"
        ));
    }
}
