//! Explain output for the window matcher
//!
//! Lists every document in match order with how each pattern fared against
//! the active window, for diagnosing "why did I get this cheatsheet".

use serde::{Deserialize, Serialize};

use super::{in_match_order, select, ActiveWindow, SelectionReason, SelectionRequest};
use crate::document::ConfigDocument;

/// What happened to one document during matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOutcome {
    /// This document was selected
    Selected,
    /// Both patterns matched but an earlier document was selected
    Shadowed,
    /// Both patterns matched but an explicit id was requested
    Overridden,
    /// At least one pattern did not match
    NoMatch,
    /// Hidden documents are never auto-selected
    Hidden,
    /// No complete match rule
    NoRule,
}

/// Trace of one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTrace {
    pub id: String,
    pub file_name: String,
    pub hidden: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex_wmclass: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex_title: Option<String>,

    /// `None` when the rule was not evaluated
    pub wmclass_matched: Option<bool>,
    pub title_matched: Option<bool>,

    pub outcome: CandidateOutcome,
}

/// Full explanation of a selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchExplain {
    pub window: ActiveWindow,

    /// Explicit id, if one was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit: Option<String>,

    pub fallback: String,

    /// Documents in match order
    pub candidates: Vec<CandidateTrace>,

    pub selected: Option<String>,
    pub reason: Option<SelectionReason>,

    /// Set when selection failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchExplain {
    pub fn build(documents: &[ConfigDocument], request: &SelectionRequest) -> Self {
        let outcome = select(documents, request);
        let (selected, reason, error) = match &outcome {
            Ok(selection) => (Some(selection.id.clone()), Some(selection.reason), None),
            Err(e) => (None, None, Some(e.to_string())),
        };
        let matched_id = match reason {
            Some(SelectionReason::Matched) => selected.as_deref(),
            _ => None,
        };
        let explicit_id = match reason {
            Some(SelectionReason::Explicit) => selected.as_deref(),
            _ => None,
        };

        let window = &request.window;
        let candidates = in_match_order(documents)
            .into_iter()
            .map(|document| {
                let rule = document.match_rule.as_ref();
                let evaluated = rule.filter(|_| !document.hidden);
                let wmclass_matched = evaluated.map(|r| r.matches_wmclass(&window.wmclass));
                let title_matched = evaluated.map(|r| r.matches_title(&window.title));

                let outcome = if explicit_id == Some(document.id.as_str()) {
                    CandidateOutcome::Selected
                } else if document.hidden {
                    CandidateOutcome::Hidden
                } else if rule.is_none() {
                    CandidateOutcome::NoRule
                } else if wmclass_matched == Some(true) && title_matched == Some(true) {
                    if matched_id == Some(document.id.as_str()) {
                        CandidateOutcome::Selected
                    } else if request.explicit.is_some() {
                        CandidateOutcome::Overridden
                    } else {
                        CandidateOutcome::Shadowed
                    }
                } else {
                    CandidateOutcome::NoMatch
                };

                CandidateTrace {
                    id: document.id.clone(),
                    file_name: document.file_name().to_string(),
                    hidden: document.hidden,
                    regex_wmclass: rule.map(|r| r.regex_wmclass().to_string()),
                    regex_title: rule.map(|r| r.regex_title().to_string()),
                    wmclass_matched,
                    title_matched,
                    outcome,
                }
            })
            .collect();

        Self {
            window: window.clone(),
            explicit: request.explicit.clone(),
            fallback: request.fallback.clone(),
            candidates,
            selected,
            reason,
            error,
        }
    }

    /// Format as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as human-readable text
    pub fn to_human(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Window: class='{}' title='{}'\n",
            self.window.wmclass, self.window.title
        ));
        if let Some(ref explicit) = self.explicit {
            output.push_str(&format!("Explicit: {}\n", explicit));
        }
        output.push_str(&format!("Fallback: {}\n", self.fallback));

        output.push_str("\n--- Candidates (match order) ---\n");
        for candidate in &self.candidates {
            output.push_str(&format!(
                "{:<10} {} ({})",
                Self::format_outcome(candidate.outcome),
                candidate.id,
                candidate.file_name
            ));
            if let (Some(w), Some(t)) = (&candidate.regex_wmclass, &candidate.regex_title) {
                output.push_str(&format!(
                    "  wmclass /{}/ {}  title /{}/ {}",
                    w,
                    Self::format_hit(candidate.wmclass_matched),
                    t,
                    Self::format_hit(candidate.title_matched)
                ));
            }
            output.push('\n');
        }

        output.push('\n');
        match (&self.selected, self.reason, &self.error) {
            (Some(id), Some(reason), _) => {
                output.push_str(&format!("Selected: {} ({})\n", id, reason.as_str()));
            }
            (_, _, Some(error)) => output.push_str(&format!("Error: {}\n", error)),
            _ => output.push_str("Selected: none\n"),
        }

        output
    }

    fn format_outcome(outcome: CandidateOutcome) -> &'static str {
        match outcome {
            CandidateOutcome::Selected => "SELECTED",
            CandidateOutcome::Shadowed => "shadowed",
            CandidateOutcome::Overridden => "overridden",
            CandidateOutcome::NoMatch => "no-match",
            CandidateOutcome::Hidden => "hidden",
            CandidateOutcome::NoRule => "no-rule",
        }
    }

    fn format_hit(hit: Option<bool>) -> &'static str {
        match hit {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        }
    }
}
