//! JSON report handed to a presentation layer
//!
//! One self-contained snapshot: which cheatsheet to open and why, the view
//! of it in the requested order, every cheatsheet for the selector, and the
//! diagnostics gathered while loading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assemble::{ResolvedCheatsheet, Section, SortMode};
use crate::catalog::Catalog;
use crate::error::{ErrorKind, SheetError};
use crate::matcher::{ActiveWindow, Selection};

/// Schema version for the report
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "keyhint/report@1";

/// One recovered error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&SheetError> for DiagnosticEntry {
    fn from(error: &SheetError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,

    pub window: ActiveWindow,
    pub selected: Selection,

    pub sort_by: SortMode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Sections of the selected cheatsheet, sorted and filtered
    pub view: Vec<Section>,

    /// Every cheatsheet in selector order, hidden ones included
    pub cheatsheets: Vec<ResolvedCheatsheet>,

    pub diagnostics: Vec<DiagnosticEntry>,
}

impl Report {
    pub fn new(
        catalog: &Catalog,
        window: ActiveWindow,
        selected: Selection,
        sort_by: SortMode,
        filter: Option<String>,
    ) -> Self {
        let view = catalog
            .get(&selected.id)
            .map(|sheet| sheet.view(sort_by, filter.as_deref().unwrap_or_default()))
            .unwrap_or_default();

        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            window,
            selected,
            sort_by,
            filter,
            view,
            cheatsheets: catalog.listed(true).into_iter().cloned().collect(),
            diagnostics: catalog.diagnostics().iter().map(DiagnosticEntry::from).collect(),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
