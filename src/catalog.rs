//! Cheatsheet catalog
//!
//! Runs the whole chain once: load, merge, resolve includes, assemble. Every
//! recovered error along the way lands in one [`Diagnostics`] collection.
//! Selection, listing and explain all read from the finished catalog, so
//! re-sorting or re-filtering never re-reads a file.

use indexmap::IndexMap;

use crate::assemble::ResolvedCheatsheet;
use crate::document::ConfigDocument;
use crate::error::{Diagnostics, SheetError};
use crate::include::resolve_includes;
use crate::loader::{LoadOutcome, Loader};
use crate::matcher::explain::MatchExplain;
use crate::matcher::{self, in_match_order, Selection, SelectionRequest};
use crate::merge::merge_documents;

/// Fully resolved cheatsheets plus the diagnostics produced building them
#[derive(Debug, Clone)]
pub struct Catalog {
    loader: Loader,

    /// Resolved documents in match order
    documents: Vec<ConfigDocument>,

    /// Assembled views keyed by id, match order
    cheatsheets: IndexMap<String, ResolvedCheatsheet>,

    diagnostics: Diagnostics,
}

impl Catalog {
    /// Load both roots and build the catalog
    pub fn load(loader: Loader) -> Self {
        let outcome = loader.load();
        let (documents, diagnostics) = build(outcome);
        let cheatsheets = assemble_all(&documents);

        tracing::debug!(
            cheatsheets = cheatsheets.len(),
            diagnostics = diagnostics.len(),
            "catalog ready"
        );

        Self {
            loader,
            documents,
            cheatsheets,
            diagnostics,
        }
    }

    /// Rebuild from disk, replacing everything
    pub fn reload(&mut self) {
        *self = Self::load(self.loader.clone());
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Resolved documents in match order
    pub fn documents(&self) -> &[ConfigDocument] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&ResolvedCheatsheet> {
        self.cheatsheets.get(id)
    }

    pub fn document(&self, id: &str) -> Option<&ConfigDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.cheatsheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cheatsheets.is_empty()
    }

    pub fn cheatsheets(&self) -> impl Iterator<Item = &ResolvedCheatsheet> {
        self.cheatsheets.values()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Pick the cheatsheet to show first
    pub fn select(&self, request: &SelectionRequest) -> Result<Selection, SheetError> {
        let selection = matcher::select(&self.documents, request)?;
        tracing::debug!(id = %selection.id, reason = selection.reason.as_str(), "selected cheatsheet");
        Ok(selection)
    }

    /// Cheatsheets for a selector, ascending by id. Hidden ones only with
    /// `include_hidden`.
    pub fn listed(&self, include_hidden: bool) -> Vec<&ResolvedCheatsheet> {
        let mut listed: Vec<&ResolvedCheatsheet> = self
            .cheatsheets
            .values()
            .filter(|sheet| include_hidden || !sheet.hidden)
            .collect();
        listed.sort_by(|a, b| a.id.cmp(&b.id));
        listed
    }

    pub fn explain(&self, request: &SelectionRequest) -> MatchExplain {
        MatchExplain::build(&self.documents, request)
    }
}

/// Merge and resolve loaded documents. Returns documents in match order and
/// every recovered error in stage order.
pub fn build(outcome: LoadOutcome) -> (Vec<ConfigDocument>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    diagnostics.extend(outcome.errors);

    let merged = merge_documents(outcome.documents);
    diagnostics.extend(merged.errors);

    let resolved = resolve_includes(merged.documents);
    diagnostics.extend(resolved.errors);

    let documents = in_match_order(&resolved.documents)
        .into_iter()
        .cloned()
        .collect();

    (documents, diagnostics)
}

fn assemble_all(documents: &[ConfigDocument]) -> IndexMap<String, ResolvedCheatsheet> {
    documents
        .iter()
        .map(|document| (document.id.clone(), ResolvedCheatsheet::from_document(document)))
        .collect()
}
