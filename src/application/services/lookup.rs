//! Leaf-reference lookup service
//!
//! Thin layer over a [`SourceCatalog`]: applies the configured term length
//! and result limit, and only asks for join columns of report sources.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::LookupConfig;
use crate::domain::{ColumnCandidate, SourceCandidate, SourceRef};
use crate::infrastructure::traits::SourceCatalog;

pub struct LookupService {
    catalog: Arc<dyn SourceCatalog>,
    config: LookupConfig,
}

impl LookupService {
    pub fn new(catalog: Arc<dyn SourceCatalog>, config: LookupConfig) -> Self {
        Self { catalog, config }
    }

    /// Candidate sources of kind `schema` matching `term`.
    ///
    /// Terms shorter than `min_term_len` (after trimming) return nothing
    /// without querying the catalog.
    #[instrument(level = "debug", skip(self))]
    pub fn suggest(&self, term: &str, schema: &str) -> ApplicationResult<Vec<SourceCandidate>> {
        let term = term.trim();
        if term.chars().count() < self.config.min_term_len {
            debug!("term {:?} below minimum length {}", term, self.config.min_term_len);
            return Ok(Vec::new());
        }
        let mut found = self
            .catalog
            .suggest(term, schema, self.config.limit)
            .with_transport_context("suggest sources for", term)?;
        found.truncate(self.config.limit);
        Ok(found)
    }

    /// Join columns of `source`; empty for sources that are not reports.
    #[instrument(level = "debug", skip(self), fields(source = %source))]
    pub fn join_columns(&self, source: &SourceRef) -> ApplicationResult<Vec<ColumnCandidate>> {
        if !source.is_report() {
            return Ok(Vec::new());
        }
        self.catalog
            .join_columns(&source.source_id)
            .with_transport_context("list join columns of", &source.source_id)
    }

    /// Turn a picked candidate into a leaf reference of kind `kind`.
    pub fn choose(&self, candidate: &SourceCandidate, kind: &str) -> SourceRef {
        SourceRef::new(kind, &candidate.source_id, &candidate.source_name)
    }
}
