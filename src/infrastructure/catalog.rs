//! TOML-backed source catalog.
//!
//! ```toml
//! [[sources]]
//! kind = "report"
//! id = "00O5e000001"
//! name = "Lapsed Donors"
//! columns = [{ name = "CONTACT_ID", label = "Contact ID" }]
//!
//! [[sources]]
//! kind = "list"
//! id = "7015e000002"
//! name = "Gala 2024 Attendees"
//! ```

use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::{ColumnCandidate, SourceCandidate};
use crate::infrastructure::traits::{FileSystem, SourceCatalog};

#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    kind: String,
    id: String,
    name: String,
    #[serde(default)]
    columns: Vec<CatalogColumn>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogColumn {
    name: String,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    sources: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct TomlSourceCatalog {
    sources: Vec<CatalogEntry>,
}

impl TomlSourceCatalog {
    /// Read and parse a catalog file.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> io::Result<Self> {
        let content = fs.read_to_string(path)?;
        Self::parse(&content).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("parse catalog {}: {}", path.display(), e),
            )
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let file: CatalogFile = toml::from_str(content)?;
        Ok(Self {
            sources: file.sources,
        })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl SourceCatalog for TomlSourceCatalog {
    #[instrument(level = "debug", skip(self))]
    fn suggest(&self, term: &str, schema: &str, limit: usize) -> io::Result<Vec<SourceCandidate>> {
        let needle = term.to_lowercase();
        let found: Vec<SourceCandidate> = self
            .sources
            .iter()
            .filter(|s| s.kind.eq_ignore_ascii_case(schema))
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .take(limit)
            .map(|s| SourceCandidate {
                source_name: s.name.clone(),
                source_id: s.id.clone(),
            })
            .collect();
        debug!("suggest: {} match(es) for {:?}", found.len(), term);
        Ok(found)
    }

    fn join_columns(&self, source_id: &str) -> io::Result<Vec<ColumnCandidate>> {
        let entry = self
            .sources
            .iter()
            .find(|s| s.id == source_id)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("unknown source: {}", source_id),
                )
            })?;
        Ok(entry
            .columns
            .iter()
            .map(|c| ColumnCandidate {
                name: c.name.clone(),
                label: c.label.clone().unwrap_or_else(|| c.name.clone()),
            })
            .collect())
    }
}
