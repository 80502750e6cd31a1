//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::{ListService, LookupService};
use crate::config::Settings;
use crate::infrastructure::catalog::TomlSourceCatalog;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::store::FileSegmentStore;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, SegmentStore, SourceCatalog};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Persisted lists
    pub store: Arc<dyn SegmentStore>,

    /// Source catalog, absent when none is configured
    pub catalog: Option<Arc<dyn SourceCatalog>>,

    pub list_service: ListService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store: Arc<dyn SegmentStore> = Arc::new(FileSegmentStore::new(
            Arc::clone(&fs),
            settings.store_dir.clone(),
        ));
        let catalog = match &settings.catalog {
            Some(path) => {
                let catalog = TomlSourceCatalog::load(fs.as_ref(), path)
                    .map_err(|e| InfraError::io(format!("load catalog {}", path.display()), e))?;
                debug!("catalog {} with {} source(s)", path.display(), catalog.len());
                Some(Arc::new(catalog) as Arc<dyn SourceCatalog>)
            }
            None => None,
        };
        Ok(Self::with_deps(settings, fs, store, catalog))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        store: Arc<dyn SegmentStore>,
        catalog: Option<Arc<dyn SourceCatalog>>,
    ) -> Self {
        let settings = Arc::new(settings);
        let list_service = ListService::new(Arc::clone(&store));

        Self {
            settings,
            fs,
            store,
            catalog,
            list_service,
        }
    }

    /// Lookup service over the configured catalog, if there is one.
    pub fn lookup_service(&self) -> Option<LookupService> {
        self.catalog
            .as_ref()
            .map(|catalog| LookupService::new(Arc::clone(catalog), self.settings.lookup.clone()))
    }
}
