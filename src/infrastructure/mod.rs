//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements the collaborator traits and wires up services.

pub mod catalog;
pub mod di;
pub mod error;
pub mod store;
pub mod traits;

pub use catalog::TomlSourceCatalog;
pub use error::{InfraError, InfraResult};
pub use store::FileSegmentStore;
