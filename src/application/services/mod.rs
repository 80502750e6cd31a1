//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the collaborator traits (SegmentStore, SourceCatalog)
//! but are themselves concrete structs, not traits.

mod lookup;
mod session;

pub use lookup::LookupService;
pub use session::{parse_path, ListService, ListSession, LoadMode};
