//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on the collaborator traits.

pub mod codec;
pub mod error;
pub mod error_ext;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use services::{parse_path, ListService, ListSession, LoadMode, LookupService};
