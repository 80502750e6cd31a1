//! Domain layer: segment-tree model and editing engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod delete;
pub mod display;
pub mod error;
pub mod invariants;
pub mod leaf;
pub mod mutation;
pub mod node;
pub mod normalize;

pub use arena::{SegmentTree, TreeNode};
pub use builder::{create_empty, split_degraded, split_loaded, RootPointers};
pub use delete::delete_node;
pub use display::TreeDisplay;
pub use error::{DomainError, DomainResult};
pub use invariants::{format_path, validate, Violation};
pub use leaf::{clear_source, set_source};
pub use normalize::{add_group, add_source, Sibling};
pub use node::*;
