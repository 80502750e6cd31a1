//! Segment list editor: AND/OR criteria trees over data sources, split into
//! an included and an excluded branch.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
