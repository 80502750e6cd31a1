//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Edit segment lists: AND/OR criteria trees over data sources with an exclusion branch
#[derive(Parser, Debug)]
#[command(name = "seglist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Directory holding a local .seglist.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// Open lists without an exclusion subtree as a single editable tree
    #[arg(long, global = true)]
    pub legacy: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty list for an owner
    New {
        /// Owner record identifier
        owner: String,
        /// Overwrite an existing list
        #[arg(short, long)]
        force: bool,
    },

    /// Show the tree of a list
    Show {
        owner: String,
        /// Print the wire JSON instead of the tree
        #[arg(long)]
        json: bool,
    },

    /// Add a sibling group next to the node at PATH
    AddGroup {
        owner: String,
        /// Dot-separated child indices from the persisted root (e.g. 0.1)
        path: String,
    },

    /// Add a sibling source leaf next to the node at PATH
    AddSource { owner: String, path: String },

    /// Point the leaf at PATH to a source
    SetSource {
        owner: String,
        path: String,
        /// Source kind, e.g. report or list
        #[arg(long)]
        kind: String,
        /// Source identifier
        #[arg(long)]
        id: String,
        /// Source display name
        #[arg(long)]
        name: String,
        /// Join column (report sources only)
        #[arg(long)]
        column: Option<String>,
    },

    /// Remove the source reference of the leaf at PATH
    ClearSource { owner: String, path: String },

    /// Delete the node at PATH
    Delete { owner: String, path: String },

    /// Check a serialized tree file
    Validate {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Search the source catalog
    Suggest {
        /// Search term
        term: String,
        /// Source kind to search
        #[arg(long, default_value = "report")]
        schema: String,
    },

    /// List join columns of a report source
    Columns {
        /// Source identifier
        source_id: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
}
