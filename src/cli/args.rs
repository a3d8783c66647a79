//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Word hierarchy editor: build, reorder and re-parent nested word trees
#[derive(Parser, Debug)]
#[command(name = "wordtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short = 'd', long = "debug", action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Session directory: reads <dir>/.wordtree.toml and keeps session.json there
    #[arg(short = 'C', long = "dir", global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Edit words of the live tree
    Word {
        #[command(subcommand)]
        command: WordCommands,
    },

    /// Show the live tree
    Tree {
        /// Deepest level to draw (1 = first level only)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        depth: Option<u32>,
        /// Show short word ids
        #[arg(long)]
        ids: bool,
        /// Print word, level and leaf counts below the tree
        #[arg(long)]
        stats: bool,
    },

    /// Manage saved hierarchies
    Hierarchy {
        #[command(subcommand)]
        command: HierarchyCommands,
    },

    /// Export the live tree as JSON
    Export {
        /// Output file (default from config: data.json); "-" for stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Replace the live tree with an exported JSON document
    Import {
        /// JSON file in export format
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
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

/// Words are addressed by name path (`animal/dog`) or id prefix (`#3fa2`).
#[derive(Subcommand, Debug)]
pub enum WordCommands {
    /// Create a word
    Add {
        /// Word name
        name: String,
        /// Parent word (default: first level)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Remove a word and everything below it
    Remove {
        /// Word to remove
        word: String,
    },

    /// Rename a word
    Rename {
        /// Word to rename
        word: String,
        /// New name
        name: String,
    },

    /// Make a word the last child of another word
    Move {
        /// Word to move
        word: String,
        /// New parent (default: first level)
        #[arg(short, long)]
        into: Option<String>,
    },

    /// Move a word to the first level
    Unlink {
        /// Word to unlink
        word: String,
    },

    /// Shift a word among its siblings
    Order {
        /// Word to shift
        word: String,
        /// Positions to move (negative = towards the front)
        #[arg(allow_hyphen_values = true)]
        offset: isize,
    },

    /// Replay a drag-and-drop gesture
    Drop {
        /// Dragged word
        word: String,
        /// Word it was dropped on (none = dropped outside the tree)
        #[arg(short, long)]
        target: Option<String>,
        /// Horizontal displacement in pixels
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dx: f64,
        /// Vertical pointer delta (negative = moving up)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dy: f64,
    },
}

#[derive(Subcommand, Debug)]
pub enum HierarchyCommands {
    /// Start an empty hierarchy
    New,

    /// Save the live tree into the current hierarchy
    Save,

    /// List saved hierarchies
    List,

    /// Load a saved hierarchy into the live tree
    Open {
        /// Hierarchy id or id prefix
        id: String,
    },

    /// Delete a saved hierarchy
    Remove {
        /// Hierarchy id or id prefix
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
