//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Tree assembly and query engine: turn flat parent-referenced records into a navigable, searchable forest
#[derive(Parser, Debug)]
#[command(name = "treeselect")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, env = "TREESELECT_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Override the default expansion level (0 disables default expansion)
    #[arg(long, global = true)]
    pub expanded_level: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the forest as a tree
    Tree {
        #[command(flatten)]
        source: SourceArgs,
        /// Show ids next to labels
        #[arg(long)]
        ids: bool,
    },

    /// Emit the presentation payload (tree data, choices, settings) as JSON
    Json {
        #[command(flatten)]
        source: SourceArgs,
        /// Compact single-line output
        #[arg(long)]
        compact: bool,
    },

    /// List nodes whose label matches a token-boundary query
    Search {
        #[command(flatten)]
        source: SourceArgs,
        /// Search text (case-insensitive)
        query: String,
    },

    /// Look up nodes by id (integers are matched as integers)
    Find {
        #[command(flatten)]
        source: SourceArgs,
        /// Ids to look up, in output order
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// List records without a parent
    Roots {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List records whose parent is the given id
    Children {
        #[command(flatten)]
        source: SourceArgs,
        /// Parent id
        parent_id: String,
    },

    /// Print the flattened label -> id choice list
    Choices {
        #[command(flatten)]
        source: SourceArgs,
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

/// Where the records come from and how to query them.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// JSON file: an array of records, or a table document with --entity
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Entity table to read from a table document (store-backed tree)
    #[arg(short, long)]
    pub entity: Option<String>,

    /// Relation field pointing at the parent entity (overrides config)
    #[arg(long, requires = "entity")]
    pub parent_field: Option<String>,

    /// Filter condition `field=value` (value parsed as JSON, else string)
    #[arg(short = 'w', long = "where", value_name = "FIELD=VALUE", requires = "entity")]
    pub filters: Vec<String>,

    /// Sort key `field[:asc|desc]`
    #[arg(short, long, value_name = "FIELD[:DIR]", requires = "entity")]
    pub order_by: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}
