//! treeselect: tree assembly and query engine
//!
//! Turns flat, parent-referenced records (a static list or store entities)
//! into a nested forest with computed levels and default expansion, and
//! answers lookups and token-boundary label searches over it.
//!
//! Layers, innermost first:
//! - [`domain`]: nodes, the builder and read-only queries
//! - [`application`]: record normalization, providers, presentation payloads
//! - [`infrastructure`]: the record store boundary and file sources
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{ArrayTreeDataProvider, EntityTreeDataProvider, QueryOptions, TreeDataProvider};
pub use domain::{NodeId, TreeBuilder, TreeNode};
