//! Domain layer: tree model, assembly and queries
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod error;
pub mod node;
pub mod query;

pub use builder::{BuildOutcome, BuildReport, TreeBuilder};
pub use error::{DomainError, DomainResult};
pub use node::{Metadata, NodeId, TreeNode, ENTITY_KEY, EXPLICIT_EXPANDED_KEY};
pub use query::{
    find_node_by_id, find_nodes_by_ids, flatten_choices, search_nodes, walk_preorder,
    SearchPattern,
};
