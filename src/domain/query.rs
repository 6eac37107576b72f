//! Read-only queries over a built forest.
//!
//! Every query is a pre-order, depth-first walk driven by an explicit stack,
//! so deep trees cannot exhaust the call stack.

use std::collections::HashMap;

use regex::Regex;
use tracing::{instrument, warn};

use crate::domain::node::{NodeId, TreeNode};

/// Pre-order iterator over a forest.
pub struct Preorder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Visit every node of the forest in pre-order.
pub fn walk_preorder(forest: &[TreeNode]) -> Preorder<'_> {
    Preorder {
        stack: forest.iter().rev().collect(),
    }
}

/// First node (pre-order) whose id strictly equals `id`.
pub fn find_node_by_id<'a>(forest: &'a [TreeNode], id: &NodeId) -> Option<&'a TreeNode> {
    walk_preorder(forest).find(|node| node.id() == Some(id))
}

/// Look up each id in turn; misses are skipped, input order is kept.
pub fn find_nodes_by_ids<'a>(forest: &'a [TreeNode], ids: &[NodeId]) -> Vec<&'a TreeNode> {
    ids.iter()
        .filter_map(|id| find_node_by_id(forest, id))
        .collect()
}

/// Case-insensitive token-boundary matcher for labels.
///
/// The query must start the label or follow whitespace, and must be followed
/// by whitespace, an ASCII digit, or the end of the label. A blank query
/// matches nothing.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    regex: Option<Regex>,
}

impl SearchPattern {
    pub fn new(query: &str) -> Self {
        if query.trim().is_empty() {
            return Self { regex: None };
        }
        let pattern = format!(r"(?i)(?:^|\s){}(?:\s|[0-9]|$)", regex::escape(query));
        let regex = Regex::new(&pattern)
            .map_err(|e| warn!("search pattern rejected, matching nothing: {}", e))
            .ok();
        Self { regex }
    }

    pub fn is_match(&self, label: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(label))
    }
}

/// All nodes whose label matches `query`, in pre-order.
///
/// Non-matching parents do not hide matching descendants. A blank query
/// returns nothing, even though the bare boundary pattern would match any
/// label with whitespace before a digit (`"Root 1"`).
#[instrument(level = "debug", skip(forest))]
pub fn search_nodes<'a>(forest: &'a [TreeNode], query: &str) -> Vec<&'a TreeNode> {
    let pattern = SearchPattern::new(query);
    walk_preorder(forest)
        .filter(|node| pattern.is_match(node.label()))
        .collect()
}

/// Flatten the forest into a `label -> id` choice list for selection controls.
///
/// Pre-order. A repeated label keeps its first position and takes the id of
/// its last occurrence.
pub fn flatten_choices(forest: &[TreeNode]) -> Vec<(String, Option<NodeId>)> {
    let mut choices: Vec<(String, Option<NodeId>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for node in walk_preorder(forest) {
        match positions.get(node.label()) {
            Some(&pos) => choices[pos].1 = node.id().cloned(),
            None => {
                positions.insert(node.label(), choices.len());
                choices.push((node.label().to_string(), node.id().cloned()));
            }
        }
    }
    choices
}
