//! Tree builder: turns a flat, parent-referenced node list into a forest.

use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, warn};

use crate::domain::node::{NodeId, TreeNode};

/// Arena slot: the node plus the arena indices of its attached children.
#[derive(Debug)]
struct Slot {
    node: TreeNode,
    children: Vec<Index>,
}

/// Accounting of where every input node ended up.
///
/// `reachable + shadowed.len() + orphans.len() + detached.len() == total` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Number of input nodes
    pub total: usize,
    /// Number of top-level nodes in the forest
    pub roots: usize,
    /// Number of nodes in the forest, roots included
    pub reachable: usize,
    /// Ids of nodes dropped because a later node with the same id replaced them
    pub shadowed: Vec<Option<NodeId>>,
    /// Ids of nodes dropped because their parent could not be resolved
    pub orphans: Vec<Option<NodeId>>,
    /// Ids of nodes dropped because their parent chain never reaches a root
    pub detached: Vec<Option<NodeId>>,
}

impl BuildReport {
    pub fn dropped(&self) -> usize {
        self.shadowed.len() + self.orphans.len() + self.detached.len()
    }
}

/// Forest plus its build report.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub roots: Vec<TreeNode>,
    pub report: BuildReport,
}

/// Assembles forests and applies the default expansion policy.
///
/// Stateless apart from the expansion level, so one builder can be reused for
/// any number of builds and always yields the same forest for the same input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    expanded_level: Option<usize>,
}

impl TreeBuilder {
    /// `expanded_level`: nodes with `level < expanded_level` default to expanded.
    pub fn new(expanded_level: Option<usize>) -> Self {
        Self { expanded_level }
    }

    pub fn expanded_level(&self) -> Option<usize> {
        self.expanded_level
    }

    /// Build the forest and return its roots.
    pub fn build(&self, nodes: Vec<TreeNode>) -> Vec<TreeNode> {
        self.build_with_report(nodes).roots
    }

    /// Build the forest and report which nodes were dropped.
    ///
    /// 1. index every node with an integer or string id; a later node with the
    ///    same id replaces the earlier one, which is dropped
    /// 2. attach nodes to their parents in input order; nodes without a parent
    ///    id become roots, nodes whose parent cannot be resolved are dropped
    /// 3. walk from the roots assigning levels and default expansion
    /// 4. materialize the nested forest bottom-up
    ///
    /// Nodes caught in a parent cycle are never reached from a root and are
    /// dropped together with their descendants. All walks use explicit stacks.
    #[instrument(level = "debug", skip(self, nodes), fields(count = nodes.len()))]
    pub fn build_with_report(&self, nodes: Vec<TreeNode>) -> BuildOutcome {
        let total = nodes.len();
        let mut arena: Arena<Slot> = Arena::with_capacity(total);
        let order: Vec<Index> = nodes
            .into_iter()
            .map(|mut node| {
                // The flat list is the only source of structure
                if !node.take_children().is_empty() {
                    debug!("discarding pre-attached children of {:?}", node.id());
                }
                arena.insert(Slot {
                    node,
                    children: Vec::new(),
                })
            })
            .collect();

        let index = index_by_valid_id(&arena, &order);

        // Attach pass
        let mut roots = Vec::new();
        let mut dropped_slots = HashSet::new();
        let mut shadowed = Vec::new();
        let mut orphans = Vec::new();
        for &idx in &order {
            if let Some(id) = arena[idx].node.id().filter(|id| id.is_indexable()) {
                if index.get(id) != Some(&idx) {
                    debug!("dropping {:?}: replaced by a later node with the same id", id);
                    shadowed.push(Some(id.clone()));
                    dropped_slots.insert(idx);
                    continue;
                }
            }
            let parent = match arena[idx].node.parent_id() {
                None => {
                    roots.push(idx);
                    continue;
                }
                Some(parent_id) if parent_id.is_indexable() => index.get(parent_id).copied(),
                Some(_) => None,
            };

            match parent {
                Some(parent_idx) => arena[parent_idx].children.push(idx),
                None => {
                    let node = &arena[idx].node;
                    warn!(
                        "dropping orphan {:?}: parent {:?} not found",
                        node.id(),
                        node.parent_id()
                    );
                    orphans.push(node.id().cloned());
                    dropped_slots.insert(idx);
                }
            }
        }

        // Level and expansion pass, pre-order
        let mut preorder = Vec::with_capacity(total);
        let mut visited: HashSet<Index> = HashSet::with_capacity(total);
        let mut stack: Vec<(Index, usize)> = roots.iter().rev().map(|&idx| (idx, 0)).collect();
        while let Some((idx, level)) = stack.pop() {
            if !visited.insert(idx) {
                continue;
            }
            let slot = &mut arena[idx];
            slot.node.set_level(level);
            if self.expands(level) && !slot.node.has_explicit_expanded() {
                slot.node.set_expanded(true);
            }
            for &child in slot.children.iter().rev() {
                stack.push((child, level + 1));
            }
            preorder.push(idx);
        }

        let detached: Vec<Option<NodeId>> = order
            .iter()
            .filter(|idx| !visited.contains(*idx) && !dropped_slots.contains(*idx))
            .map(|&idx| arena[idx].node.id().cloned())
            .collect();
        if !detached.is_empty() {
            warn!(
                "dropping {} node(s) whose parent chain forms a cycle: {:?}",
                detached.len(),
                detached
            );
        }

        // Materialize bottom-up: reverse pre-order sees children before parents
        let mut built: HashMap<Index, TreeNode> = HashMap::with_capacity(preorder.len());
        for &idx in preorder.iter().rev() {
            let Some(slot) = arena.remove(idx) else {
                continue;
            };
            let mut node = slot.node;
            let children = slot
                .children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            node.set_children(children);
            built.insert(idx, node);
        }
        let forest: Vec<TreeNode> = roots.iter().filter_map(|idx| built.remove(idx)).collect();

        let report = BuildReport {
            total,
            roots: forest.len(),
            reachable: preorder.len(),
            shadowed,
            orphans,
            detached,
        };
        debug!(
            "built forest: roots={} reachable={} dropped={}",
            report.roots,
            report.reachable,
            report.dropped()
        );

        BuildOutcome {
            roots: forest,
            report,
        }
    }

    fn expands(&self, level: usize) -> bool {
        self.expanded_level.is_some_and(|limit| level < limit)
    }
}

fn index_by_valid_id(arena: &Arena<Slot>, order: &[Index]) -> HashMap<NodeId, Index> {
    let mut index = HashMap::with_capacity(order.len());
    for &idx in order {
        if let Some(id) = arena[idx].node.id().filter(|id| id.is_indexable()) {
            index.insert(id.clone(), idx);
        }
    }
    index
}
