//! Serializable presentation payload for UI collaborators

use serde::{Serialize, Serializer};

use crate::application::options::QueryOptions;
use crate::application::provider::TreeDataProvider;
use crate::application::ApplicationResult;
use crate::domain::{query, Metadata, NodeId, TreeNode};

/// Nested, serializable mirror of a built node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: Option<NodeId>,
    pub label: String,
    pub parent_id: Option<NodeId>,
    pub level: usize,
    pub metadata: Metadata,
    pub selectable: bool,
    pub expanded: bool,
    pub is_leaf: bool,
    pub children: Vec<NodeView>,
}

impl NodeView {
    /// Mirror a subtree without recursing: views are assembled bottom-up from
    /// a pre-order listing.
    pub fn from_node(root: &TreeNode) -> Self {
        let order: Vec<&TreeNode> = query::walk_preorder(std::slice::from_ref(root)).collect();
        // Reverse pre-order sees every child before its parent.
        let mut finished: Vec<NodeView> = Vec::with_capacity(order.len());
        for node in order.into_iter().rev() {
            let children = finished.split_off(finished.len() - node.children().len());
            finished.push(Self::shallow(node, children.into_iter().rev().collect()));
        }
        finished.pop().unwrap_or_else(|| Self::shallow(root, Vec::new()))
    }

    fn shallow(node: &TreeNode, children: Vec<NodeView>) -> Self {
        Self {
            id: node.id().cloned(),
            label: node.label().to_string(),
            parent_id: node.parent_id().cloned(),
            level: node.level(),
            metadata: node.metadata().clone(),
            selectable: node.is_selectable(),
            expanded: node.is_expanded(),
            is_leaf: node.is_leaf(),
            children,
        }
    }
}

/// One entry of the flattened `label -> id` choice list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub label: String,
    pub id: Option<NodeId>,
}

/// Everything a tree-select control needs in one payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeView {
    pub tree_data: Vec<NodeView>,
    /// Serialized as a JSON object keyed by label, in pre-order
    #[serde(serialize_with = "choices_as_map")]
    pub choices: Vec<Choice>,
    pub max_depth: Option<usize>,
    pub expanded_level: Option<usize>,
    pub sortable: bool,
}

impl TreeView {
    pub fn from_provider(provider: &dyn TreeDataProvider, options: &QueryOptions) -> ApplicationResult<Self> {
        let forest = provider.get_tree_data(options)?;
        let settings = provider.settings();
        Ok(Self {
            max_depth: settings.max_depth,
            expanded_level: settings.expanded_level,
            sortable: settings.sortable,
            ..Self::from_forest(&forest)
        })
    }

    /// View of an already built forest with default presentation settings.
    pub fn from_forest(forest: &[TreeNode]) -> Self {
        let settings = crate::config::TreeSettings::default();
        Self {
            tree_data: forest.iter().map(NodeView::from_node).collect(),
            choices: query::flatten_choices(forest)
                .into_iter()
                .map(|(label, id)| Choice { label, id })
                .collect(),
            max_depth: settings.max_depth,
            expanded_level: settings.expanded_level,
            sortable: settings.sortable,
        }
    }
}

fn choices_as_map<S: Serializer>(choices: &[Choice], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(choices.iter().map(|c| (&c.label, &c.id)))
}
