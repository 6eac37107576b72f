//! Tree vertex: identity, label, parent link, children and UI flags.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key marking that `expanded` was pinned by the source record.
pub const EXPLICIT_EXPANDED_KEY: &str = "_explicit_expanded";

/// Metadata key under which store-backed nodes carry their source entity.
pub const ENTITY_KEY: &str = "entity";

/// Open, string-keyed annotations attached to a node.
pub type Metadata = Map<String, Value>;

/// Node identifier as supplied by the record source.
///
/// Only `Int` and `Str` can be indexed as parents. Any other value a loose
/// record carries (float, bool, array, object) is kept as `Opaque` so the node
/// can still be rendered, but it is never resolvable as a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Str(String),
    Opaque(Value),
}

impl NodeId {
    /// Convert a JSON value into an identifier. `null` yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(NodeId::Str(s.clone())),
            Value::Number(n) => Some(
                n.as_i64()
                    .map(NodeId::Int)
                    .unwrap_or_else(|| NodeId::Opaque(value.clone())),
            ),
            other => Some(NodeId::Opaque(other.clone())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            NodeId::Int(i) => Value::from(*i),
            NodeId::Str(s) => Value::String(s.clone()),
            NodeId::Opaque(v) => v.clone(),
        }
    }

    /// True for integer and string identifiers.
    /// Parse an id typed or submitted as text: integer-looking text becomes
    /// `Int`, anything else `Str`.
    pub fn parse_loose(raw: &str) -> Self {
        raw.parse::<i64>()
            .map(NodeId::Int)
            .unwrap_or_else(|_| NodeId::Str(raw.to_string()))
    }

    pub fn is_indexable(&self) -> bool {
        matches!(self, NodeId::Int(_) | NodeId::Str(_))
    }
}

impl Hash for NodeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            NodeId::Int(i) => i.hash(state),
            NodeId::Str(s) => s.hash(state),
            // Opaque ids are never indexed; equal values only need equal hashes.
            NodeId::Opaque(_) => {}
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(i) => write!(f, "{}", i),
            NodeId::Str(s) => write!(f, "{}", s),
            NodeId::Opaque(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        NodeId::Int(value)
    }
}

impl From<i32> for NodeId {
    fn from(value: i32) -> Self {
        NodeId::Int(i64::from(value))
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId::Str(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId::Str(value)
    }
}

/// A vertex of the forest.
///
/// Identity, label, parent reference and metadata are fixed when the node is
/// created. Children, level and the expansion default are filled in by
/// [`TreeBuilder`](crate::domain::TreeBuilder), which is why their setters are
/// crate-private.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    id: Option<NodeId>,
    label: String,
    parent_id: Option<NodeId>,
    children: Vec<TreeNode>,
    level: usize,
    metadata: Metadata,
    selectable: bool,
    expanded: bool,
}

impl TreeNode {
    pub fn new(id: Option<NodeId>, label: impl Into<String>, parent_id: Option<NodeId>) -> Self {
        Self {
            id,
            label: label.into(),
            parent_id,
            children: Vec::new(),
            level: 0,
            metadata: Metadata::new(),
            selectable: true,
            expanded: false,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Set the initial expansion state without pinning it.
    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    /// Set the expansion state and pin it against the default expansion policy.
    pub fn with_pinned_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self.metadata
            .insert(EXPLICIT_EXPANDED_KEY.to_string(), Value::Bool(true));
        self
    }

    pub fn id(&self) -> Option<&NodeId> {
        self.id.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent_id.as_ref()
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the source record pinned `expanded`.
    pub fn has_explicit_expanded(&self) -> bool {
        matches!(
            self.metadata.get(EXPLICIT_EXPANDED_KEY),
            Some(Value::Bool(true))
        )
    }

    /// Number of nodes below this one (children, grandchildren, ...).
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&TreeNode> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    pub(crate) fn set_children(&mut self, children: Vec<TreeNode>) {
        self.children = children;
    }

    pub(crate) fn take_children(&mut self) -> Vec<TreeNode> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn set_level(&mut self, level: usize) {
        self.level = level;
    }

    pub(crate) fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }
}

impl Drop for TreeNode {
    // Unlink descendants onto a heap stack so deep chains drop without recursion
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}
