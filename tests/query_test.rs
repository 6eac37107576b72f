//! Integration tests for lookups, token-boundary search and choice flattening.

use rstest::{fixture, rstest};

use treeselect::domain::{
    find_node_by_id, find_nodes_by_ids, flatten_choices, search_nodes, NodeId, SearchPattern,
    TreeBuilder, TreeNode,
};

fn node(id: i64, label: &str, parent: Option<i64>) -> TreeNode {
    TreeNode::new(Some(NodeId::Int(id)), label, parent.map(NodeId::Int))
}

#[fixture]
fn forest() -> Vec<TreeNode> {
    TreeBuilder::new(Some(1)).build(vec![
        node(1, "Root 1", None),
        node(2, "Root 2", None),
        node(3, "Child 1.1", Some(1)),
        node(4, "Child 1.2", Some(1)),
        node(6, "Grandchild", Some(3)),
    ])
}

fn ids(nodes: &[&TreeNode]) -> Vec<NodeId> {
    nodes.iter().filter_map(|n| n.id().cloned()).collect()
}

// ============================================================
// Lookup
// ============================================================

#[rstest]
fn given_batch_with_missing_id_when_finding_then_skips_and_keeps_order(forest: Vec<TreeNode>) {
    let found = find_nodes_by_ids(&forest, &[NodeId::Int(1), NodeId::Int(999), NodeId::Int(3)]);
    assert_eq!(ids(&found), vec![NodeId::Int(1), NodeId::Int(3)]);
}

#[rstest]
fn given_nested_id_when_finding_then_returns_subtree(forest: Vec<TreeNode>) {
    let child = find_node_by_id(&forest, &NodeId::Int(3)).expect("child present");
    assert_eq!(child.label(), "Child 1.1");
    assert_eq!(child.children()[0].label(), "Grandchild");
}

#[rstest]
fn given_string_form_of_integer_id_when_finding_then_no_match(forest: Vec<TreeNode>) {
    assert!(find_node_by_id(&forest, &NodeId::Str("1".into())).is_none());
}

#[rstest]
fn given_reversed_ids_when_finding_then_output_follows_input(forest: Vec<TreeNode>) {
    let found = find_nodes_by_ids(&forest, &[NodeId::Int(6), NodeId::Int(2), NodeId::Int(1)]);
    assert_eq!(ids(&found), vec![NodeId::Int(6), NodeId::Int(2), NodeId::Int(1)]);
}

// ============================================================
// Search
// ============================================================

#[rstest]
fn given_child_query_when_searching_then_only_child_nodes(forest: Vec<TreeNode>) {
    let found = search_nodes(&forest, "child");
    assert_eq!(ids(&found), vec![NodeId::Int(3), NodeId::Int(4)]);
}

#[rstest]
fn given_non_matching_parent_when_searching_then_descendants_still_found(forest: Vec<TreeNode>) {
    let found = search_nodes(&forest, "GRANDCHILD");
    assert_eq!(ids(&found), vec![NodeId::Int(6)]);
}

#[rstest]
fn given_root_query_when_searching_then_preorder_across_roots(forest: Vec<TreeNode>) {
    let found = search_nodes(&forest, "Root");
    assert_eq!(ids(&found), vec![NodeId::Int(1), NodeId::Int(2)]);
}

#[rstest]
fn given_empty_query_when_searching_labels_with_digits_then_nothing_found(forest: Vec<TreeNode>) {
    // "Root 1" has whitespace followed by a digit
    assert!(search_nodes(&forest, "").is_empty());
}

#[rstest]
#[case::prefix_then_space("Child 1.1", "Child", true)]
#[case::after_whitespace("My Child", "child", true)]
#[case::followed_by_digit("Child1", "Child", true)]
#[case::whole_label("child", "CHILD", true)]
#[case::inside_word("Grandchild", "child", false)]
#[case::followed_by_letter("Children", "Child", false)]
#[case::followed_by_punctuation("Child.1", "Child", false)]
#[case::regex_chars_are_literal("a+b c", "a+b", true)]
#[case::dot_is_literal("axb", "a.b", false)]
#[case::unicode_case_folding("Über Alles", "über", true)]
#[case::blank_query("Child", "   ", false)]
#[case::empty_query("Child", "", false)]
fn given_label_and_query_when_matching_then_token_boundary(
    #[case] label: &str,
    #[case] query: &str,
    #[case] expected: bool,
) {
    assert_eq!(SearchPattern::new(query).is_match(label), expected);
}

// ============================================================
// Choices
// ============================================================

#[rstest]
fn given_forest_when_flattening_then_preorder_labels(forest: Vec<TreeNode>) {
    let labels: Vec<String> = flatten_choices(&forest).into_iter().map(|(label, _)| label).collect();
    assert_eq!(labels, vec!["Root 1", "Child 1.1", "Grandchild", "Child 1.2", "Root 2"]);
}

#[test]
fn given_repeated_label_when_flattening_then_later_id_overwrites() {
    let forest = TreeBuilder::default().build(vec![
        node(1, "Same", None),
        node(2, "Other", None),
        node(3, "Same", None),
    ]);

    let choices = flatten_choices(&forest);

    assert_eq!(
        choices,
        vec![
            ("Same".to_string(), Some(NodeId::Int(3))),
            ("Other".to_string(), Some(NodeId::Int(2))),
        ]
    );
}
