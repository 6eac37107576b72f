//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use termtree::Tree;

use crate::domain::{walk_preorder, BuildReport, TreeNode};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// One-line description of a node: label, dimmed id, and flags.
pub fn node_line(node: &TreeNode, with_id: bool) -> String {
    let mut line = if node.is_selectable() {
        node.label().to_string()
    } else {
        node.label().dimmed().to_string()
    };
    if with_id {
        let id = node.id().map_or_else(|| "-".to_string(), ToString::to_string);
        line.push_str(&format!(" {}", format!("[{}]", id).dimmed()));
    }
    if node.is_expanded() && !node.is_leaf() {
        line.push_str(&format!(" {}", "(expanded)".green()));
    }
    line
}

/// Convert a built node into a printable tree.
pub fn to_tree(root: &TreeNode, with_id: bool) -> Tree<String> {
    let order: Vec<&TreeNode> = walk_preorder(std::slice::from_ref(root)).collect();
    // Reverse pre-order sees every child before its parent.
    let mut finished: Vec<Tree<String>> = Vec::with_capacity(order.len());
    for node in order.into_iter().rev() {
        let leaves = finished.split_off(finished.len() - node.children().len());
        finished.push(Tree::new(node_line(node, with_id)).with_leaves(leaves.into_iter().rev()));
    }
    finished
        .pop()
        .unwrap_or_else(|| Tree::new(node_line(root, with_id)))
}

/// Warn about records the builder had to drop.
pub fn report_dropped(report: &BuildReport) {
    if !report.shadowed.is_empty() {
        warning(&format!(
            "{} record(s) dropped: replaced by a later record with the same id",
            report.shadowed.len()
        ));
    }
    if !report.orphans.is_empty() {
        warning(&format!(
            "{} record(s) dropped: parent not found",
            report.orphans.len()
        ));
    }
    if !report.detached.is_empty() {
        warning(&format!(
            "{} record(s) dropped: parent chain never reaches a root",
            report.detached.len()
        ));
    }
}
