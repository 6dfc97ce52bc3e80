//! Tree rendering: Graphviz DOT and indented text.

use std::fmt::Write;

use crate::{Behavior, NodeKind};

fn shape(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Sequence    => "box",
        NodeKind::Parallel    => "parallelogram",
        NodeKind::Conditional => "diamond",
        NodeKind::Decorator   => "ellipse",
        NodeKind::Action      => "note",
    }
}

fn glyph(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Sequence    => "[-]",
        NodeKind::Parallel    => "/_/",
        NodeKind::Conditional => "<?>",
        NodeKind::Decorator   => "-^-",
        NodeKind::Action      => "-->",
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Graphviz source for the tree rooted at `root`.  Node ids are assigned in
/// depth-first order.
pub fn to_dot(root: &dyn Behavior) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph \"{}\" {{", escape(root.name()));
    let _ = writeln!(out, "    graph [fontname=\"times-roman\", ordering=out];");
    let _ = writeln!(out, "    node [fontname=\"times-roman\"];");
    let mut next_id = 0usize;
    dot_node(root, &mut next_id, &mut out);
    out.push_str("}\n");
    out
}

fn dot_node(node: &dyn Behavior, next_id: &mut usize, out: &mut String) -> usize {
    let id = *next_id;
    *next_id += 1;
    let _ = writeln!(
        out,
        "    n{id} [label=\"{}\", shape={}];",
        escape(node.name()),
        shape(node.kind())
    );
    for child in node.children() {
        let child_id = dot_node(child, next_id, out);
        let _ = writeln!(out, "    n{id} -> n{child_id};");
    }
    id
}

/// Indented one-node-per-line listing.
///
/// ```text
/// [-] Scenario
///     --> Init
///     /_/ Main
///         <?> Horn ActorId(3)
/// ```
pub fn to_text(root: &dyn Behavior) -> String {
    let mut out = String::new();
    text_node(root, 0, &mut out);
    out
}

fn text_node(node: &dyn Behavior, depth: usize, out: &mut String) {
    let _ = writeln!(out, "{:indent$}{} {}", "", glyph(node.kind()), node.name(), indent = depth * 4);
    for child in node.children() {
        text_node(child, depth + 1, out);
    }
}

/// Number of nodes in the tree.
pub fn count_nodes(root: &dyn Behavior) -> usize {
    1 + root.children().into_iter().map(count_nodes).sum::<usize>()
}
