//! Collects the nodes reachable from one context node along an axis.
//!
//! Every collector yields nodes in *axis order*: document order for forward
//! axes, nearest-first for reverse axes. Predicate positions are counted in
//! this order.

use crate::ast::Axis;
use crate::datasource::{DataSourceNode, NodeType};

pub fn collect<'a, N: DataSourceNode<'a>>(axis: Axis, node: N) -> Vec<N> {
    let mut out = Vec::new();
    match axis {
        Axis::SelfAxis => out.push(node),
        Axis::Child => out.extend(node.children()),
        Axis::Attribute => {
            if node.node_type() == NodeType::Element {
                out.extend(node.attributes());
            }
        }
        Axis::Parent => out.extend(node.parent()),
        Axis::Ancestor => push_ancestors(node, &mut out),
        Axis::AncestorOrSelf => {
            out.push(node);
            push_ancestors(node, &mut out);
        }
        Axis::Descendant => push_descendants(node, &mut out),
        Axis::DescendantOrSelf => {
            out.push(node);
            push_descendants(node, &mut out);
        }
        Axis::FollowingSibling => {
            if let Some(parent) = sibling_parent(node) {
                out.extend(parent.children().skip_while(|s| *s != node).skip(1));
            }
        }
        Axis::PrecedingSibling => {
            if let Some(parent) = sibling_parent(node) {
                out.extend(parent.children().take_while(|s| *s != node));
                out.reverse();
            }
        }
        Axis::Following => push_following(node, &mut out),
        Axis::Preceding => push_preceding(node, &mut out),
    }
    out
}

/// Attributes have a parent but are not among its children, so they have no siblings.
fn sibling_parent<'a, N: DataSourceNode<'a>>(node: N) -> Option<N> {
    if node.node_type() == NodeType::Attribute {
        None
    } else {
        node.parent()
    }
}

fn push_ancestors<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    let mut current = node.parent();
    while let Some(p) = current {
        out.push(p);
        current = p.parent();
    }
}

/// Pre-order walk, which is document order.
fn push_descendants<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    let mut stack: Vec<N> = node.children().collect();
    stack.reverse();
    while let Some(current) = stack.pop() {
        out.push(current);
        let mut children: Vec<N> = current.children().collect();
        children.reverse();
        stack.extend(children);
    }
}

fn push_following<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    // The following axis of an attribute starts after its owner element's content.
    let start = if node.node_type() == NodeType::Attribute {
        match node.parent() {
            Some(owner) => {
                push_descendants(owner, out);
                owner
            }
            None => return,
        }
    } else {
        node
    };
    let mut current = start;
    while let Some(parent) = current.parent() {
        for sibling in parent.children().skip_while(|s| *s != current).skip(1) {
            out.push(sibling);
            push_descendants(sibling, out);
        }
        current = parent;
    }
}

fn push_preceding<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    let start = if node.node_type() == NodeType::Attribute {
        match node.parent() {
            Some(owner) => owner,
            None => return,
        }
    } else {
        node
    };
    let mut in_order = Vec::new();
    let mut current = start;
    while let Some(parent) = current.parent() {
        let mut level = Vec::new();
        for sibling in parent.children().take_while(|s| *s != current) {
            level.push(sibling);
            push_descendants(sibling, &mut level);
        }
        // Earlier levels sit deeper in the tree and later in document order.
        level.append(&mut in_order);
        in_order = level;
        current = parent;
    }
    in_order.reverse();
    out.extend(in_order);
}
