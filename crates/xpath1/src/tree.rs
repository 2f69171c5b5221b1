//! An owned, arena-backed node tree.
//!
//! Parsers that borrow their input (such as `roxmltree`) cannot be stored next
//! to the bytes they borrow from. Copying the parse into a [`Tree`] gives a
//! self-contained value that can be cached and shared across threads while
//! still implementing [`DataSourceNode`].

use crate::datasource::{DataSourceNode, NodeType, QName};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
struct NodeData {
    node_type: NodeType,
    prefix: Option<String>,
    local: Option<String>,
    value: String,
    parent: Option<usize>,
    children: Vec<usize>,
    attributes: Vec<usize>,
}

impl NodeData {
    fn new(node_type: NodeType, parent: Option<usize>) -> Self {
        Self {
            node_type,
            prefix: None,
            local: None,
            value: String::new(),
            parent,
            children: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

/// An immutable node tree. Node ids are assigned in document order.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub fn root(&self) -> TreeNode<'_> {
        TreeNode { tree: self, id: 0 }
    }
}

/// Builds a [`Tree`] from a stream of start/end events.
///
/// Attributes must be added right after their `start_element`, before any
/// children, to keep ids in document order.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    open: Vec<usize>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeType::Root, None)],
            open: vec![0],
        }
    }

    fn current(&self) -> usize {
        self.open.last().copied().unwrap_or(0)
    }

    fn push(&mut self, mut data: NodeData) -> usize {
        let parent = self.current();
        data.parent = Some(parent);
        let id = self.nodes.len();
        if data.node_type == NodeType::Attribute {
            self.nodes[parent].attributes.push(id);
        } else {
            self.nodes[parent].children.push(id);
        }
        self.nodes.push(data);
        id
    }

    pub fn start_element(&mut self, prefix: Option<&str>, local: &str) -> &mut Self {
        let mut data = NodeData::new(NodeType::Element, None);
        data.prefix = prefix.map(str::to_string);
        data.local = Some(local.to_string());
        let id = self.push(data);
        self.open.push(id);
        self
    }

    pub fn attribute(&mut self, prefix: Option<&str>, local: &str, value: &str) -> &mut Self {
        let mut data = NodeData::new(NodeType::Attribute, None);
        data.prefix = prefix.map(str::to_string);
        data.local = Some(local.to_string());
        data.value = value.to_string();
        self.push(data);
        self
    }

    /// Adjacent text is merged into a single text node.
    pub fn text(&mut self, text: &str) -> &mut Self {
        let parent = self.current();
        if let Some(&last) = self.nodes[parent].children.last()
            && self.nodes[last].node_type == NodeType::Text
        {
            self.nodes[last].value.push_str(text);
            return self;
        }
        let mut data = NodeData::new(NodeType::Text, None);
        data.value = text.to_string();
        self.push(data);
        self
    }

    pub fn comment(&mut self, text: &str) -> &mut Self {
        let mut data = NodeData::new(NodeType::Comment, None);
        data.value = text.to_string();
        self.push(data);
        self
    }

    pub fn processing_instruction(&mut self, target: &str, value: &str) -> &mut Self {
        let mut data = NodeData::new(NodeType::ProcessingInstruction, None);
        data.local = Some(target.to_string());
        data.value = value.to_string();
        self.push(data);
        self
    }

    pub fn end_element(&mut self) -> &mut Self {
        if self.open.len() > 1 {
            self.open.pop();
        }
        self
    }

    pub fn finish(self) -> Tree {
        Tree { nodes: self.nodes }
    }
}

/// A node handle: a tree reference plus an arena index.
#[derive(Debug, Clone, Copy)]
pub struct TreeNode<'a> {
    tree: &'a Tree,
    id: usize,
}

impl<'a> TreeNode<'a> {
    pub fn id(&self) -> usize {
        self.id
    }

    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id]
    }

    fn collect_text(&self, out: &mut String) {
        for &child in &self.data().children {
            let node = TreeNode {
                tree: self.tree,
                id: child,
            };
            match node.data().node_type {
                NodeType::Text => out.push_str(&node.data().value),
                NodeType::Element => node.collect_text(out),
                _ => {}
            }
        }
    }
}

impl PartialEq for TreeNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for TreeNode<'_> {}

impl PartialOrd for TreeNode<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeNode<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TreeNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<'a> DataSourceNode<'a> for TreeNode<'a> {
    fn node_type(&self) -> NodeType {
        self.data().node_type
    }

    fn name(&self) -> Option<QName<'a>> {
        let data = self.data();
        data.local.as_deref().map(|local_part| QName {
            prefix: data.prefix.as_deref(),
            local_part,
        })
    }

    fn string_value(&self) -> String {
        match self.data().node_type {
            NodeType::Root | NodeType::Element => {
                let mut out = String::new();
                self.collect_text(&mut out);
                out
            }
            _ => self.data().value.clone(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        let tree = self.tree;
        Box::new(
            self.data()
                .attributes
                .iter()
                .map(move |&id| TreeNode { tree, id }),
        )
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        let tree = self.tree;
        Box::new(
            self.data()
                .children
                .iter()
                .map(move |&id| TreeNode { tree, id }),
        )
    }

    fn parent(&self) -> Option<Self> {
        self.data().parent.map(|id| TreeNode {
            tree: self.tree,
            id,
        })
    }
}

/// Fixture shared by the unit tests of this crate:
///
/// ```text
/// <root>
///   <para id="p1" xml:lang="en">Hello</para>
///   <!-- note -->
///   <div/>
///   <?target data?>
///   <para>World</para>
/// </root>
/// ```
#[cfg(test)]
pub(crate) fn sample_tree() -> Tree {
    let mut builder = TreeBuilder::new();
    builder
        .start_element(None, "root")
        .start_element(None, "para")
        .attribute(None, "id", "p1")
        .attribute(Some("xml"), "lang", "en")
        .text("Hello")
        .end_element()
        .comment(" note ")
        .start_element(None, "div")
        .end_element()
        .processing_instruction("target", "data")
        .start_element(None, "para")
        .text("World")
        .end_element()
        .end_element();
    builder.finish()
}
