//! Defines the core abstraction for a navigable, read-only node tree.
use std::hash::Hash;

/// A qualified name, consisting of an optional prefix and a local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
}

/// The type of a node, aligned with the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

/// The contract the evaluator is written against.
///
/// `Ord` must follow document order: the evaluator sorts every node-set it
/// returns with it. `'a` is the lifetime of the tree the node points into.
pub trait DataSourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    fn node_type(&self) -> NodeType;

    /// `None` for root, text and comment nodes. For a processing instruction
    /// this is its target.
    fn name(&self) -> Option<QName<'a>>;

    /// The XPath `string()` value: text content for leaves, concatenated
    /// descendant text for elements and the root.
    fn string_value(&self) -> String;

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// `None` only for the root.
    fn parent(&self) -> Option<Self>;
}
