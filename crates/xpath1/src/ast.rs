//! Defines the Abstract Syntax Tree (AST) for XPath 1.0 expressions.

/// The top-level expression that can be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(f64),
    Path(LocationPath),
    /// A primary expression narrowed by predicates and optionally continued by
    /// relative steps, e.g. `(//item)[2]/name`.
    Filter {
        primary: Box<Expression>,
        predicates: Vec<Expression>,
        steps: Vec<Step>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Negate(Box<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Union,
}

/// A location path such as `/order/item[1]` or `descendant::name`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// True when the path starts at the document root.
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expression>,
}

impl Step {
    pub fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }

    /// The step that `//` abbreviates: `descendant-or-self::node()`.
    pub fn descendant_or_self() -> Self {
        Self::new(Axis::DescendantOrSelf, NodeTest::Kind(KindTest::Node))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Ancestor,
    AncestorOrSelf,
    Attribute,
    Child,
    Descendant,
    DescendantOrSelf,
    Following,
    FollowingSibling,
    Parent,
    Preceding,
    PrecedingSibling,
    SelfAxis,
}

impl Axis {
    /// Reverse axes number their nodes in reverse document order for predicates.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Ancestor | Axis::AncestorOrSelf | Axis::Preceding | Axis::PrecedingSibling
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `name` or `prefix:name`.
    Name {
        prefix: Option<String>,
        local: String,
    },
    /// `*`
    Any,
    /// `prefix:*`
    AnyInPrefix(String),
    /// `text()`, `node()`, `comment()`, `processing-instruction('target')`.
    Kind(KindTest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindTest {
    Text,
    Node,
    Comment,
    ProcessingInstruction(Option<String>),
}
