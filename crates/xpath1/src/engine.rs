//! The evaluation engine for executing a parsed XPath AST against a generic `DataSourceNode`.

use crate::ast::{Axis, BinaryOperator, Expression, KindTest, LocationPath, NodeTest, Step};
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;
use crate::{axes, functions, operators};
use std::fmt;
use std::marker::PhantomData;

/// The four XPath 1.0 value types.
#[derive(Debug, Clone, PartialEq)]
pub enum XPathValue<N> {
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: DataSourceNode<'a>> XPathValue<N> {
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::Boolean(b) => f64::from(u8::from(*b)),
            XPathValue::String(s) => string_to_number(s),
            XPathValue::NodeSet(nodes) => nodes
                .first()
                .map_or(f64::NAN, |n| string_to_number(&n.string_value())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            XPathValue::NodeSet(_) => "node-set",
            XPathValue::String(_) => "string",
            XPathValue::Number(_) => "number",
            XPathValue::Boolean(_) => "boolean",
        }
    }
}

/// The XPath `string()` conversion. A node-set converts to the string value of
/// its first node.
impl<'a, N: DataSourceNode<'a>> fmt::Display for XPathValue<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => match nodes.first() {
                Some(node) => f.write_str(&node.string_value()),
                None => Ok(()),
            },
            XPathValue::String(s) => f.write_str(s),
            XPathValue::Number(n) => f.write_str(&number_to_string(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// XPath number lexing: optional minus, digits, optional fraction. Anything
/// else (including exponents and `inf`) is NaN.
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let valid = !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if valid {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// The evaluation focus: context node, its position and the size of the context.
/// `'a` is the lifetime of the underlying tree.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a, N: DataSourceNode<'a>> {
    pub context_node: N,
    pub root_node: N,
    /// 1-based.
    pub context_position: usize,
    pub context_size: usize,
    _marker: PhantomData<&'a ()>,
}

impl<'a, N: DataSourceNode<'a>> EvaluationContext<'a, N> {
    /// A context focused on the document root.
    pub fn new(root_node: N) -> Self {
        Self {
            context_node: root_node,
            root_node,
            context_position: 1,
            context_size: 1,
            _marker: PhantomData,
        }
    }

    fn focus(&self, node: N, position: usize, size: usize) -> Self {
        Self {
            context_node: node,
            root_node: self.root_node,
            context_position: position,
            context_size: size,
            _marker: PhantomData,
        }
    }
}

/// Evaluates an expression. Node-sets in the result are in document order
/// without duplicates.
pub fn evaluate<'a, N>(
    expr: &Expression,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::Path(path) => evaluate_location_path(path, e_ctx).map(XPathValue::NodeSet),
        Expression::Filter {
            primary,
            predicates,
            steps,
        } => {
            let mut nodes = match evaluate(primary, e_ctx)? {
                XPathValue::NodeSet(nodes) => nodes,
                other => {
                    return Err(XPathError::Type(format!(
                        "predicates and paths require a node-set, got {}",
                        other.type_name()
                    )));
                }
            };
            for predicate in predicates {
                nodes = apply_predicate(nodes, predicate, e_ctx)?;
            }
            apply_steps(nodes, steps, e_ctx).map(XPathValue::NodeSet)
        }
        Expression::FunctionCall { name, args } => {
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(evaluate(arg, e_ctx)?);
            }
            functions::call(name, evaluated, e_ctx)
        }
        Expression::Binary { op, left, right } => match op {
            BinaryOperator::Or => {
                let result = evaluate(left, e_ctx)?.to_bool() || evaluate(right, e_ctx)?.to_bool();
                Ok(XPathValue::Boolean(result))
            }
            BinaryOperator::And => {
                let result = evaluate(left, e_ctx)?.to_bool() && evaluate(right, e_ctx)?.to_bool();
                Ok(XPathValue::Boolean(result))
            }
            _ => {
                let left_val = evaluate(left, e_ctx)?;
                let right_val = evaluate(right, e_ctx)?;
                operators::evaluate(*op, left_val, right_val)
            }
        },
        Expression::Negate(inner) => Ok(XPathValue::Number(-evaluate(inner, e_ctx)?.to_number())),
    }
}

fn evaluate_location_path<'a, N>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let start = if path.absolute {
        e_ctx.root_node
    } else {
        e_ctx.context_node
    };
    apply_steps(vec![start], &path.steps, e_ctx)
}

fn apply_steps<'a, N>(
    mut nodes: Vec<N>,
    steps: &[Step],
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    for step in steps {
        let mut next = Vec::new();
        for &node in &nodes {
            let mut candidates: Vec<N> = axes::collect(step.axis, node)
                .into_iter()
                .filter(|candidate| matches_test(candidate, &step.test, step.axis))
                .collect();
            for predicate in &step.predicates {
                candidates = apply_predicate(candidates, predicate, e_ctx)?;
            }
            next.extend(candidates);
        }
        next.sort();
        next.dedup();
        nodes = next;
    }
    Ok(nodes)
}

/// Keeps the nodes for which `predicate` holds. A numeric predicate is
/// shorthand for `position() = n`; positions follow the order of `nodes`.
fn apply_predicate<'a, N>(
    nodes: Vec<N>,
    predicate: &Expression,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let size = nodes.len();
    let mut kept = Vec::with_capacity(size);
    for (index, node) in nodes.into_iter().enumerate() {
        let focused = e_ctx.focus(node, index + 1, size);
        let keep = match evaluate(predicate, &focused)? {
            XPathValue::Number(n) => n == (index + 1) as f64,
            other => other.to_bool(),
        };
        if keep {
            kept.push(node);
        }
    }
    Ok(kept)
}

fn matches_test<'a, N: DataSourceNode<'a>>(node: &N, test: &NodeTest, axis: Axis) -> bool {
    let principal = if axis == Axis::Attribute {
        NodeType::Attribute
    } else {
        NodeType::Element
    };
    match test {
        NodeTest::Any => node.node_type() == principal,
        NodeTest::AnyInPrefix(prefix) => {
            node.node_type() == principal
                && node.name().is_some_and(|q| q.prefix == Some(prefix.as_str()))
        }
        NodeTest::Name { prefix, local } => {
            node.node_type() == principal
                && node.name().is_some_and(|q| {
                    q.local_part == local
                        && prefix.as_deref().is_none_or(|p| q.prefix == Some(p))
                })
        }
        NodeTest::Kind(kind) => match kind {
            KindTest::Node => true,
            KindTest::Text => node.node_type() == NodeType::Text,
            KindTest::Comment => node.node_type() == NodeType::Comment,
            KindTest::ProcessingInstruction(target) => {
                node.node_type() == NodeType::ProcessingInstruction
                    && target.as_deref().is_none_or(|t| {
                        node.name().is_some_and(|q| q.local_part == t)
                    })
            }
        },
    }
}
