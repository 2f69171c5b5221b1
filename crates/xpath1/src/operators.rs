//! Comparison and arithmetic operators, following the XPath 1.0 conversion rules.

use crate::ast::BinaryOperator;
use crate::datasource::DataSourceNode;
use crate::engine::{XPathValue, string_to_number};
use crate::error::XPathError;

/// A single comparable value. Node-sets are compared member by member.
#[derive(Debug)]
enum Atom {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Atom {
    fn number(&self) -> f64 {
        match self {
            Atom::String(s) => string_to_number(s),
            Atom::Number(n) => *n,
            Atom::Boolean(b) => f64::from(u8::from(*b)),
        }
    }

    fn boolean(&self) -> bool {
        match self {
            Atom::String(s) => !s.is_empty(),
            Atom::Number(n) => *n != 0.0 && !n.is_nan(),
            Atom::Boolean(b) => *b,
        }
    }
}

pub fn evaluate<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError> {
    match op {
        BinaryOperator::Union => match (left, right) {
            (XPathValue::NodeSet(mut a), XPathValue::NodeSet(b)) => {
                a.extend(b);
                a.sort();
                a.dedup();
                Ok(XPathValue::NodeSet(a))
            }
            (a, b) => Err(XPathError::Type(format!(
                "'|' requires node-sets, got {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        },
        BinaryOperator::Plus => Ok(XPathValue::Number(left.to_number() + right.to_number())),
        BinaryOperator::Minus => Ok(XPathValue::Number(left.to_number() - right.to_number())),
        BinaryOperator::Multiply => Ok(XPathValue::Number(left.to_number() * right.to_number())),
        BinaryOperator::Divide => Ok(XPathValue::Number(left.to_number() / right.to_number())),
        BinaryOperator::Modulo => Ok(XPathValue::Number(left.to_number() % right.to_number())),
        BinaryOperator::Or => Ok(XPathValue::Boolean(left.to_bool() || right.to_bool())),
        BinaryOperator::And => Ok(XPathValue::Boolean(left.to_bool() && right.to_bool())),
        BinaryOperator::Equals
        | BinaryOperator::NotEquals
        | BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => {
            let left_atoms = atomize(&left, &right);
            let right_atoms = atomize(&right, &left);
            let result = left_atoms
                .iter()
                .any(|l| right_atoms.iter().any(|r| compare_atoms(op, l, r)));
            Ok(XPathValue::Boolean(result))
        }
    }
}

/// A node-set compared with a boolean collapses to its own boolean value;
/// against anything else it expands to the string values of its nodes.
fn atomize<'a, N: DataSourceNode<'a>>(value: &XPathValue<N>, other: &XPathValue<N>) -> Vec<Atom> {
    match value {
        XPathValue::NodeSet(nodes) => {
            if matches!(other, XPathValue::Boolean(_)) {
                vec![Atom::Boolean(!nodes.is_empty())]
            } else {
                nodes.iter().map(|n| Atom::String(n.string_value())).collect()
            }
        }
        XPathValue::String(s) => vec![Atom::String(s.clone())],
        XPathValue::Number(n) => vec![Atom::Number(*n)],
        XPathValue::Boolean(b) => vec![Atom::Boolean(*b)],
    }
}

fn compare_atoms(op: BinaryOperator, left: &Atom, right: &Atom) -> bool {
    match op {
        BinaryOperator::Equals | BinaryOperator::NotEquals => {
            let equal = match (left, right) {
                (Atom::Boolean(_), _) | (_, Atom::Boolean(_)) => left.boolean() == right.boolean(),
                (Atom::Number(_), _) | (_, Atom::Number(_)) => left.number() == right.number(),
                (Atom::String(a), Atom::String(b)) => a == b,
            };
            if op == BinaryOperator::Equals {
                equal
            } else {
                !equal
            }
        }
        BinaryOperator::LessThan => left.number() < right.number(),
        BinaryOperator::LessThanOrEqual => left.number() <= right.number(),
        BinaryOperator::GreaterThan => left.number() > right.number(),
        BinaryOperator::GreaterThanOrEqual => left.number() >= right.number(),
        _ => false,
    }
}
