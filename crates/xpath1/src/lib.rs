//! An XPath 1.0 parser and evaluator.
//!
//! The evaluator is written against the [`DataSourceNode`] trait, so it runs
//! over any read-only tree. [`tree::Tree`] is an owned implementation that
//! XML front-ends can populate with [`tree::TreeBuilder`].

pub mod ast;
pub mod axes;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;
pub mod tree;

pub use ast::{Axis, BinaryOperator, Expression, KindTest, LocationPath, NodeTest, Step};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::{EvaluationContext, XPathValue, evaluate};
pub use error::XPathError;
pub use parser::parse_expression;
pub use tree::{Tree, TreeBuilder, TreeNode};
