use crate::content_type::ContentType;
use crate::error::{BuildCause, Error, QueryCause};
use crate::result::{QueryResult, ResultType, Value};
use payload_xpath1::{
    DataSourceNode, EvaluationContext, NodeType, QName, Tree, TreeBuilder, TreeNode, XPathValue,
};
use quick_xml::escape::escape;

/// An XML payload and an owned copy of its node tree.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    raw: Vec<u8>,
    content_type: ContentType,
    tree: Tree,
}

impl XmlDocument {
    pub fn parse(raw: Vec<u8>, content_type: ContentType) -> Result<Self, BuildCause> {
        let text = std::str::from_utf8(&raw)?;
        let parsed = roxmltree::Document::parse(text)?;
        let mut builder = TreeBuilder::new();
        for child in parsed.root().children() {
            copy_node(child, &mut builder);
        }
        let tree = builder.finish();
        Ok(Self {
            raw,
            content_type,
            tree,
        })
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn query(&self, expression: &str) -> Result<QueryResult, Error> {
        let invalid = |e| Error::QuerySyntaxInvalid {
            expression: expression.to_string(),
            cause: QueryCause::XPath(e),
        };
        let compiled = payload_xpath1::parse_expression(expression).map_err(invalid)?;
        let e_ctx = EvaluationContext::new(self.tree.root());
        let value = payload_xpath1::evaluate(&compiled, &e_ctx).map_err(invalid)?;

        match value {
            XPathValue::Number(n) => Ok(QueryResult::new(Value::Number(n), ResultType::Number)),
            XPathValue::Boolean(b) => Ok(QueryResult::new(Value::Boolean(b), ResultType::Boolean)),
            XPathValue::String(s) => Ok(QueryResult::string(s)),
            XPathValue::NodeSet(nodes) => match nodes.as_slice() {
                [] => Err(Error::QueryNotFound {
                    expression: expression.to_string(),
                }),
                [node] => Ok(node_result(*node)),
                many => Ok(QueryResult::new(
                    Value::Sequence(many.iter().copied().map(node_result).collect()),
                    ResultType::NodeSet,
                )),
            },
        }
    }

    /// Serializes the tree. Namespace declarations are not reproduced.
    pub fn as_string(&self) -> String {
        let mut out = String::with_capacity(self.raw.len());
        write_node(self.tree.root(), &mut out);
        out
    }
}

fn node_result(node: TreeNode<'_>) -> QueryResult {
    let result_type = match node.node_type() {
        NodeType::Root | NodeType::Element => ResultType::Scalar,
        _ => ResultType::String,
    };
    QueryResult::new(Value::String(node.string_value()), result_type)
}

fn prefix_of<'a>(node: roxmltree::Node<'a, '_>, namespace: Option<&str>) -> Option<&'a str> {
    namespace
        .and_then(|uri| node.lookup_prefix(uri))
        .filter(|prefix| !prefix.is_empty())
}

fn copy_node(node: roxmltree::Node<'_, '_>, builder: &mut TreeBuilder) {
    match node.node_type() {
        roxmltree::NodeType::Element => {
            let tag = node.tag_name();
            builder.start_element(prefix_of(node, tag.namespace()), tag.name());
            for attr in node.attributes() {
                builder.attribute(prefix_of(node, attr.namespace()), attr.name(), attr.value());
            }
            for child in node.children() {
                copy_node(child, builder);
            }
            builder.end_element();
        }
        roxmltree::NodeType::Text => {
            builder.text(node.text().unwrap_or_default());
        }
        roxmltree::NodeType::Comment => {
            builder.comment(node.text().unwrap_or_default());
        }
        roxmltree::NodeType::PI => {
            if let Some(pi) = node.pi() {
                builder.processing_instruction(pi.target, pi.value.unwrap_or_default());
            }
        }
        roxmltree::NodeType::Root => {}
    }
}

fn push_name(name: Option<QName<'_>>, out: &mut String) {
    if let Some(name) = name {
        if let Some(prefix) = name.prefix {
            out.push_str(prefix);
            out.push(':');
        }
        out.push_str(name.local_part);
    }
}

fn write_node(node: TreeNode<'_>, out: &mut String) {
    match node.node_type() {
        NodeType::Root => {
            for child in node.children() {
                write_node(child, out);
            }
        }
        NodeType::Element => {
            out.push('<');
            push_name(node.name(), out);
            for attr in node.attributes() {
                out.push(' ');
                push_name(attr.name(), out);
                out.push_str("=\"");
                out.push_str(&escape(attr.string_value().as_str()));
                out.push('"');
            }
            let mut children = node.children().peekable();
            if children.peek().is_none() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in children {
                write_node(child, out);
            }
            out.push_str("</");
            push_name(node.name(), out);
            out.push('>');
        }
        NodeType::Text => out.push_str(&escape(node.string_value().as_str())),
        NodeType::Comment => {
            out.push_str("<!--");
            out.push_str(&node.string_value());
            out.push_str("-->");
        }
        NodeType::ProcessingInstruction => {
            out.push_str("<?");
            push_name(node.name(), out);
            let value = node.string_value();
            if !value.is_empty() {
                out.push(' ');
                out.push_str(&value);
            }
            out.push_str("?>");
        }
        NodeType::Attribute => {}
    }
}
