use std::collections::BTreeMap;
use std::fmt;

/// Advisory tag describing what produced a [`QueryResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    /// A single element or document node, carried as its string value.
    Scalar,
    NodeSet,
    Object,
    Array,
    String,
    Boolean,
    Number,
    Unknown,
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultType::Scalar => "scalar",
            ResultType::NodeSet => "node-set",
            ResultType::Object => "object",
            ResultType::Array => "array",
            ResultType::String => "string",
            ResultType::Boolean => "boolean",
            ResultType::Number => "number",
            ResultType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A fully materialized value produced by one evaluation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    Sequence(Vec<QueryResult>),
    Mapping(BTreeMap<String, QueryResult>),
    /// Found, but empty (JSON `null`).
    Absent,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Mapping(entries) => {
                f.write_str("{")?;
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                f.write_str("}")
            }
            Value::Absent => f.write_str("null"),
        }
    }
}

/// The value and type tag produced by a query or transform stage.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    value: Value,
    result_type: ResultType,
}

impl QueryResult {
    pub fn new(value: Value, result_type: ResultType) -> Self {
        Self { value, result_type }
    }

    /// A `String`-tagged result holding `text`.
    pub fn string(text: impl Into<String>) -> Self {
        Self::new(Value::String(text.into()), ResultType::String)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn result_type(&self) -> ResultType {
        self.result_type
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}
