use crate::content_type::ContentType;
use crate::error::{BuildCause, Error, QueryCause};
use crate::result::{QueryResult, ResultType, Value};

/// A JSON payload and its parsed `serde_json` value.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    raw: Vec<u8>,
    value: serde_json::Value,
}

impl JsonDocument {
    pub fn parse(raw: Vec<u8>) -> Result<Self, BuildCause> {
        let value = serde_json::from_slice(&raw)?;
        Ok(Self { raw, value })
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    pub fn query(&self, expression: &str) -> Result<QueryResult, Error> {
        let path = payload_jpath::parse_path(expression).map_err(|e| Error::QuerySyntaxInvalid {
            expression: expression.to_string(),
            cause: QueryCause::JPath(e),
        })?;
        payload_jpath::select(&path, &self.value)
            .map(to_result)
            .ok_or_else(|| Error::QueryNotFound {
                expression: expression.to_string(),
            })
    }

    /// Compact serialization of the parsed value.
    pub fn as_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.value).map_err(|e| Error::RenderFailed {
            content_type: ContentType::ApplicationJson,
            message: e.to_string(),
        })
    }
}

fn to_result(value: serde_json::Value) -> QueryResult {
    use serde_json::Value as Json;
    match value {
        Json::Null => QueryResult::new(Value::Absent, ResultType::Unknown),
        Json::Bool(b) => QueryResult::new(Value::Boolean(b), ResultType::Boolean),
        Json::Number(n) => QueryResult::new(
            Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            ResultType::Number,
        ),
        Json::String(s) => QueryResult::string(s),
        Json::Array(items) => QueryResult::new(
            Value::Sequence(items.into_iter().map(to_result).collect()),
            ResultType::Array,
        ),
        Json::Object(map) => QueryResult::new(
            Value::Mapping(map.into_iter().map(|(k, v)| (k, to_result(v))).collect()),
            ResultType::Object,
        ),
    }
}
