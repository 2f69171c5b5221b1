//! Defines the error taxonomy for building documents and evaluating pipelines.
use crate::content_type::ContentType;
use crate::engine::QueryLanguage;
use crate::result::ResultType;
use payload_jpath::JPathError;
use payload_xpath1::XPathError;
use thiserror::Error;

/// Why a payload could not be parsed into a document.
#[derive(Error, Debug)]
pub enum BuildCause {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a format-native query was rejected by its backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryCause {
    #[error(transparent)]
    XPath(#[from] XPathError),

    #[error(transparent)]
    JPath(#[from] JPathError),
}

/// The main error enum for document construction and expression evaluation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported content type '{0}'")]
    UnsupportedContentType(String),

    #[error("Failed to build {content_type} document: {cause}")]
    DocumentBuildFailed {
        content_type: ContentType,
        #[source]
        cause: BuildCause,
    },

    #[error("Failed to render {content_type} document: {message}")]
    RenderFailed {
        content_type: ContentType,
        message: String,
    },

    #[error("{operation} requires a matching payload, but the active document is '{actual_content_type}'")]
    PayloadTypeMismatch {
        operation: QueryLanguage,
        actual_content_type: ContentType,
    },

    #[error("Invalid query '{expression}': {cause}")]
    QuerySyntaxInvalid {
        expression: String,
        #[source]
        cause: QueryCause,
    },

    #[error("No value found for query '{expression}'")]
    QueryNotFound { expression: String },

    #[error("Pipe operation '{segment}' requires a string input from the previous step, got {actual_type}")]
    PipeInputNotString {
        segment: String,
        actual_type: ResultType,
    },

    #[error("Unsupported pipe operation '{segment}'")]
    UnsupportedPipeOperation { segment: String },

    #[error("Expression is empty")]
    ExpressionEmpty,

    #[error("Expression has {stages} stages, more than the configured limit of {limit}")]
    PipelineTooLong { stages: usize, limit: usize },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Payload context lock poisoned")]
    ContextPoisoned,

    /// A failure inside one pipeline stage, tagged with where it happened.
    #[error("Error in expression '{expression}' at stage {} ('{segment}'): {source}", .index + 1)]
    Stage {
        expression: String,
        /// 0-based position of the failing segment.
        index: usize,
        segment: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// The underlying error with any [`Error::Stage`] wrappers removed.
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Error::Stage { source, .. } = current {
            current = source;
        }
        current
    }

    pub(crate) fn in_stage(self, expression: &str, index: usize, segment: &str) -> Self {
        Error::Stage {
            expression: expression.to_string(),
            index,
            segment: segment.to_string(),
            source: Box::new(self),
        }
    }
}
