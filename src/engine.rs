//! The pipeline engine: splits an expression into stages and runs them
//! against an active document, rebinding it on format transforms.

use crate::config::EngineConfig;
use crate::content_type::{ContentType, PayloadFormat};
use crate::document::{Document, DocumentFactory, FormatDocumentFactory};
use crate::error::Error;
use crate::result::{QueryResult, Value};
use log::{debug, trace};
use std::fmt;
use std::sync::Arc;

pub const XPATH_PREFIX: &str = "xpath:";
pub const JSONPATH_PREFIX: &str = "jsonpath:";
pub const EXTRACT_AS_JSON: &str = "extractAsJSON";
pub const EXTRACT_AS_XML: &str = "extractAsXML";

/// The query language selected by a stage prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryLanguage {
    XPath,
    JsonPath,
}

impl QueryLanguage {
    pub fn prefix(&self) -> &'static str {
        match self {
            QueryLanguage::XPath => XPATH_PREFIX,
            QueryLanguage::JsonPath => JSONPATH_PREFIX,
        }
    }

    /// The payload format this language queries.
    pub fn format(&self) -> PayloadFormat {
        match self {
            QueryLanguage::XPath => PayloadFormat::Xml,
            QueryLanguage::JsonPath => PayloadFormat::Json,
        }
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryLanguage::XPath => f.write_str("XPath"),
            QueryLanguage::JsonPath => f.write_str("JSONPath"),
        }
    }
}

/// What a single pipeline segment asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind<'e> {
    Query {
        language: QueryLanguage,
        expression: &'e str,
    },
    Transform(PayloadFormat),
    Unsupported,
}

/// One trimmed `|`-separated segment and its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage<'e> {
    pub segment: &'e str,
    pub kind: StageKind<'e>,
}

impl<'e> Stage<'e> {
    pub fn classify(segment: &'e str) -> Self {
        let kind = if segment == EXTRACT_AS_JSON {
            StageKind::Transform(PayloadFormat::Json)
        } else if segment == EXTRACT_AS_XML {
            StageKind::Transform(PayloadFormat::Xml)
        } else if let Some(expression) = segment.strip_prefix(XPATH_PREFIX) {
            StageKind::Query {
                language: QueryLanguage::XPath,
                expression,
            }
        } else if let Some(expression) = segment.strip_prefix(JSONPATH_PREFIX) {
            StageKind::Query {
                language: QueryLanguage::JsonPath,
                expression,
            }
        } else {
            StageKind::Unsupported
        };
        trace!("Classified segment '{}' as {:?}", segment, kind);
        Self { segment, kind }
    }
}

/// Evaluates pipe-delimited expressions against documents.
///
/// Stateless apart from its configuration; one engine can be shared by any
/// number of contexts and threads.
#[derive(Debug, Clone)]
pub struct ExpressionEngine {
    factory: Arc<dyn DocumentFactory>,
    config: EngineConfig,
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionEngine {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn factory(&self) -> &Arc<dyn DocumentFactory> {
        &self.factory
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Splits and classifies `expression` without evaluating anything.
    ///
    /// Unsupported segments are not an error here; they fail when evaluation
    /// reaches them.
    pub fn parse_pipeline<'e>(&self, expression: &'e str) -> Result<Vec<Stage<'e>>, Error> {
        let segments: Vec<&str> = expression.split('|').map(str::trim).collect();
        if let [only] = segments.as_slice()
            && only.is_empty()
        {
            return Err(Error::ExpressionEmpty);
        }
        if segments.len() > self.config.max_stages {
            return Err(Error::PipelineTooLong {
                stages: segments.len(),
                limit: self.config.max_stages,
            });
        }
        Ok(segments.into_iter().map(Stage::classify).collect())
    }

    /// Runs every stage of `expression`, starting with `initial` as the
    /// active document, and returns the last stage's result.
    pub fn evaluate(&self, initial: &Document, expression: &str) -> Result<QueryResult, Error> {
        let stages = self.parse_pipeline(expression)?;
        let mut transformed: Option<Document> = None;
        let mut current: Option<QueryResult> = None;

        for (index, stage) in stages.iter().enumerate() {
            let active = transformed.as_ref().unwrap_or(initial);
            let outcome = match (stage.kind, current.as_ref()) {
                (
                    StageKind::Query {
                        language,
                        expression: native,
                    },
                    _,
                ) => self.query(active, language, native),
                (StageKind::Transform(target), Some(input)) => {
                    match self.transform(input, stage.segment, target) {
                        Ok((document, passthrough)) => {
                            transformed = Some(document);
                            Ok(passthrough)
                        }
                        Err(e) => Err(e),
                    }
                }
                // A transform as the first segment has no input to work on.
                (StageKind::Transform(_), None) | (StageKind::Unsupported, _) => {
                    Err(Error::UnsupportedPipeOperation {
                        segment: stage.segment.to_string(),
                    })
                }
            };
            current = Some(outcome.map_err(|e| e.in_stage(expression, index, stage.segment))?);
        }

        current.ok_or(Error::ExpressionEmpty)
    }

    /// Evaluates one prefixed query against `document`.
    pub fn evaluate_single(
        &self,
        document: &Document,
        expression: &str,
    ) -> Result<QueryResult, Error> {
        match Stage::classify(expression.trim()).kind {
            StageKind::Query {
                language,
                expression,
            } => self.query(document, language, expression),
            _ => Err(Error::UnsupportedPipeOperation {
                segment: expression.trim().to_string(),
            }),
        }
    }

    fn query(
        &self,
        document: &Document,
        language: QueryLanguage,
        expression: &str,
    ) -> Result<QueryResult, Error> {
        let content_type: ContentType = document.content_type();
        if content_type.format() != language.format() {
            return Err(Error::PayloadTypeMismatch {
                operation: language,
                actual_content_type: content_type,
            });
        }
        document.query(expression)
    }

    fn transform(
        &self,
        input: &QueryResult,
        segment: &str,
        target: PayloadFormat,
    ) -> Result<(Document, QueryResult), Error> {
        let Value::String(text) = input.value() else {
            return Err(Error::PipeInputNotString {
                segment: segment.to_string(),
                actual_type: input.result_type(),
            });
        };
        let content_type = target.content_type();
        debug!(
            "Rebinding active document as {} ({} bytes)",
            content_type,
            text.len()
        );
        let document = self.factory.create(text.as_bytes(), content_type.as_str())?;
        Ok((document, QueryResult::string(text.as_str())))
    }
}

/// Builds an [`ExpressionEngine`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    factory: Option<Arc<dyn DocumentFactory>>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_stages(mut self, max_stages: usize) -> Self {
        self.config.max_stages = max_stages;
        self
    }

    pub fn with_factory(mut self, factory: Arc<dyn DocumentFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn build(self) -> ExpressionEngine {
        let mut config = self.config;
        config.max_stages = config.max_stages.max(1);
        ExpressionEngine {
            factory: self.factory.unwrap_or_else(|| Arc::new(FormatDocumentFactory)),
            config,
        }
    }
}
