//! Parsed, queryable payloads and the factory that builds them.

mod json;
mod xml;

pub use json::JsonDocument;
pub use xml::XmlDocument;

use crate::content_type::{ContentType, PayloadFormat};
use crate::error::Error;
use crate::result::QueryResult;
use log::trace;
use std::fmt;

/// One payload parsed in the format its content type declares.
///
/// The variant always agrees with [`Document::content_type`].
#[derive(Debug)]
pub enum Document {
    Xml(XmlDocument),
    Json(JsonDocument),
}

impl Document {
    /// The bytes the document was built from, unmodified.
    pub fn raw_bytes(&self) -> &[u8] {
        match self {
            Document::Xml(doc) => doc.raw_bytes(),
            Document::Json(doc) => doc.raw_bytes(),
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Document::Xml(doc) => doc.content_type(),
            Document::Json(_) => ContentType::ApplicationJson,
        }
    }

    pub fn format(&self) -> PayloadFormat {
        self.content_type().format()
    }

    /// Runs a format-native query (no `xpath:`/`jsonpath:` prefix).
    pub fn query(&self, expression: &str) -> Result<QueryResult, Error> {
        match self {
            Document::Xml(doc) => doc.query(expression),
            Document::Json(doc) => doc.query(expression),
        }
    }

    /// Renders the whole document back to text.
    pub fn as_string(&self) -> Result<String, Error> {
        match self {
            Document::Xml(doc) => Ok(doc.as_string()),
            Document::Json(doc) => doc.as_string(),
        }
    }
}

/// Builds a [`Document`] from raw bytes and a declared content type.
pub trait DocumentFactory: Send + Sync + fmt::Debug {
    fn create(&self, raw: &[u8], content_type: &str) -> Result<Document, Error>;
}

/// Selects the document variant from the declared content type.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatDocumentFactory;

impl DocumentFactory for FormatDocumentFactory {
    fn create(&self, raw: &[u8], content_type: &str) -> Result<Document, Error> {
        let content_type: ContentType = content_type.parse()?;
        trace!("Building {} document from {} bytes", content_type, raw.len());
        let build_failed = |cause| Error::DocumentBuildFailed {
            content_type,
            cause,
        };
        match content_type.format() {
            PayloadFormat::Xml => XmlDocument::parse(raw.to_vec(), content_type)
                .map(Document::Xml)
                .map_err(build_failed),
            PayloadFormat::Json => JsonDocument::parse(raw.to_vec())
                .map(Document::Json)
                .map_err(build_failed),
        }
    }
}
