use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// The structural format a payload is parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadFormat {
    Xml,
    Json,
}

impl PayloadFormat {
    /// The content type a transform into this format declares for its new document.
    pub fn content_type(&self) -> ContentType {
        match self {
            PayloadFormat::Xml => ContentType::ApplicationXml,
            PayloadFormat::Json => ContentType::ApplicationJson,
        }
    }
}

/// A declared payload media type.
///
/// Parsing is an exact match after trimming; media type parameters such as
/// `charset` are not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    ApplicationXml,
    TextXml,
    ApplicationJson,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::ApplicationXml => "application/xml",
            ContentType::TextXml => "text/xml",
            ContentType::ApplicationJson => "application/json",
        }
    }

    pub fn format(&self) -> PayloadFormat {
        match self {
            ContentType::ApplicationXml | ContentType::TextXml => PayloadFormat::Xml,
            ContentType::ApplicationJson => PayloadFormat::Json,
        }
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "application/xml" => Ok(ContentType::ApplicationXml),
            "text/xml" => Ok(ContentType::TextXml),
            "application/json" => Ok(ContentType::ApplicationJson),
            _ => Err(Error::UnsupportedContentType(s.to_string())),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
