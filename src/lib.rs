//! Query XML and JSON payloads with pipe-delimited expressions.
//!
//! An expression is a chain of stages separated by `|`. Each stage is either
//! a query in the active document's native language (`xpath:` for XML,
//! `jsonpath:` for JSON) or a transform (`extractAsJSON`, `extractAsXML`)
//! that re-parses the previous stage's string result as a new document.
//!
//! ```
//! use payload_query::{ExpressionEngine, PayloadContext};
//! use std::sync::Arc;
//!
//! let xml = r#"<root><data>{"name":"John","age":30}</data></root>"#;
//! let ctx = PayloadContext::new(xml, "application/xml", Arc::new(ExpressionEngine::new()));
//! let name = ctx
//!     .evaluate("xpath://data/text() | extractAsJSON | jsonpath:name")
//!     .unwrap();
//! assert_eq!(name.as_str(), Some("John"));
//! ```

pub mod config;
pub mod content_type;
pub mod context;
pub mod document;
pub mod engine;
pub mod error;
pub mod result;

// --- Public API ---
pub use config::EngineConfig;
pub use content_type::{ContentType, PayloadFormat};
pub use context::PayloadContext;
pub use document::{Document, DocumentFactory, FormatDocumentFactory, JsonDocument, XmlDocument};
pub use engine::{EngineBuilder, ExpressionEngine, QueryLanguage, Stage, StageKind};
pub use error::{BuildCause, Error, QueryCause};
pub use result::{QueryResult, ResultType, Value};
