use crate::document::Document;
use crate::engine::ExpressionEngine;
use crate::error::Error;
use crate::result::QueryResult;
use log::debug;
use std::sync::{Arc, RwLock};

/// One payload and the document parsed from it on first use.
///
/// The document is built at most once per context, however many threads
/// query it concurrently. Queries run outside the lock.
#[derive(Debug)]
pub struct PayloadContext {
    raw: Vec<u8>,
    content_type: String,
    engine: Arc<ExpressionEngine>,
    document: RwLock<Option<Arc<Document>>>,
}

impl PayloadContext {
    /// Creates a context. Nothing is parsed until the first query.
    pub fn new(
        raw: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
        engine: Arc<ExpressionEngine>,
    ) -> Self {
        Self {
            raw: raw.into(),
            content_type: content_type.into(),
            engine,
            document: RwLock::new(None),
        }
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The content type as declared at construction.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn engine(&self) -> &Arc<ExpressionEngine> {
        &self.engine
    }

    /// Whether the document has been built.
    ///
    /// Returns `false` if the lock is poisoned.
    pub fn is_materialized(&self) -> bool {
        self.document
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Returns the document, parsing the payload if this is the first call.
    ///
    /// # Errors
    ///
    /// Returns the factory's error if the payload cannot be parsed; the
    /// failure is not cached, so a later call parses again. Returns
    /// `Error::ContextPoisoned` if the internal lock is poisoned.
    pub fn document(&self) -> Result<Arc<Document>, Error> {
        {
            let slot = self.document.read().map_err(|_| Error::ContextPoisoned)?;
            if let Some(document) = slot.as_ref() {
                return Ok(Arc::clone(document));
            }
        }

        let mut slot = self.document.write().map_err(|_| Error::ContextPoisoned)?;
        // Another writer may have won the race while we waited.
        if let Some(document) = slot.as_ref() {
            return Ok(Arc::clone(document));
        }
        debug!(
            "Materializing {} payload ({} bytes)",
            self.content_type,
            self.raw.len()
        );
        let document = Arc::new(self.engine.factory().create(&self.raw, &self.content_type)?);
        *slot = Some(Arc::clone(&document));
        Ok(document)
    }

    /// Evaluates a pipeline expression against this payload.
    pub fn evaluate(&self, expression: &str) -> Result<QueryResult, Error> {
        let document = self.document()?;
        self.engine.evaluate(&document, expression)
    }
}
