#![allow(dead_code)]

use payload_query::{Document, DocumentFactory, Error, ExpressionEngine, FormatDocumentFactory, PayloadContext};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const USER_XML: &str = "<root><user><id>123</id><name>John Doe</name><active>true</active><balance>100.50</balance></user></root>";

pub const STORE_JSON: &str = r#"{"store":{"book":[{"category":"reference","author":"Nigel Rees","title":"Sayings of the Century","price":8.95},{"category":"fiction","author":"Evelyn Waugh","title":"Sword of Honour","price":12.99}],"bicycle":{"color":"red","price":19.95}},"expensive":10}"#;

/// XML with a JSON document inside a CDATA section.
pub const ORDER_XML: &str = r#"<order><id>789</id><customerName>Jane Doe</customerName><details><![CDATA[{"item": "laptop", "quantity": 1, "specs": {"ram": "16GB", "ssd": "512GB"}}]]></details></order>"#;

/// JSON with an XML document inside a string value.
pub const PRODUCT_JSON: &str = r#"{"transactionId": "tx123", "productInfo": "<product><name>Super Widget</name><price>99.99</price></product>"}"#;

pub fn context(payload: &str, content_type: &str) -> PayloadContext {
    PayloadContext::new(payload, content_type, Arc::new(ExpressionEngine::new()))
}

/// Wraps the default factory and counts how many documents it builds.
#[derive(Debug, Default)]
pub struct CountingFactory {
    inner: FormatDocumentFactory,
    builds: AtomicUsize,
    delay: Duration,
}

impl CountingFactory {
    /// A factory that sleeps before each build, widening race windows.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl DocumentFactory for CountingFactory {
    fn create(&self, raw: &[u8], content_type: &str) -> Result<Document, Error> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.inner.create(raw, content_type)
    }
}

pub fn counting_engine(factory: &Arc<CountingFactory>) -> Arc<ExpressionEngine> {
    let factory: Arc<dyn DocumentFactory> = factory.clone();
    Arc::new(ExpressionEngine::builder().with_factory(factory).build())
}
