mod common;

use common::{ORDER_XML, PRODUCT_JSON, STORE_JSON, USER_XML, context};
use payload_query::{
    ContentType, Error, PayloadFormat, QueryLanguage, QueryResult, ResultType, StageKind, Value,
};

#[test]
fn test_xml_queries() {
    let ctx = context(USER_XML, "application/xml");

    let name = ctx.evaluate("xpath:/root/user/name/text()").unwrap();
    assert_eq!(name, QueryResult::string("John Doe"));

    let id = ctx.evaluate("xpath:/root/user/id").unwrap();
    assert_eq!(id.result_type(), ResultType::Scalar);
    assert_eq!(id.as_str(), Some("123"));

    let active = ctx.evaluate("xpath:boolean(/root/user/active='true')").unwrap();
    assert_eq!(active.result_type(), ResultType::Boolean);
    assert_eq!(active.as_bool(), Some(true));

    let balance = ctx.evaluate("xpath:number(/root/user/balance)").unwrap();
    assert_eq!(balance.result_type(), ResultType::Number);
    assert_eq!(balance.as_f64(), Some(100.5));
}

#[test]
fn test_json_queries() {
    let ctx = context(STORE_JSON, "application/json");

    let author = ctx.evaluate("jsonpath:store.book.0.author").unwrap();
    assert_eq!(author, QueryResult::string("Nigel Rees"));

    let price = ctx.evaluate("jsonpath:store.bicycle.price").unwrap();
    assert_eq!(price.as_f64(), Some(19.95));

    let authors = ctx.evaluate("jsonpath:store.book.#.author").unwrap();
    assert_eq!(authors.result_type(), ResultType::Array);
    assert_eq!(
        authors.value(),
        &Value::Sequence(vec![
            QueryResult::string("Nigel Rees"),
            QueryResult::string("Evelyn Waugh"),
        ])
    );

    let count = ctx.evaluate("jsonpath:store.book.#").unwrap();
    assert_eq!(count.as_f64(), Some(2.0));
}

#[test]
fn test_determinism() {
    let ctx = context(ORDER_XML, "application/xml");
    let expression = "xpath:/order/details/text() | extractAsJSON | jsonpath:specs";
    let first = ctx.evaluate(expression).unwrap();
    for _ in 0..5 {
        assert_eq!(ctx.evaluate(expression).unwrap(), first);
    }
}

#[test]
fn test_type_gating() {
    let json = context(STORE_JSON, "application/json");
    let err = json.evaluate("xpath:/store").unwrap_err();
    assert!(matches!(
        err.root(),
        Error::PayloadTypeMismatch {
            operation: QueryLanguage::XPath,
            actual_content_type: ContentType::ApplicationJson,
        }
    ));

    let xml = context(USER_XML, "text/xml");
    let err = xml.evaluate("jsonpath:root.user").unwrap_err();
    assert!(matches!(
        err.root(),
        Error::PayloadTypeMismatch {
            operation: QueryLanguage::JsonPath,
            actual_content_type: ContentType::TextXml,
        }
    ));
}

#[test]
fn test_text_xml_is_accepted() {
    let ctx = context(USER_XML, "text/xml");
    let name = ctx.evaluate("xpath:/root/user/name/text()").unwrap();
    assert_eq!(name.as_str(), Some("John Doe"));
    assert_eq!(ctx.document().unwrap().content_type(), ContentType::TextXml);
}

#[test]
fn test_passthrough_law() {
    let ctx = context(ORDER_XML, "application/xml");
    let extracted = ctx.evaluate("xpath:/order/details/text()").unwrap();
    let passthrough = ctx.evaluate("xpath:/order/details/text() | extractAsJSON").unwrap();
    assert_eq!(passthrough.value(), extracted.value());
    assert_eq!(passthrough.result_type(), ResultType::String);
}

#[test]
fn test_xml_to_json_round_trip() {
    let ctx = context(ORDER_XML, "application/xml");
    let item = ctx
        .evaluate("xpath:/order/details/text() | extractAsJSON | jsonpath:item")
        .unwrap();
    assert_eq!(item, QueryResult::string("laptop"));

    let ram = ctx
        .evaluate("xpath:/order/details/text() | extractAsJSON | jsonpath:specs.ram")
        .unwrap();
    assert_eq!(ram.as_str(), Some("16GB"));

    let quantity = ctx
        .evaluate("xpath:/order/details/text() | extractAsJSON | jsonpath:quantity")
        .unwrap();
    assert_eq!(quantity.as_f64(), Some(1.0));
}

#[test]
fn test_json_to_xml_round_trip() {
    let ctx = context(PRODUCT_JSON, "application/json");
    let name = ctx
        .evaluate("jsonpath:productInfo | extractAsXML | xpath:/product/name/text()")
        .unwrap();
    assert_eq!(name, QueryResult::string("Super Widget"));

    let price = ctx
        .evaluate("jsonpath:productInfo | extractAsXML | xpath:number(/product/price)")
        .unwrap();
    assert_eq!(price.as_f64(), Some(99.99));
}

#[test]
fn test_transform_after_transform() {
    // The passthrough string is re-parsed in the other format.
    let ctx = context(r#"{"doc":"<a>1</a>"}"#, "application/json");
    let err = ctx
        .evaluate("jsonpath:doc | extractAsXML | extractAsJSON")
        .unwrap_err();
    match &err {
        Error::Stage { index, source, .. } => {
            assert_eq!(*index, 2);
            assert!(matches!(
                **source,
                Error::DocumentBuildFailed {
                    content_type: ContentType::ApplicationJson,
                    ..
                }
            ));
        }
        other => panic!("expected a stage error, got {:?}", other),
    }

    let ctx = context(r#"{"doc":"[1, 2, 3]"}"#, "application/json");
    let err = ctx
        .evaluate("jsonpath:doc | extractAsJSON | extractAsXML")
        .unwrap_err();
    assert!(matches!(err.root(), Error::DocumentBuildFailed { .. }));

    // Same-format transforms re-parse the passthrough string.
    let ctx = context(r#"{"doc":"<a>1</a>"}"#, "application/json");
    let value = ctx
        .evaluate("jsonpath:doc | extractAsXML | extractAsXML | xpath:/a/text()")
        .unwrap();
    assert_eq!(value.as_str(), Some("1"));
}

#[test]
fn test_transform_chain_then_query() {
    let ctx = context(r#"{"outer":"{\"inner\":\"<x>deep</x>\"}"}"#, "application/json");
    let deep = ctx
        .evaluate("jsonpath:outer | extractAsJSON | jsonpath:inner | extractAsXML | xpath:/x/text()")
        .unwrap();
    assert_eq!(deep.as_str(), Some("deep"));
}

#[test]
fn test_absence_versus_emptiness() {
    let ctx = context(r#"{"empty":"","nothing":null}"#, "application/json");
    assert_eq!(ctx.evaluate("jsonpath:empty").unwrap().as_str(), Some(""));

    let null = ctx.evaluate("jsonpath:nothing").unwrap();
    assert_eq!(null.value(), &Value::Absent);

    let err = ctx.evaluate("jsonpath:missing").unwrap_err();
    assert!(matches!(err.root(), Error::QueryNotFound { expression } if expression == "missing"));

    let xml = context("<r><e></e></r>", "application/xml");
    let empty = xml.evaluate("xpath:/r/e").unwrap();
    assert_eq!(empty.as_str(), Some(""));
    let err = xml.evaluate("xpath:/r/e/text()").unwrap_err();
    assert!(matches!(err.root(), Error::QueryNotFound { .. }));
}

#[test]
fn test_not_found_paths() {
    let json = context(STORE_JSON, "application/json");
    let err = json.evaluate("jsonpath:store.book.10.author").unwrap_err();
    assert!(matches!(err.root(), Error::QueryNotFound { .. }));

    let xml = context(USER_XML, "application/xml");
    let err = xml.evaluate("xpath:/root/nonexistent/text()").unwrap_err();
    assert!(matches!(err.root(), Error::QueryNotFound { .. }));

    let order = context(ORDER_XML, "application/xml");
    let err = order
        .evaluate("xpath:/order/details/text() | extractAsJSON | jsonpath:nonexistent.key")
        .unwrap_err();
    assert!(matches!(err.root(), Error::QueryNotFound { expression } if expression == "nonexistent.key"));
}

#[test]
fn test_unsupported_pipe_segment() {
    let ctx = context(ORDER_XML, "application/xml");
    let err = ctx
        .evaluate("xpath:/order/details/text() | extractAsYAML")
        .unwrap_err();
    assert!(matches!(
        err.root(),
        Error::UnsupportedPipeOperation { segment } if segment == "extractAsYAML"
    ));
    assert!(err.to_string().contains("at stage 2"));
}

#[test]
fn test_earlier_stage_failure_wins() {
    let ctx = context(ORDER_XML, "application/xml");
    let err = ctx
        .evaluate("xpath:/order/missing/text() | extractAsYAML")
        .unwrap_err();
    assert!(matches!(err.root(), Error::QueryNotFound { .. }));
}

#[test]
fn test_non_string_transform_input() {
    let ctx = context(STORE_JSON, "application/json");
    let err = ctx.evaluate("jsonpath:expensive | extractAsXML").unwrap_err();
    assert!(matches!(
        err.root(),
        Error::PipeInputNotString {
            segment,
            actual_type: ResultType::Number,
        } if segment == "extractAsXML"
    ));

    let err = ctx.evaluate("jsonpath:store.book | extractAsJSON").unwrap_err();
    assert!(matches!(
        err.root(),
        Error::PipeInputNotString {
            actual_type: ResultType::Array,
            ..
        }
    ));

    let xml = context(USER_XML, "application/xml");
    let err = xml.evaluate("xpath:count(//user) | extractAsJSON").unwrap_err();
    assert!(matches!(err.root(), Error::PipeInputNotString { .. }));
}

#[test]
fn test_multi_node_results() {
    let ctx = context("<r><v>a</v><v>b</v><v>c</v></r>", "application/xml");
    let values = ctx.evaluate("xpath:/r/v/text()").unwrap();
    assert_eq!(values.result_type(), ResultType::NodeSet);
    assert_eq!(values.to_string(), "[a, b, c]");

    let elements = ctx.evaluate("xpath:/r/v[position() > 1]").unwrap();
    match elements.value() {
        Value::Sequence(items) => {
            assert_eq!(items.len(), 2);
            assert!(items.iter().all(|item| item.result_type() == ResultType::Scalar));
        }
        other => panic!("expected a sequence, got {:?}", other),
    }
}

#[test]
fn test_malformed_payloads() {
    let ctx = context("<root><unclosed></root>", "application/xml");
    assert!(matches!(
        ctx.evaluate("xpath:/root"),
        Err(Error::DocumentBuildFailed {
            content_type: ContentType::ApplicationXml,
            ..
        })
    ));

    let ctx = context(r#"{"a": }"#, "application/json");
    assert!(matches!(
        ctx.evaluate("jsonpath:a"),
        Err(Error::DocumentBuildFailed { .. })
    ));
}

#[test]
fn test_unsupported_content_type() {
    let ctx = context("key=value", "application/x-www-form-urlencoded");
    let err = ctx.evaluate("jsonpath:key").unwrap_err();
    assert!(matches!(err, Error::UnsupportedContentType(ref s) if s == "application/x-www-form-urlencoded"));
}

#[test]
fn test_invalid_query_syntax() {
    let ctx = context(USER_XML, "application/xml");
    let err = ctx.evaluate("xpath:/root/user[").unwrap_err();
    assert!(matches!(err.root(), Error::QuerySyntaxInvalid { expression, .. } if expression == "/root/user["));
}

#[test]
fn test_pipeline_classification() {
    let ctx = context(STORE_JSON, "application/json");
    let stages = ctx
        .engine()
        .parse_pipeline("jsonpath:a | extractAsXML | xpath:/b | bogus")
        .unwrap();
    let kinds: Vec<StageKind<'_>> = stages.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StageKind::Query {
                language: QueryLanguage::JsonPath,
                expression: "a"
            },
            StageKind::Transform(PayloadFormat::Xml),
            StageKind::Query {
                language: QueryLanguage::XPath,
                expression: "/b"
            },
            StageKind::Unsupported,
        ]
    );
}
