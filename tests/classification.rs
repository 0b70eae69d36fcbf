mod common;

use common::{system_text, test_config, ScriptedService};
use doc_sorter::classify::{parse_response, Classification, Classifier};
use serde_json::json;

fn result(value: serde_json::Value) -> Classification {
    Classification::from_value(value).expect("object")
}

#[test]
fn parses_object_fields() {
    let c = parse_response(r#"{"category":"Invoice","date":"2023-04-01","filename":"invoice.pdf"}"#)
        .expect("parse");
    assert_eq!(c.category.as_deref(), Some("Invoice"));
    assert_eq!(c.date.as_deref(), Some("2023-04-01"));
    assert_eq!(c.filename.as_deref(), Some("invoice.pdf"));
}

#[test]
fn null_date_is_kept_as_empty_but_missing_fields_are_absent() {
    let c = parse_response(r#"{"category":"unreadable","date":null,"filename":7}"#).expect("parse");
    assert_eq!(c.category.as_deref(), Some("unreadable"));
    assert_eq!(c.date.as_deref(), Some(""));
    assert!(c.filename.is_none());

    let c = parse_response(r#"{"category":"Letter"}"#).expect("parse");
    assert!(c.date.is_none());
}

#[test]
fn rejects_non_json_and_non_objects() {
    assert!(parse_response("Sure! Here is the JSON you asked for").is_err());
    assert!(parse_response(r#"["Invoice","2023-04-01"]"#).is_err());
    assert!(parse_response("").is_err());
}

#[test]
fn unreadable_is_exact_and_case_insensitive() {
    assert!(result(json!({"category": "Unreadable"})).is_unreadable());
    assert!(result(json!({"category": "UNREADABLE", "date": "unknown"})).is_unreadable());
    assert!(!result(json!({"category": "unreadable memo"})).is_unreadable());
    assert!(!result(json!({"date": "unreadable"})).is_unreadable());
}

#[test]
fn ambiguity_is_a_substring_match_over_the_whole_result() {
    let ambiguous = [
        json!({"category": "Invoice", "date": "unknown", "filename": "a.pdf"}),
        json!({"category": "Unidentified", "date": "2023-01-01", "filename": "a.pdf"}),
        // a vendor that happens to be named "Unknown Co" also triggers the retry
        json!({"category": "Invoice", "date": "2023-01-01", "filename": "Unknown Co.pdf"}),
    ];
    for value in ambiguous {
        assert!(result(value).is_ambiguous());
    }

    let clear = json!({"category": "Invoice", "date": "2023-04-01", "filename": "invoice.pdf"});
    assert!(!result(clear).is_ambiguous());
}

#[test]
fn prompt_substitutes_truncated_text() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = Classifier::new(&test_config(dir.path())).unwrap();

    let long = "a".repeat(5000);
    let prompt = classifier.build_prompt(&long);
    assert_eq!(prompt, format!("Classify this document:\n{}", "a".repeat(3000)));
}

#[test]
fn prompt_counts_characters_not_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = test_config(dir.path());
    cfg.classifier.max_prompt_chars = 3;
    let classifier = Classifier::new(&cfg).unwrap();
    assert_eq!(classifier.prepare_text("éèêë"), "éèê");
}

#[test]
fn prompt_is_redacted_before_truncation() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = test_config(dir.path());
    cfg.classifier.max_prompt_chars = 20;
    let classifier = Classifier::new(&cfg).unwrap();

    let prepared = classifier.prepare_text("SSN 123-45-6789 on file");
    assert_eq!(prepared, "SSN [REDACTED SSN] o");
    assert!(!prepared.contains("123"));
}

#[test]
fn classify_sends_one_system_message() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config(dir.path());
    let classifier = Classifier::new(&cfg).unwrap();
    let service = ScriptedService::new(vec![Ok(
        r#"{"category":"Tax","date":"2022-02-02","filename":"w2.pdf"}"#,
    )]);

    let c = classifier
        .classify(&service, "W-2 for 123456789")
        .expect("classified");
    assert_eq!(c.category.as_deref(), Some("Tax"));

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, cfg.service.classify_model);
    assert_eq!(requests[0].messages.len(), 1);
    assert_eq!(requests[0].messages[0].role, "system");
    assert!(requests[0].response_format.is_none());
    let sent = system_text(&requests[0]);
    assert!(sent.contains("[REDACTED ACCOUNT]"));
    assert!(!sent.contains("123456789"));
}

#[test]
fn json_mode_requests_an_object_response() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = test_config(dir.path());
    cfg.service.json_mode = true;
    let classifier = Classifier::new(&cfg).unwrap();
    let service = ScriptedService::new(vec![Ok(r#"{"category":"Tax"}"#)]);

    classifier.classify(&service, "text").expect("classified");
    let format = service.requests()[0].response_format.clone().expect("format");
    assert_eq!(format.kind, "json_object");
}

#[test]
fn service_or_parse_failure_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = Classifier::new(&test_config(dir.path())).unwrap();

    let failing = ScriptedService::new(vec![Err("429 quota exceeded")]);
    assert!(classifier.classify(&failing, "text").is_none());

    let chatty = ScriptedService::new(vec![Ok("I think this is an invoice.")]);
    assert!(classifier.classify(&chatty, "text").is_none());
}
