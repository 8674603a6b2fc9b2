//! Envelope construction across operations and payload shapes

use chrono::{TimeZone, Utc};
use serde_json::Value;
use visionpipe::envelope::{unescape_document_text, HEADER_FIELDS};
use visionpipe::{
    DetectionOperation, EnvelopeBuilder, EnvelopeError, OperationResponse, ResourceReference,
    StripPolicy,
};
use yare::parameterized;

fn resource() -> ResourceReference {
    let ts = Utc.with_ymd_and_hms(2018, 5, 1, 10, 0, 0).unwrap();
    ResourceReference::new("blob://img1", "abc-123", ts).with_processed_at(ts)
}

fn build(operation: DetectionOperation, raw: &str, strip: StripPolicy) -> Value {
    let response = OperationResponse::new(operation, raw).unwrap();
    let envelope = EnvelopeBuilder::new(strip)
        .build(&resource(), &response)
        .unwrap();
    assert_eq!(envelope.operation(), operation);
    serde_json::from_str(envelope.as_str()).unwrap()
}

/// Every string property name anywhere in the document
fn property_names(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                names.push(k.clone());
                property_names(v, names);
            }
        }
        Value::Array(items) => items.iter().for_each(|v| property_names(v, names)),
        _ => {}
    }
}

#[parameterized(
    labels = { DetectionOperation::Labels, r#"[{"mid":"/m/01","description":"cat","score":0.9,"topicality":0.9}]"#, "LabelAnnotations" },
    landmarks = { DetectionOperation::Landmarks, r#"[{"mid":"/m/02","description":"tower","locations":[{"latLng":{"latitude":48.8,"longitude":2.3}}]}]"#, "LabelAnnotations" },
    logos = { DetectionOperation::Logos, r#"[{"mid":"/m/03","description":"acme"}]"#, "LabelAnnotations" },
    text = { DetectionOperation::Text, r#"{"textAnnotations":[{"locale":"en","description":"STOP"}]}"#, "textAnnotations" },
    faces = { DetectionOperation::Faces, r#"{"faceAnnotations":[{"joyLikelihood":"VERY_LIKELY"}]}"#, "faceAnnotations" },
    web = { DetectionOperation::WebDetection, r#"{"webEntities":[{"entityId":"/m/04","score":1.2,"description":"cat"}]}"#, "webEntities" },
    safe_search = { DetectionOperation::SafeSearch, r#"{"adult":"VERY_UNLIKELY","violence":"UNLIKELY"}"#, "adult" },
    properties = { DetectionOperation::Properties, r#"{"dominantColors":{"colors":[]}}"#, "dominantColors" },
    crop_hints = { DetectionOperation::CropHints, r#"{"cropHints":[{"confidence":0.8}]}"#, "cropHints" },
)]
fn test_header_precedes_payload(operation: DetectionOperation, raw: &str, payload_field: &str) {
    let response = OperationResponse::new(operation, raw).unwrap();
    let envelope = EnvelopeBuilder::default()
        .build(&resource(), &response)
        .unwrap();
    let text = envelope.as_str();

    let positions: Vec<usize> = HEADER_FIELDS
        .iter()
        .map(|f| text.find(&format!("\"{}\"", f)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(text.find(&format!("\"{}\"", payload_field)).unwrap() > positions[4]);

    let value: Value = serde_json::from_str(text).unwrap();
    assert_eq!(value["BLOBURI"], "blob://img1");
    assert_eq!(value["BLOBUID"], "abc-123");
    assert_eq!(value["BLOBDateSubmitted"], "2018-05-01T10:00:00+00:00");
    assert_eq!(value["APIDateProcessed"], "2018-05-01T10:00:00+00:00");
    assert_eq!(value["APIFunction"], operation.name());
}

#[parameterized(
    labels = { DetectionOperation::Labels, r#"[{"mid":"/m/01","description":"cat","Topicality":0.9}]"# },
    web = { DetectionOperation::WebDetection, r#"{"webEntities":[{"entityId":"/m/04","description":"cat"}],"bestGuessLabels":[{"label":"cat"}]}"# },
    nested = { DetectionOperation::Landmarks, r#"[{"mid":"/m/02","inner":{"mid":{"deep":[1,2]},"keep":true}}]"# },
)]
fn test_stripped_identifiers_are_gone(operation: DetectionOperation, raw: &str) {
    let value = build(operation, raw, StripPolicy::Always);
    let mut names = Vec::new();
    property_names(&value, &mut names);

    assert!(!names.iter().any(|n| n == "mid"));
    assert!(!names.iter().any(|n| n == "Topicality"));
    assert!(!names.iter().any(|n| n == "entityId"));
    assert!(names.iter().any(|n| n == "APIFunction"));
}

#[test]
fn test_entity_id_kept_outside_web_detection() {
    let value = build(
        DetectionOperation::Text,
        r#"{"textAnnotations":[{"entityId":"x","description":"STOP"}]}"#,
        StripPolicy::Always,
    );
    assert_eq!(value["textAnnotations"][0]["entityId"], "x");
}

#[test]
fn test_unstripped_payload_is_preserved() {
    let raw = r#"[{"mid":"/m/01","description":"cat","score":0.9}]"#;
    let value = build(DetectionOperation::Labels, raw, StripPolicy::Never);
    let expected: Value = serde_json::from_str(raw).unwrap();
    assert_eq!(value["LabelAnnotations"], expected);
}

#[parameterized(
    quotes = { r#"Hello "World""# },
    apostrophes = { "it's O'Brien's" },
    backslashes = { r"C:\new\table" },
    multiline = { "line one\nline two\r\n\ttabbed" },
    unicode = { "caf\u{e9} \u{1F600} \u{4E2D}\u{6587}" },
    mixed = { r#"say "it's" \ done"# },
    empty = { "" },
)]
fn test_document_text_round_trips(text: &str) {
    let value = build(DetectionOperation::DocumentText, text, StripPolicy::Never);
    let published = value["DocumentText"].as_str().unwrap();
    assert_eq!(unescape_document_text(published), text);
}

#[test]
fn test_document_text_unaffected_by_except_policy() {
    let value = build(
        DetectionOperation::DocumentText,
        "mid entityId",
        StripPolicy::ExceptDocumentText,
    );
    assert_eq!(
        unescape_document_text(value["DocumentText"].as_str().unwrap()),
        "mid entityId"
    );
}

#[parameterized(
    truncated = { DetectionOperation::Text, r#"{"textAnnotations":[{"description":"STOP""# },
    bare_number = { DetectionOperation::SafeSearch, "42" },
    bare_string = { DetectionOperation::Properties, r#""colors""# },
    trailing = { DetectionOperation::CropHints, r#"{"cropHints":[]} extra"# },
    empty = { DetectionOperation::Faces, "" },
    bad_literal = { DetectionOperation::WebDetection, r#"{"webEntities": undefined}"# },
)]
fn test_malformed_payload_is_rejected(operation: DetectionOperation, raw: &str) {
    let response = OperationResponse::new(operation, raw).unwrap();
    let result = EnvelopeBuilder::default().build(&resource(), &response);
    assert!(result.is_err(), "expected {:?} to be rejected", raw);
}

#[test]
fn test_root_array_outside_label_operations_is_rejected() {
    let response = OperationResponse::new(DetectionOperation::Text, "[1, 2]").unwrap();
    let err = EnvelopeBuilder::default()
        .build(&resource(), &response)
        .unwrap_err();
    assert!(matches!(err, EnvelopeError::RootNotObject { .. }));
}
