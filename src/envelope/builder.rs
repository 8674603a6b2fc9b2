//! Envelope construction
//!
//! Raw responses for several operations are not valid structured text on
//! their own: label-style operations return a bare array and document text
//! returns a bare string body. The builder repairs those shapes first, then
//! streams the repaired text through [`TokenReader`] into [`TokenWriter`],
//! dropping stripped properties and injecting the provenance header into the
//! root object on the way.

use super::error::EnvelopeError;
use super::header::EnvelopeHeader;
use super::reader::{Token, TokenReader};
use super::strip::{is_stripped_property, StripPolicy};
use super::writer::TokenWriter;
use crate::resource::ResourceReference;
use crate::vision::{DetectionOperation, OperationResponse};
use std::borrow::Cow;
use tracing::trace;

/// Property that wraps bare annotation arrays
pub const LABEL_ANNOTATIONS_FIELD: &str = "LabelAnnotations";

/// Property that wraps the document text body
pub const DOCUMENT_TEXT_FIELD: &str = "DocumentText";

/// Canonical output unit: header-enriched, well-formed JSON for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    operation: DetectionOperation,
    body: String,
}

impl Envelope {
    pub fn operation(&self) -> DetectionOperation {
        self.operation
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeBuilder {
    strip: StripPolicy,
}

impl EnvelopeBuilder {
    pub fn new(strip: StripPolicy) -> Self {
        Self { strip }
    }

    pub fn strip_policy(&self) -> StripPolicy {
        self.strip
    }

    pub fn build(
        &self,
        resource: &ResourceReference,
        response: &OperationResponse,
    ) -> Result<Envelope, EnvelopeError> {
        let operation = response.operation();
        let header = EnvelopeHeader::new(resource, operation);
        let repaired = repair(response);
        let strip = self.strip.applies_to(operation);

        trace!(
            operation = %operation,
            strip,
            raw_len = response.raw().len(),
            "Rewriting operation payload"
        );

        let body = rewrite(&repaired, &header, strip)?;
        Ok(Envelope { operation, body })
    }
}

/// Turns the operation's native response text into something the token
/// reader accepts.
pub fn repair(response: &OperationResponse) -> Cow<'_, str> {
    match response {
        OperationResponse::DocumentText(body) => Cow::Owned(wrap_document_text(body)),
        other if other.operation().returns_bare_array() => wrap_annotation_array(other.raw()),
        other => Cow::Borrowed(other.raw()),
    }
}

/// Wraps a bare array as the value of [`LABEL_ANNOTATIONS_FIELD`].
/// Payloads that already open with an object are returned unchanged.
pub fn wrap_annotation_array(raw: &str) -> Cow<'_, str> {
    if raw.trim_start().starts_with('[') {
        Cow::Owned(format!("{{\"{}\": {}}}", LABEL_ANNOTATIONS_FIELD, raw))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Escapes quotes, apostrophes and backslashes three levels deep and wraps
/// the body as the value of [`DOCUMENT_TEXT_FIELD`].
pub fn wrap_document_text(body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 32);
    out.push_str("{ ");
    out.push_str(DOCUMENT_TEXT_FIELD);
    out.push_str(": \"");
    for c in body.chars() {
        if matches!(c, '"' | '\'' | '\\') {
            out.push_str("\\\\\\");
        }
        out.push(c);
    }
    out.push_str("\" }");
    out
}

/// Reverses the one level of escaping that survives in a published
/// document text value.
pub fn unescape_document_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Single streaming pass: read one token, write one token, unless the strip
/// rule suppresses it. The header goes in right after the root object opens.
pub fn rewrite(
    payload: &str,
    header: &EnvelopeHeader,
    strip: bool,
) -> Result<String, EnvelopeError> {
    let mut reader = TokenReader::new(payload);
    let mut writer = TokenWriter::with_capacity(payload.len() + 256);
    let mut header_written = false;

    while let Some(token) = reader.next_token()? {
        if !header_written {
            if token != Token::StartObject {
                return Err(EnvelopeError::RootNotObject {
                    found: token.describe(),
                });
            }
            writer.write_token(&token);
            header.write_to(&mut writer);
            header_written = true;
            continue;
        }

        if let Token::PropertyName(name) = &token {
            if strip && is_stripped_property(name, header.operation) {
                reader.skip_value()?;
                continue;
            }
        }

        writer.write_token(&token);
    }

    if !header_written {
        return Err(EnvelopeError::Empty);
    }

    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::header::HEADER_FIELDS;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    fn resource() -> ResourceReference {
        let ts = Utc.with_ymd_and_hms(2018, 5, 1, 10, 0, 0).unwrap();
        ResourceReference::new("blob://img1", "abc-123", ts).with_processed_at(ts)
    }

    fn keys(body: &str) -> Vec<String> {
        // serde_json's preserve_order is off, so read key order from the text
        let mut reader = TokenReader::new(body);
        let mut keys = Vec::new();
        while let Some(token) = reader.next_token().unwrap() {
            if let Token::PropertyName(name) = token {
                if reader.depth() == 1 {
                    keys.push(name);
                }
            }
        }
        keys
    }

    #[test]
    fn test_labels_wrapped_and_stripped() {
        let builder = EnvelopeBuilder::new(StripPolicy::Always);
        let response = OperationResponse::Labels(
            r#"[{"description":"cat","score":0.9,"mid":"/m/01"}]"#.to_string(),
        );

        let envelope = builder.build(&resource(), &response).unwrap();
        let value: Value = serde_json::from_str(envelope.as_str()).unwrap();

        assert_eq!(value["BLOBURI"], "blob://img1");
        assert_eq!(value["APIFunction"], "DETECT_LABELS");
        let labels = value[LABEL_ANNOTATIONS_FIELD].as_array().unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0]["description"], "cat");
        assert_eq!(labels[0]["score"], 0.9);
        assert!(labels[0].get("mid").is_none());
    }

    #[test]
    fn test_header_fields_come_first() {
        let builder = EnvelopeBuilder::default();
        let response =
            OperationResponse::SafeSearch(r#"{"adult":"VERY_UNLIKELY","spoof":"UNLIKELY"}"#.to_string());

        let envelope = builder.build(&resource(), &response).unwrap();
        let keys = keys(envelope.as_str());

        assert_eq!(&keys[..5], &HEADER_FIELDS.map(String::from)[..]);
        assert_eq!(&keys[5..], &["adult".to_string(), "spoof".to_string()]);
    }

    #[test]
    fn test_wrapping_is_idempotent() {
        let already = r#"{"LabelAnnotations": [{"description": "dog"}]}"#;
        assert_eq!(wrap_annotation_array(already), Cow::Borrowed(already));

        let builder = EnvelopeBuilder::default();
        let envelope = builder
            .build(&resource(), &OperationResponse::Logos(already.to_string()))
            .unwrap();
        let value: Value = serde_json::from_str(envelope.as_str()).unwrap();
        assert!(value[LABEL_ANNOTATIONS_FIELD].is_array());
        assert_eq!(value[LABEL_ANNOTATIONS_FIELD][0]["description"], "dog");
    }

    #[test]
    fn test_document_text_round_trip() {
        let builder = EnvelopeBuilder::default();
        let response = OperationResponse::DocumentText(r#"Hello "World""#.to_string());

        let envelope = builder.build(&resource(), &response).unwrap();
        let value: Value = serde_json::from_str(envelope.as_str()).unwrap();
        let text = value[DOCUMENT_TEXT_FIELD].as_str().unwrap();

        assert_eq!(text, r#"Hello \"World\""#);
        assert_eq!(unescape_document_text(text), r#"Hello "World""#);
        assert_eq!(keys(envelope.as_str())[5], DOCUMENT_TEXT_FIELD);
    }

    #[test]
    fn test_document_text_with_apostrophes_and_backslashes() {
        let original = "It's a path: C:\\temp\nsecond line";
        let builder = EnvelopeBuilder::default();
        let envelope = builder
            .build(
                &resource(),
                &OperationResponse::DocumentText(original.to_string()),
            )
            .unwrap();
        let value: Value = serde_json::from_str(envelope.as_str()).unwrap();

        let text = value[DOCUMENT_TEXT_FIELD].as_str().unwrap();
        assert_eq!(unescape_document_text(text), original);
    }

    #[test]
    fn test_strip_removes_nested_values() {
        let builder = EnvelopeBuilder::new(StripPolicy::Always);
        let response = OperationResponse::WebDetection(
            r#"{"webEntities":[{"entityId":"/m/0","score":1.2,"description":"cat"}],"mid":{"nested":[1,2]},"bestGuessLabels":[{"label":"cat"}]}"#
                .to_string(),
        );

        let envelope = builder.build(&resource(), &response).unwrap();
        let value: Value = serde_json::from_str(envelope.as_str()).unwrap();

        assert!(value.get("mid").is_none());
        assert!(value["webEntities"][0].get("entityId").is_none());
        assert_eq!(value["webEntities"][0]["description"], "cat");
        assert_eq!(value["bestGuessLabels"][0]["label"], "cat");
    }

    #[test]
    fn test_entity_id_kept_outside_web_detection() {
        let builder = EnvelopeBuilder::new(StripPolicy::Always);
        let response =
            OperationResponse::Text(r#"{"textAnnotations":[{"entityId":"x","Topicality":0.5}]}"#.to_string());

        let envelope = builder.build(&resource(), &response).unwrap();
        let value: Value = serde_json::from_str(envelope.as_str()).unwrap();

        assert_eq!(value["textAnnotations"][0]["entityId"], "x");
        assert!(value["textAnnotations"][0].get("Topicality").is_none());
    }

    #[test]
    fn test_no_strip_keeps_identifiers() {
        let builder = EnvelopeBuilder::new(StripPolicy::Never);
        let response = OperationResponse::Labels(r#"[{"mid":"/m/01"}]"#.to_string());

        let envelope = builder.build(&resource(), &response).unwrap();
        assert!(envelope.as_str().contains("\"mid\": \"/m/01\""));
    }

    #[test]
    fn test_empty_label_array() {
        let builder = EnvelopeBuilder::default();
        let envelope = builder
            .build(&resource(), &OperationResponse::Landmarks("[]".to_string()))
            .unwrap();
        let value: Value = serde_json::from_str(envelope.as_str()).unwrap();
        assert_eq!(value[LABEL_ANNOTATIONS_FIELD], Value::Array(vec![]));
    }

    #[test]
    fn test_root_array_rejected_for_object_operations() {
        let builder = EnvelopeBuilder::default();
        let err = builder
            .build(&resource(), &OperationResponse::Faces("[]".to_string()))
            .unwrap_err();
        assert_eq!(err, EnvelopeError::RootNotObject { found: "array" });
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let builder = EnvelopeBuilder::default();
        let err = builder
            .build(
                &resource(),
                &OperationResponse::Properties(r#"{"dominantColors": {"colors": [}"#.to_string()),
            )
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::UnexpectedCharacter { .. }));

        let err = builder
            .build(&resource(), &OperationResponse::CropHints("   ".to_string()))
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::UnexpectedEnd { .. }));
    }
}
