use super::writer::TokenWriter;
use crate::resource::ResourceReference;
use crate::vision::DetectionOperation;
use chrono::{DateTime, SecondsFormat, Utc};

pub const FIELD_URI: &str = "BLOBURI";
pub const FIELD_UID: &str = "BLOBUID";
pub const FIELD_SUBMITTED: &str = "BLOBDateSubmitted";
pub const FIELD_PROCESSED: &str = "APIDateProcessed";
pub const FIELD_OPERATION: &str = "APIFunction";

/// Header fields in the order they open every envelope
pub const HEADER_FIELDS: [&str; 5] = [
    FIELD_URI,
    FIELD_UID,
    FIELD_SUBMITTED,
    FIELD_PROCESSED,
    FIELD_OPERATION,
];

/// Provenance metadata injected at the top of every envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub uri: String,
    pub uid: String,
    pub submitted_at: DateTime<Utc>,
    pub processed_at: DateTime<Utc>,
    pub operation: DetectionOperation,
}

impl EnvelopeHeader {
    pub fn new(resource: &ResourceReference, operation: DetectionOperation) -> Self {
        Self {
            uri: resource.uri().to_string(),
            uid: resource.uid().to_string(),
            submitted_at: resource.submitted_at(),
            processed_at: resource.processed_at(),
            operation,
        }
    }

    /// Writes the five header properties into the currently open object
    pub fn write_to(&self, writer: &mut TokenWriter) {
        writer.string_property(FIELD_URI, Some(&self.uri));
        writer.string_property(FIELD_UID, Some(&self.uid));
        writer.string_property(FIELD_SUBMITTED, Some(&format_timestamp(self.submitted_at)));
        writer.string_property(FIELD_PROCESSED, Some(&format_timestamp(self.processed_at)));
        writer.string_property(FIELD_OPERATION, Some(self.operation.name()));
    }
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}
