//! Envelope building: raw operation payload in, header-enriched JSON out

pub mod builder;
mod error;
pub mod header;
pub mod reader;
pub mod strip;
pub mod writer;

pub use builder::{
    unescape_document_text, Envelope, EnvelopeBuilder, DOCUMENT_TEXT_FIELD,
    LABEL_ANNOTATIONS_FIELD,
};
pub use error::EnvelopeError;
pub use header::{EnvelopeHeader, HEADER_FIELDS};
pub use reader::{Token, TokenReader};
pub use strip::StripPolicy;
pub use writer::TokenWriter;
