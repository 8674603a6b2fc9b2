use crate::vision::DetectionOperation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Property names removed from every payload when stripping is active
const STRIPPED_PROPERTIES: [&str; 2] = ["mid", "Topicality"];

/// Removed from web detection payloads only
const STRIPPED_WEB_PROPERTY: &str = "entityId";

/// Which operations have identifier fields stripped from their payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StripPolicy {
    /// Keep payloads untouched
    #[default]
    Never,
    /// Strip every operation
    Always,
    /// Strip every operation except document text
    ExceptDocumentText,
}

impl StripPolicy {
    pub fn applies_to(&self, operation: DetectionOperation) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::ExceptDocumentText => operation != DetectionOperation::DocumentText,
        }
    }
}

impl fmt::Display for StripPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Never => "never",
            Self::Always => "always",
            Self::ExceptDocumentText => "except-document-text",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for StripPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "never" | "false" | "no" => Ok(Self::Never),
            "always" | "true" | "yes" => Ok(Self::Always),
            "except-document-text" | "except-doctext" => Ok(Self::ExceptDocumentText),
            other => Err(format!(
                "Invalid strip policy '{}'. Valid options: never, always, except-document-text",
                other
            )),
        }
    }
}

/// Whether `name` is dropped from `operation`'s payload while stripping
pub fn is_stripped_property(name: &str, operation: DetectionOperation) -> bool {
    STRIPPED_PROPERTIES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(name))
        || (operation == DetectionOperation::WebDetection
            && STRIPPED_WEB_PROPERTY.eq_ignore_ascii_case(name))
}
