use super::DetectionOperation;

/// Raw payload returned by one detection operation, tagged by operation.
///
/// Label-style operations carry bare array text, document text carries the
/// plain body, everything else carries object text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResponse {
    Text(String),
    Labels(String),
    Landmarks(String),
    Logos(String),
    WebDetection(String),
    DocumentText(String),
    Faces(String),
    SafeSearch(String),
    Properties(String),
    CropHints(String),
}

impl OperationResponse {
    /// Tags `raw` with `operation`. Returns `None` for the composite operation.
    pub fn new(operation: DetectionOperation, raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let response = match operation {
            DetectionOperation::Text => Self::Text(raw),
            DetectionOperation::Labels => Self::Labels(raw),
            DetectionOperation::Landmarks => Self::Landmarks(raw),
            DetectionOperation::Logos => Self::Logos(raw),
            DetectionOperation::WebDetection => Self::WebDetection(raw),
            DetectionOperation::DocumentText => Self::DocumentText(raw),
            DetectionOperation::Faces => Self::Faces(raw),
            DetectionOperation::SafeSearch => Self::SafeSearch(raw),
            DetectionOperation::Properties => Self::Properties(raw),
            DetectionOperation::CropHints => Self::CropHints(raw),
            DetectionOperation::All => return None,
        };
        Some(response)
    }

    pub fn operation(&self) -> DetectionOperation {
        match self {
            Self::Text(_) => DetectionOperation::Text,
            Self::Labels(_) => DetectionOperation::Labels,
            Self::Landmarks(_) => DetectionOperation::Landmarks,
            Self::Logos(_) => DetectionOperation::Logos,
            Self::WebDetection(_) => DetectionOperation::WebDetection,
            Self::DocumentText(_) => DetectionOperation::DocumentText,
            Self::Faces(_) => DetectionOperation::Faces,
            Self::SafeSearch(_) => DetectionOperation::SafeSearch,
            Self::Properties(_) => DetectionOperation::Properties,
            Self::CropHints(_) => DetectionOperation::CropHints,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Self::Text(raw)
            | Self::Labels(raw)
            | Self::Landmarks(raw)
            | Self::Logos(raw)
            | Self::WebDetection(raw)
            | Self::DocumentText(raw)
            | Self::Faces(raw)
            | Self::SafeSearch(raw)
            | Self::Properties(raw)
            | Self::CropHints(raw) => raw,
        }
    }
}
