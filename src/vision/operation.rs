use std::str::FromStr;

crate::define_operation_enum! {
    /// Detection operations offered by the vision service
    DetectionOperation {
        Faces => "DETECT_FACES" : "faces" | "face",
        Landmarks => "DETECT_LANDMARKS" : "landmarks" | "landmark",
        Labels => "DETECT_LABELS" : "labels" | "label",
        SafeSearch => "DETECT_SAFESEARCH" : "safe-search" | "safesearch",
        Properties => "DETECT_PROPERTIES" : "properties" | "props",
        Text => "DETECT_TEXT" : "text",
        Logos => "DETECT_LOGOS" : "logos" | "logo",
        CropHints => "DETECT_CROPHINT" : "crop-hints" | "crophints" | "crop",
        WebDetection => "DETECT_WEB" : "web",
        DocumentText => "DETECT_DOCTEXT" : "doc-text" | "doctext" | "document-text",
        /// Composite, see [`DetectionOperation::ALL_EXPANSION`]
        All => "DETECT_ALL" : "all",
    }
}

impl DetectionOperation {
    /// What `All` runs, in order. Logos is not part of the composite.
    pub const ALL_EXPANSION: [DetectionOperation; 5] = [
        DetectionOperation::Text,
        DetectionOperation::Labels,
        DetectionOperation::DocumentText,
        DetectionOperation::Landmarks,
        DetectionOperation::WebDetection,
    ];

    pub fn is_composite(&self) -> bool {
        matches!(self, DetectionOperation::All)
    }

    /// Operations whose native response is a bare annotation array
    pub fn returns_bare_array(&self) -> bool {
        matches!(
            self,
            DetectionOperation::Labels | DetectionOperation::Landmarks | DetectionOperation::Logos
        )
    }

    /// Feature type requested from the remote service; `None` for the composite
    pub fn feature_type(&self) -> Option<&'static str> {
        let feature = match self {
            DetectionOperation::Faces => "FACE_DETECTION",
            DetectionOperation::Landmarks => "LANDMARK_DETECTION",
            DetectionOperation::Labels => "LABEL_DETECTION",
            DetectionOperation::SafeSearch => "SAFE_SEARCH_DETECTION",
            DetectionOperation::Properties => "IMAGE_PROPERTIES",
            DetectionOperation::Text => "TEXT_DETECTION",
            DetectionOperation::Logos => "LOGO_DETECTION",
            DetectionOperation::CropHints => "CROP_HINTS",
            DetectionOperation::WebDetection => "WEB_DETECTION",
            DetectionOperation::DocumentText => "DOCUMENT_TEXT_DETECTION",
            DetectionOperation::All => return None,
        };
        Some(feature)
    }

    pub fn expand(&self) -> &'static [DetectionOperation] {
        match self {
            DetectionOperation::All => &Self::ALL_EXPANSION,
            DetectionOperation::Faces => &[DetectionOperation::Faces],
            DetectionOperation::Landmarks => &[DetectionOperation::Landmarks],
            DetectionOperation::Labels => &[DetectionOperation::Labels],
            DetectionOperation::SafeSearch => &[DetectionOperation::SafeSearch],
            DetectionOperation::Properties => &[DetectionOperation::Properties],
            DetectionOperation::Text => &[DetectionOperation::Text],
            DetectionOperation::Logos => &[DetectionOperation::Logos],
            DetectionOperation::CropHints => &[DetectionOperation::CropHints],
            DetectionOperation::WebDetection => &[DetectionOperation::WebDetection],
            DetectionOperation::DocumentText => &[DetectionOperation::DocumentText],
        }
    }

    /// Every non-composite operation
    pub fn concrete() -> impl Iterator<Item = DetectionOperation> {
        Self::all_variants()
            .iter()
            .copied()
            .filter(|op| !op.is_composite())
    }
}

impl FromStr for DetectionOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::from_name(trimmed)
            .or_else(|| Self::from_name(&trimmed.to_ascii_uppercase()))
            .or_else(|| Self::from_name(&trimmed.to_ascii_lowercase()))
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::all_variants().iter().map(|op| op.cli_name()).collect();
                format!(
                    "Unknown detection operation '{}'. Valid options: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// Expands composites in place, keeping request order and duplicates
pub fn expand_operations(operations: &[DetectionOperation]) -> Vec<DetectionOperation> {
    operations
        .iter()
        .flat_map(|op| op.expand().iter().copied())
        .collect()
}
