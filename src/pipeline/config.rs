use crate::envelope::StripPolicy;
use crate::vision::DetectionOperation;

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Explicit strip policy; `None` picks one from the requested operations
    pub strip: Option<StripPolicy>,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strip(mut self, strip: StripPolicy) -> Self {
        self.strip = Some(strip);
        self
    }

    pub fn with_strip_override(mut self, strip: Option<StripPolicy>) -> Self {
        self.strip = strip;
        self
    }

    /// A batch that asks for `All` strips everything except document text;
    /// any other request keeps payloads untouched.
    pub fn strip_policy_for(&self, requested: &[DetectionOperation]) -> StripPolicy {
        match self.strip {
            Some(policy) => policy,
            None if requested.iter().any(DetectionOperation::is_composite) => {
                StripPolicy::ExceptDocumentText
            }
            None => StripPolicy::Never,
        }
    }
}
