use super::error::{OperationError, PipelineError};
use crate::resource::ResourceReference;
use crate::vision::{DetectionOperation, ImageSource, OperationResponse, VisionClient, VisionError};
use std::sync::Arc;
use tracing::{debug, error};

/// Outcome of one operation against one resource
pub type OperationResult = Result<OperationResponse, OperationError>;

/// Calls one detection operation exactly once. No retry.
#[derive(Clone)]
pub struct OperationInvoker {
    client: Arc<dyn VisionClient>,
}

impl OperationInvoker {
    pub fn new(client: Arc<dyn VisionClient>) -> Self {
        Self { client }
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// The outer error is batch-fatal; the inner result belongs to this
    /// operation alone.
    pub async fn invoke(
        &self,
        resource: &ResourceReference,
        image: &ImageSource,
        operation: DetectionOperation,
    ) -> Result<OperationResult, PipelineError> {
        if operation.is_composite() {
            return Ok(Err(OperationError::ServiceInvocation {
                operation,
                uri: resource.uri().to_string(),
                message: "composite operation cannot be invoked directly".to_string(),
            }));
        }

        debug!(uri = %resource.uri(), operation = %operation, client = self.client.name(), "Invoking");

        match self.client.annotate(operation, image).await {
            Ok(response) => Ok(Ok(response)),
            Err(e) if e.is_fatal() => {
                error!(uri = %resource.uri(), "Vision client unavailable: {}", e);
                Err(PipelineError::ClientInitialization {
                    message: fatal_message(e),
                })
            }
            Err(e) => Ok(Err(OperationError::ServiceInvocation {
                operation,
                uri: resource.uri().to_string(),
                message: e.to_string(),
            })),
        }
    }
}

fn fatal_message(error: VisionError) -> String {
    match error {
        VisionError::ClientInitialization { message } => message,
        other => other.to_string(),
    }
}

impl std::fmt::Debug for OperationInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationInvoker")
            .field("client", &self.client.name())
            .finish()
    }
}
