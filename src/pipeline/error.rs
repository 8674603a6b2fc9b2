use crate::envelope::EnvelopeError;
use crate::queue::QueueError;
use crate::vision::DetectionOperation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ServiceInvocation,
    MalformedResponse,
    QueuePublish,
    ClientInitialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::ServiceInvocation => "service_invocation",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::QueuePublish => "queue_publish",
            ErrorKind::ClientInitialization => "client_initialization",
        };
        write!(f, "{}", s)
    }
}

/// Failure scoped to one operation of a batch. Recorded, never propagated.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("{operation} failed for {uri}: {message}")]
    ServiceInvocation {
        operation: DetectionOperation,
        uri: String,
        message: String,
    },

    #[error("{operation} returned a malformed response: {source}")]
    MalformedResponse {
        operation: DetectionOperation,
        source: EnvelopeError,
    },

    #[error("{operation} envelope could not be published: {source}")]
    QueuePublish {
        operation: DetectionOperation,
        source: QueueError,
    },
}

impl OperationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OperationError::ServiceInvocation { .. } => ErrorKind::ServiceInvocation,
            OperationError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            OperationError::QueuePublish { .. } => ErrorKind::QueuePublish,
        }
    }

    pub fn operation(&self) -> DetectionOperation {
        match self {
            OperationError::ServiceInvocation { operation, .. }
            | OperationError::MalformedResponse { operation, .. }
            | OperationError::QueuePublish { operation, .. } => *operation,
        }
    }
}

/// Failure that ends the whole batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Vision client initialization failed: {message}")]
    ClientInitialization { message: String },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::ClientInitialization { .. } => ErrorKind::ClientInitialization,
        }
    }
}
