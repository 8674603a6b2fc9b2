use super::error::{ErrorKind, OperationError};
use crate::vision::DetectionOperation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedOperation {
    pub operation: DetectionOperation,
    /// Size of the published envelope
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedOperation {
    pub operation: DetectionOperation,
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&OperationError> for FailedOperation {
    fn from(error: &OperationError) -> Self {
        Self {
            operation: error.operation(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// What happened to every operation of one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub uri: String,
    pub uid: String,
    pub queue: String,
    pub succeeded: Vec<PublishedOperation>,
    pub failed: Vec<FailedOperation>,
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn new(uri: impl Into<String>, uid: impl Into<String>, queue: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            uid: uid.into(),
            queue: queue.into(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn record_published(&mut self, operation: DetectionOperation, bytes: usize) {
        self.succeeded.push(PublishedOperation { operation, bytes });
    }

    pub fn record_failure(&mut self, error: &OperationError) {
        self.failed.push(FailedOperation::from(error));
    }

    pub fn published_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}
