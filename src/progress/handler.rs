//! Progress handler trait and events

use crate::vision::DetectionOperation;
use std::time::Duration;

/// Events emitted while a batch runs
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Batch started for a resource
    BatchStarted { uri: String, operations: usize },

    /// Operation invocation started
    OperationStarted {
        uri: String,
        operation: DetectionOperation,
        index: usize,
        total: usize,
    },

    /// Envelope built and published
    OperationPublished {
        uri: String,
        operation: DetectionOperation,
        bytes: usize,
        duration: Duration,
    },

    /// Operation failed; the batch continues
    OperationFailed {
        uri: String,
        operation: DetectionOperation,
        error: String,
    },

    /// Every operation has been attempted
    BatchCompleted {
        uri: String,
        succeeded: usize,
        failed: usize,
        total_time: Duration,
    },

    /// The batch stopped before attempting every operation
    BatchAborted { uri: String, error: String },
}

/// Trait for handling progress events during a batch
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
