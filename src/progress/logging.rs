//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::BatchStarted { uri, operations } => {
                info!(uri = %uri, operations, "Starting analysis batch");
            }
            ProgressEvent::OperationStarted {
                uri,
                operation,
                index,
                total,
            } => {
                debug!(
                    uri = %uri,
                    operation = %operation,
                    progress = format!("{}/{}", index, total),
                    "Invoking operation"
                );
            }
            ProgressEvent::OperationPublished {
                uri,
                operation,
                bytes,
                duration,
            } => {
                info!(
                    uri = %uri,
                    operation = %operation,
                    bytes,
                    duration_ms = duration.as_millis(),
                    "Envelope published"
                );
            }
            ProgressEvent::OperationFailed {
                uri,
                operation,
                error,
            } => {
                warn!(uri = %uri, operation = %operation, error = %error, "Operation failed");
            }
            ProgressEvent::BatchCompleted {
                uri,
                succeeded,
                failed,
                total_time,
            } => {
                if *failed > 0 {
                    warn!(
                        uri = %uri,
                        succeeded,
                        failed,
                        total_time_ms = total_time.as_millis(),
                        "Batch complete with failures"
                    );
                } else {
                    info!(
                        uri = %uri,
                        succeeded,
                        total_time_ms = total_time.as_millis(),
                        "Batch complete"
                    );
                }
            }
            ProgressEvent::BatchAborted { uri, error } => {
                warn!(uri = %uri, error = %error, "Batch aborted");
            }
        }
    }
}
