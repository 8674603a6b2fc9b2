use super::config::PipelineConfig;
use super::error::{OperationError, PipelineError};
use super::invoker::OperationInvoker;
use super::report::BatchReport;
use crate::envelope::{Envelope, EnvelopeBuilder};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::queue::Publisher;
use crate::resource::ResourceReference;
use crate::vision::{expand_operations, DetectionOperation, ImageSource, VisionClient};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Runs a set of detection operations against one resource, one at a time,
/// publishing an envelope for each success.
pub struct BatchOrchestrator {
    invoker: OperationInvoker,
    publisher: Publisher,
    config: PipelineConfig,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl BatchOrchestrator {
    pub fn new(client: Arc<dyn VisionClient>, publisher: Publisher, config: PipelineConfig) -> Self {
        Self {
            invoker: OperationInvoker::new(client),
            publisher,
            config,
            progress_handler: None,
        }
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Only [`PipelineError`] escapes; every operation-scoped failure is
    /// logged and recorded in the report.
    pub async fn run_batch(
        &self,
        resource: &ResourceReference,
        image: &ImageSource,
        operations: &[DetectionOperation],
    ) -> Result<BatchReport, PipelineError> {
        let start = Instant::now();
        let expanded = expand_operations(operations);
        let builder = EnvelopeBuilder::new(self.config.strip_policy_for(operations));
        let mut report = BatchReport::new(resource.uri(), resource.uid(), self.publisher.queue_name());

        info!(
            uri = %resource.uri(),
            operations = expanded.len(),
            client = self.invoker.client_name(),
            strip = %builder.strip_policy(),
            "Starting batch"
        );
        self.emit(ProgressEvent::BatchStarted {
            uri: resource.uri().to_string(),
            operations: expanded.len(),
        });

        for (index, &operation) in expanded.iter().enumerate() {
            self.emit(ProgressEvent::OperationStarted {
                uri: resource.uri().to_string(),
                operation,
                index: index + 1,
                total: expanded.len(),
            });

            let op_start = Instant::now();
            let outcome = match self.process(&builder, resource, image, operation).await {
                Ok(outcome) => outcome,
                Err(fatal) => {
                    error!(uri = %resource.uri(), operation = %operation, "Batch aborted: {}", fatal);
                    self.emit(ProgressEvent::BatchAborted {
                        uri: resource.uri().to_string(),
                        error: fatal.to_string(),
                    });
                    return Err(fatal);
                }
            };

            match outcome {
                Ok(envelope) => {
                    report.record_published(operation, envelope.len());
                    self.emit(ProgressEvent::OperationPublished {
                        uri: resource.uri().to_string(),
                        operation,
                        bytes: envelope.len(),
                        duration: op_start.elapsed(),
                    });
                }
                Err(e) => {
                    error!(
                        uri = %resource.uri(),
                        operation = %operation,
                        kind = %e.kind(),
                        "Operation failed: {}",
                        e
                    );
                    report.record_failure(&e);
                    self.emit(ProgressEvent::OperationFailed {
                        uri: resource.uri().to_string(),
                        operation,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            uri = %resource.uri(),
            published = report.published_count(),
            failed = report.failed_count(),
            "Batch complete"
        );
        self.emit(ProgressEvent::BatchCompleted {
            uri: resource.uri().to_string(),
            succeeded: report.published_count(),
            failed: report.failed_count(),
            total_time: start.elapsed(),
        });

        Ok(report)
    }

    /// invoke, build, publish
    async fn process(
        &self,
        builder: &EnvelopeBuilder,
        resource: &ResourceReference,
        image: &ImageSource,
        operation: DetectionOperation,
    ) -> Result<Result<Envelope, OperationError>, PipelineError> {
        let response = match self.invoker.invoke(resource, image, operation).await? {
            Ok(response) => response,
            Err(e) => return Ok(Err(e)),
        };

        let envelope = match builder.build(resource, &response) {
            Ok(envelope) => envelope,
            Err(source) => {
                return Ok(Err(OperationError::MalformedResponse { operation, source }));
            }
        };

        if let Err(source) = self.publisher.publish(&envelope).await {
            return Ok(Err(OperationError::QueuePublish { operation, source }));
        }

        Ok(Ok(envelope))
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }
}
