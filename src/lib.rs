//! visionpipe - fan-out of image analysis results onto a message queue
//!
//! Each requested detection operation is run against an image, its raw JSON
//! result is wrapped in an envelope whose header identifies the resource and
//! the operation, and every envelope is published as its own queue message.
//!
//! # Core Concepts
//!
//! - **Vision clients**: [`VisionClient`] implementations that run one
//!   detection operation and return its raw payload
//! - **Envelopes**: the payload with a header object prepended, built by
//!   [`EnvelopeBuilder`] in a single streaming pass
//! - **Queues**: [`MessageQueue`] backends; a queue is created on demand
//!   before each publish
//! - **Batches**: [`BatchOrchestrator`] runs the operations for one resource
//!   and isolates per-operation failures
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use visionpipe::{
//!     BatchOrchestrator, DetectionOperation, ImageSource, InMemoryQueue, LazyVisionClient,
//!     PipelineConfig, Publisher, ResourceReference, VisionPipeConfig,
//! };
//!
//! # async fn run() -> Result<(), visionpipe::PipelineError> {
//! let config = VisionPipeConfig::default();
//! let queue = Arc::new(InMemoryQueue::new());
//! let orchestrator = BatchOrchestrator::new(
//!     Arc::new(LazyVisionClient::new(config.clone())),
//!     Publisher::new(queue.clone(), config.queue_name.clone()),
//!     PipelineConfig::default(),
//! );
//!
//! let uri = "gs://bucket/cat.jpg";
//! let report = orchestrator
//!     .run_batch(&ResourceReference::from_uri(uri), &ImageSource::uri(uri), &[DetectionOperation::All])
//!     .await?;
//! println!("{} published, {} failed", report.published_count(), report.failed_count());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`vision`]: detection operations and vision service clients
//! - [`envelope`]: streaming JSON tokenizer and envelope construction
//! - [`queue`]: message queue backends and the publisher
//! - [`pipeline`]: per-resource batch orchestration
//! - [`resource`]: resource metadata and local file resolution

pub mod cli;
pub mod config;
pub mod envelope;
pub mod pipeline;
pub mod progress;
pub mod queue;
pub mod resource;
pub mod util;
pub mod vision;

pub use config::{ConfigError, VisionPipeConfig};
pub use envelope::{Envelope, EnvelopeBuilder, EnvelopeError, EnvelopeHeader, StripPolicy};
pub use pipeline::{
    BatchOrchestrator, BatchReport, ErrorKind, OperationError, PipelineConfig, PipelineError,
};
pub use progress::{LoggingHandler, NoOpHandler, ProgressEvent, ProgressHandler};
pub use queue::{AzureStorageQueue, InMemoryQueue, MessageQueue, Publisher, QueueError};
pub use resource::{LocalFileStore, ResourceReference, ResourceStore};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use vision::{
    DetectionOperation, GoogleVisionClient, ImageSource, LazyVisionClient, MockVisionClient,
    OperationResponse, VisionClient, VisionError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_visionpipe() {
        assert_eq!(NAME, "visionpipe");
    }
}
