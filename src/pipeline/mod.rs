pub mod config;
mod error;
pub mod invoker;
pub mod orchestrator;
mod report;

pub use config::PipelineConfig;
pub use error::{ErrorKind, OperationError, PipelineError};
pub use invoker::{OperationInvoker, OperationResult};
pub use orchestrator::BatchOrchestrator;
pub use report::{BatchReport, FailedOperation, PublishedOperation};
