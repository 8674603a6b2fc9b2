use super::commands::{AnalyzeArgs, ConfigArgs, OperationsArgs};
use super::output::{AnalyzeSummary, OutputFormatter, ResourceFailure};
use crate::config::VisionPipeConfig;
use crate::pipeline::{BatchOrchestrator, BatchReport, PipelineConfig};
use crate::progress::{LoggingHandler, NoOpHandler, ProgressHandler};
use crate::queue::{InMemoryQueue, MessageQueue, Publisher};
use crate::resource::{LocalFileStore, ResourceReference, ResourceStore};
use crate::vision::{ImageSource, LazyVisionClient, VisionClient};
use anyhow::{Context, Result};
use futures_util::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

const REMOTE_SCHEMES: [&str; 3] = ["http://", "https://", "gs://"];

pub async fn handle_analyze(args: &AnalyzeArgs, quiet: bool) -> i32 {
    let mut config = VisionPipeConfig::default();
    if let Some(queue) = &args.queue {
        config.queue_name = queue.clone();
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(strip) = args.strip_override() {
        config.strip = Some(strip);
    }

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        return 1;
    }
    debug!("Configuration: {:?}", config);

    let memory_queue = args.dry_run.then(|| Arc::new(InMemoryQueue::new()));
    let queue: Arc<dyn MessageQueue> = match &memory_queue {
        Some(memory) => memory.clone() as Arc<dyn MessageQueue>,
        None => match config.create_queue() {
            Ok(queue) => Arc::new(queue),
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                return 1;
            }
        },
    };

    let client: Arc<dyn VisionClient> = Arc::new(LazyVisionClient::new(config.clone()));
    let progress: Arc<dyn ProgressHandler> = if quiet {
        Arc::new(NoOpHandler)
    } else {
        Arc::new(LoggingHandler)
    };
    let orchestrator = BatchOrchestrator::new(
        client.clone(),
        Publisher::new(queue, config.queue_name.clone()),
        PipelineConfig::new().with_strip_override(config.strip),
    )
    .with_progress(progress);

    info!(
        resources = args.resources.len(),
        queue = %config.queue_name,
        dry_run = args.dry_run,
        "Analyzing"
    );

    let outcomes = join_all(
        args.resources
            .iter()
            .map(|resource| analyze_resource(&orchestrator, args, resource)),
    )
    .await;

    if let Some(endpoint) = client.endpoint_info() {
        debug!(client = client.name(), endpoint = %endpoint, "Vision client used");
    }

    let mut summary = AnalyzeSummary::default();
    for (resource, outcome) in args.resources.iter().zip(outcomes) {
        match outcome {
            Ok(report) => summary.reports.push(report),
            Err(e) => {
                error!(resource = %resource, "Resource failed: {:#}", e);
                summary.failures.push(ResourceFailure {
                    resource: resource.clone(),
                    error: format!("{:#}", e),
                });
            }
        }
    }
    if let Some(memory) = &memory_queue {
        summary.envelopes = memory.messages(&config.queue_name);
    }

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_analysis(&summary) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Failed to format output: {:#}", e);
            return 1;
        }
    }

    if summary.has_failures() {
        1
    } else {
        0
    }
}

async fn analyze_resource(
    orchestrator: &BatchOrchestrator,
    args: &AnalyzeArgs,
    resource: &str,
) -> Result<BatchReport> {
    let (reference, image) = load_resource(resource).await?;
    let report = orchestrator
        .run_batch(&reference, &image, &args.operations)
        .await
        .with_context(|| format!("Batch aborted for {}", resource))?;
    Ok(report)
}

/// Remote URIs are handed to the service as-is; anything else is read from disk
async fn load_resource(resource: &str) -> Result<(ResourceReference, ImageSource)> {
    if REMOTE_SCHEMES.iter().any(|scheme| resource.starts_with(scheme)) {
        return Ok((ResourceReference::from_uri(resource), ImageSource::uri(resource)));
    }

    let path = Path::new(resource);
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Not a file path: {}", resource))?;
    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let store = LocalFileStore::new(root);
    let (reference, bytes) = store
        .load(file_name)
        .await
        .with_context(|| format!("Failed to read {}", resource))?;

    Ok((reference, ImageSource::bytes(bytes)))
}

pub async fn handle_operations(args: &OperationsArgs) -> i32 {
    match OutputFormatter::new(args.format.into()).format_operations() {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Failed to format output: {:#}", e);
            1
        }
    }
}

pub async fn handle_config(args: &ConfigArgs) -> i32 {
    let config = VisionPipeConfig::default();
    let formatter = OutputFormatter::new(args.format.into());

    let output = match formatter.format_config(&config) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Failed to format output: {:#}", e);
            return 1;
        }
    };
    println!("{}", output);

    match config.validate() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_remote_resource() {
        let (reference, image) = load_resource("gs://bucket/cat.jpg").await.unwrap();
        assert_eq!(reference.uri(), "gs://bucket/cat.jpg");
        assert_eq!(reference.name(), "cat.jpg");
        assert_eq!(image, ImageSource::uri("gs://bucket/cat.jpg"));
    }

    #[tokio::test]
    async fn test_load_local_resource() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("receipt.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"\x89PNG")
            .unwrap();

        let (reference, image) = load_resource(path.to_str().unwrap()).await.unwrap();
        assert!(reference.uri().starts_with("file://"));
        assert_eq!(reference.name(), "receipt.png");
        assert_eq!(image, ImageSource::bytes(b"\x89PNG".to_vec()));
    }

    #[tokio::test]
    async fn test_load_missing_local_resource() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.png");
        let err = load_resource(path.to_str().unwrap()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("missing.png"));
    }
}
