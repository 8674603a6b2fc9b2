use super::client::VisionClient;
use super::error::VisionError;
use super::google::GoogleVisionClient;
use super::image::ImageSource;
use super::operation::DetectionOperation;
use super::response::OperationResponse;
use crate::config::VisionPipeConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

type ClientFactory = Box<dyn Fn() -> Result<Arc<dyn VisionClient>, VisionError> + Send + Sync>;

/// Defers client construction until the first annotation.
///
/// Concurrent first callers wait on the same initialization. A failed
/// initialization is not cached, so the next call tries again.
pub struct LazyVisionClient {
    client: OnceCell<Arc<dyn VisionClient>>,
    factory: ClientFactory,
}

impl LazyVisionClient {
    pub fn new(config: VisionPipeConfig) -> Self {
        debug!("Creating LazyVisionClient - client construction deferred until first annotate() call");
        Self::with_factory(move || {
            GoogleVisionClient::from_config(&config).map(|c| Arc::new(c) as Arc<dyn VisionClient>)
        })
    }

    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn VisionClient>, VisionError> + Send + Sync + 'static,
    {
        Self {
            client: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.client.initialized()
    }

    async fn ensure_initialized(&self) -> Result<&Arc<dyn VisionClient>, VisionError> {
        self.client
            .get_or_try_init(|| async {
                debug!("Lazy initialization triggered - constructing vision client now");
                let client = (self.factory)()?;
                debug!("Vision client ready: {}", client.name());
                Ok(client)
            })
            .await
    }
}

#[async_trait]
impl VisionClient for LazyVisionClient {
    async fn annotate(
        &self,
        operation: DetectionOperation,
        image: &ImageSource,
    ) -> Result<OperationResponse, VisionError> {
        let client = self.ensure_initialized().await?;
        client.annotate(operation, image).await
    }

    fn name(&self) -> &str {
        "LazyVisionClient"
    }

    fn endpoint_info(&self) -> Option<String> {
        self.client.get().and_then(|c| c.endpoint_info())
    }
}
