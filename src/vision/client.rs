use super::error::VisionError;
use super::image::ImageSource;
use super::operation::DetectionOperation;
use super::response::OperationResponse;
use async_trait::async_trait;

/// A vision analysis provider.
///
/// Implementations are shared across concurrent batches behind an `Arc` and
/// must not hold per-call state.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Runs exactly one concrete detection operation against `image`
    async fn annotate(
        &self,
        operation: DetectionOperation,
        image: &ImageSource,
    ) -> Result<OperationResponse, VisionError>;

    fn name(&self) -> &str;

    fn endpoint_info(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoClient;

    #[async_trait]
    impl VisionClient for EchoClient {
        async fn annotate(
            &self,
            operation: DetectionOperation,
            _image: &ImageSource,
        ) -> Result<OperationResponse, VisionError> {
            OperationResponse::new(operation, "{}").ok_or(VisionError::UnsupportedOperation {
                operation: operation.to_string(),
                client: self.name().to_string(),
            })
        }

        fn name(&self) -> &str {
            "EchoClient"
        }
    }

    #[tokio::test]
    async fn test_client_trait() {
        let client = EchoClient;
        let image = ImageSource::uri("gs://bucket/cat.jpg");

        let response = client
            .annotate(DetectionOperation::SafeSearch, &image)
            .await
            .unwrap();
        assert_eq!(response.operation(), DetectionOperation::SafeSearch);
        assert!(client
            .annotate(DetectionOperation::All, &image)
            .await
            .is_err());
        assert!(client.endpoint_info().is_none());
    }
}
