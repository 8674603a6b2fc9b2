use super::client::VisionClient;
use super::error::VisionError;
use super::image::ImageSource;
use super::operation::DetectionOperation;
use super::response::OperationResponse;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

type Scripted = Result<OperationResponse, VisionError>;

/// Vision client that replays scripted results in order and records every call
pub struct MockVisionClient {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<DetectionOperation>>,
    name: String,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self::with_name("MockVision")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            name: name.into(),
        }
    }

    pub fn add_response(&self, response: Scripted) {
        self.lock_responses().push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = Scripted>) {
        let mut queue = self.lock_responses();
        for response in responses {
            queue.push_back(response);
        }
    }

    /// Queues a successful payload for `operation`
    pub fn add_payload(&self, operation: DetectionOperation, raw: impl Into<String>) {
        let response = OperationResponse::new(operation, raw).ok_or_else(|| {
            VisionError::UnsupportedOperation {
                operation: operation.to_string(),
                client: self.name.clone(),
            }
        });
        self.add_response(response);
    }

    pub fn add_error(&self, error: VisionError) {
        self.add_response(Err(error));
    }

    pub fn remaining_responses(&self) -> usize {
        self.lock_responses().len()
    }

    /// Operations requested so far, in call order
    pub fn calls(&self) -> Vec<DetectionOperation> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<Scripted>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionClient for MockVisionClient {
    async fn annotate(
        &self,
        operation: DetectionOperation,
        _image: &ImageSource,
    ) -> Result<OperationResponse, VisionError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(operation);

        self.lock_responses()
            .pop_front()
            .unwrap_or_else(|| {
                Err(VisionError::InvalidResponse {
                    message: "MockVisionClient: No more responses in queue".to_string(),
                })
            })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn endpoint_info(&self) -> Option<String> {
        Some("mock://vision".to_string())
    }
}

impl std::fmt::Debug for MockVisionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockVisionClient")
            .field("name", &self.name)
            .field("remaining_responses", &self.remaining_responses())
            .finish()
    }
}
