use super::error::QueueError;
use super::MessageQueue;
use crate::envelope::Envelope;
use std::sync::Arc;
use tracing::debug;

/// Pushes one message per envelope onto a single named queue
#[derive(Clone)]
pub struct Publisher {
    queue: Arc<dyn MessageQueue>,
    queue_name: String,
}

impl Publisher {
    pub fn new(queue: Arc<dyn MessageQueue>, queue_name: impl Into<String>) -> Self {
        Self {
            queue,
            queue_name: queue_name.into(),
        }
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn backend(&self) -> &str {
        self.queue.name()
    }

    /// Ensures the queue exists, then appends the envelope as one message.
    /// "Already exists" counts as success; nothing is retried.
    pub async fn publish(&self, envelope: &Envelope) -> Result<(), QueueError> {
        let creation = self.queue.ensure_queue(&self.queue_name).await?;
        debug!(queue = %self.queue_name, ?creation, "Queue ready");

        self.queue
            .publish(&self.queue_name, envelope.as_str())
            .await?;

        debug!(
            queue = %self.queue_name,
            operation = %envelope.operation(),
            bytes = envelope.len(),
            "Published envelope"
        );
        Ok(())
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("backend", &self.queue.name())
            .field("queue_name", &self.queue_name)
            .finish()
    }
}
