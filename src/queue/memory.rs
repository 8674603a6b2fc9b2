use super::error::QueueError;
use super::{MessageQueue, QueueCreation};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    queues: HashMap<String, Vec<String>>,
    ensure_calls: usize,
    create_failures: VecDeque<QueueError>,
    publish_failures: VecDeque<QueueError>,
}

/// Process-local queue used for dry runs and tests.
///
/// Records every message and creation call. Failures can be scripted for
/// the next `ensure_queue` or `publish` calls.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    state: Mutex<State>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue that already exists before the first `ensure_queue`
    pub fn with_queue(queue: &str) -> Self {
        let this = Self::new();
        this.lock().queues.insert(queue.to_string(), Vec::new());
        this
    }

    pub fn fail_next_create(&self, error: QueueError) {
        self.lock().create_failures.push_back(error);
    }

    pub fn fail_next_publish(&self, error: QueueError) {
        self.lock().publish_failures.push_back(error);
    }

    pub fn messages(&self, queue: &str) -> Vec<String> {
        self.lock().queues.get(queue).cloned().unwrap_or_default()
    }

    pub fn message_count(&self, queue: &str) -> usize {
        self.lock().queues.get(queue).map_or(0, Vec::len)
    }

    pub fn ensure_calls(&self) -> usize {
        self.lock().ensure_calls
    }

    pub fn queue_exists(&self, queue: &str) -> bool {
        self.lock().queues.contains_key(queue)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn ensure_queue(&self, queue: &str) -> Result<QueueCreation, QueueError> {
        let mut state = self.lock();
        state.ensure_calls += 1;
        if let Some(error) = state.create_failures.pop_front() {
            return Err(error);
        }
        if state.queues.contains_key(queue) {
            return Ok(QueueCreation::AlreadyExists);
        }
        state.queues.insert(queue.to_string(), Vec::new());
        Ok(QueueCreation::Created)
    }

    async fn publish(&self, queue: &str, message: &str) -> Result<(), QueueError> {
        let mut state = self.lock();
        if let Some(error) = state.publish_failures.pop_front() {
            return Err(error);
        }
        match state.queues.get_mut(queue) {
            Some(messages) => {
                messages.push(message.to_string());
                Ok(())
            }
            None => Err(QueueError::NotFound {
                queue: queue.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
