//! Message queue backends and the envelope publisher

mod azure;
mod connection;
mod error;
mod memory;
mod publisher;

pub use azure::{xml_escape, AzureStorageQueue};
pub use connection::ConnectionString;
pub use error::QueueError;
pub use memory::InMemoryQueue;
pub use publisher::Publisher;

use async_trait::async_trait;

/// Largest message body a storage queue accepts
pub const MESSAGE_SIZE_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueCreation {
    Created,
    AlreadyExists,
}

#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Creates `queue` if absent. An existing queue is not an error.
    async fn ensure_queue(&self, queue: &str) -> Result<QueueCreation, QueueError>;

    async fn publish(&self, queue: &str, message: &str) -> Result<(), QueueError>;

    fn name(&self) -> &str;
}

/// Storage queue naming rules: 3-63 characters, lowercase letters, digits
/// and single hyphens, starting and ending with a letter or digit.
pub fn validate_queue_name(name: &str) -> Result<(), String> {
    if !(3..=63).contains(&name.len()) {
        return Err(format!(
            "queue name '{}' must be 3-63 characters long",
            name
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "queue name '{}' may only contain lowercase letters, digits and hyphens",
            name
        ));
    }
    if name.starts_with('-') || name.ends_with('-') || name.contains("--") {
        return Err(format!(
            "queue name '{}' must not start or end with a hyphen or contain consecutive hyphens",
            name
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_names() {
        assert!(validate_queue_name("visionqueue").is_ok());
        assert!(validate_queue_name("vision-queue-2").is_ok());
        assert!(validate_queue_name("vq").is_err());
        assert!(validate_queue_name("VisionQueue").is_err());
        assert!(validate_queue_name("-vision").is_err());
        assert!(validate_queue_name("vision--queue").is_err());
        assert!(validate_queue_name(&"a".repeat(64)).is_err());
    }
}
