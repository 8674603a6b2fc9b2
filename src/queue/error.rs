use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Failed to create queue '{queue}': {message}")]
    Create { queue: String, message: String },

    #[error("Failed to append message to queue '{queue}': {message}")]
    Append { queue: String, message: String },

    #[error("Queue connection error: {message}")]
    Connection { message: String },

    #[error("Message of {size} bytes exceeds the {limit} byte queue limit")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("Queue '{queue}' does not exist")]
    NotFound { queue: String },
}
