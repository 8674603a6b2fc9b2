use thiserror::Error;

/// Errors raised by vision service clients
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisionError {
    #[error("Vision API error{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// The request succeeded but the service reported a failure for this image
    #[error("Image annotation failed (code {code}): {message}")]
    Image { message: String, code: i32 },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Invalid response from vision service: {message}")]
    InvalidResponse { message: String },

    /// The client could not be constructed; nothing can be analysed
    #[error("Vision client initialization failed: {message}")]
    ClientInitialization { message: String },

    #[error("Operation {operation} is not supported by {client}")]
    UnsupportedOperation { operation: String, client: String },
}

impl VisionError {
    /// Whether the error invalidates every remaining operation of a batch
    pub fn is_fatal(&self) -> bool {
        matches!(self, VisionError::ClientInitialization { .. })
    }

    /// The request URL carries the API key, so it never reaches the message
    pub(crate) fn from_reqwest(error: reqwest::Error, timeout_secs: u64) -> Self {
        let error = error.without_url();
        if error.is_timeout() {
            VisionError::Timeout {
                seconds: timeout_secs,
            }
        } else if error.is_connect() {
            VisionError::Network {
                message: format!("Connection failed: {}", error),
            }
        } else {
            VisionError::Network {
                message: format!("Request failed: {}", error),
            }
        }
    }
}
