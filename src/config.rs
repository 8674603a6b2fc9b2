//! Configuration management for visionpipe
//!
//! Settings are loaded from environment variables with defaults.
//!
//! # Environment Variables
//!
//! - `VISIONPIPE_GOOGLE_API_KEY` (or `GoogleAPIKey`): vision API key - **required** to analyse
//! - `VISIONPIPE_VISION_ENDPOINT`: vision API base URL - default: "https://vision.googleapis.com"
//! - `VISIONPIPE_QUEUE_CONNECTION` (or `MSGQ_CONSTR_VISION_ANALYSER`): storage connection string
//! - `VISIONPIPE_QUEUE_NAME` (or `MSGQ_NAME_VISION_ANALYSER`): target queue - default: "visionqueue"
//! - `VISIONPIPE_REQUEST_TIMEOUT`: timeout in seconds - default: "30"
//! - `VISIONPIPE_LANGUAGE_HINTS`: comma separated OCR language hints - default: none
//! - `VISIONPIPE_STRIP`: strip policy override (true|false|except-document-text) - default: unset
//! - `VISIONPIPE_LOG_LEVEL`: logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use visionpipe::VisionPipeConfig;
//!
//! let config = VisionPipeConfig::default();
//! config.validate().expect("Invalid configuration");
//! ```

use crate::envelope::StripPolicy;
use crate::queue::{validate_queue_name, AzureStorageQueue, QueueError};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_VISION_ENDPOINT: &str = crate::vision::google::DEFAULT_ENDPOINT;
pub const DEFAULT_QUEUE_NAME: &str = "visionqueue";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Queue initialization failed: {0}")]
    QueueInitError(#[from] QueueError),
}

#[derive(Clone)]
pub struct VisionPipeConfig {
    pub google_api_key: Option<String>,

    pub vision_endpoint: String,

    /// Storage account connection string for the output queue
    pub queue_connection: Option<String>,

    pub queue_name: String,

    pub request_timeout_secs: u64,

    pub language_hints: Vec<String>,

    /// `None` lets the batch pick a policy from the requested operations
    pub strip: Option<StripPolicy>,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// First set, non-empty variable among `keys`
fn env_any(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| env::var(k).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

impl Default for VisionPipeConfig {
    /// Loads VISIONPIPE_* variables (and the legacy names) with defaults
    fn default() -> Self {
        let google_api_key = env_any(&["VISIONPIPE_GOOGLE_API_KEY", "GoogleAPIKey"]);

        let vision_endpoint = env_any(&["VISIONPIPE_VISION_ENDPOINT"])
            .unwrap_or_else(|| DEFAULT_VISION_ENDPOINT.to_string());

        let queue_connection =
            env_any(&["VISIONPIPE_QUEUE_CONNECTION", "MSGQ_CONSTR_VISION_ANALYSER"]);

        let queue_name = env_any(&["VISIONPIPE_QUEUE_NAME", "MSGQ_NAME_VISION_ANALYSER"])
            .unwrap_or_else(|| DEFAULT_QUEUE_NAME.to_string());

        let request_timeout_secs = env::var("VISIONPIPE_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let language_hints = env::var("VISIONPIPE_LANGUAGE_HINTS")
            .map(|v| parse_language_hints(&v))
            .unwrap_or_default();

        let strip = env::var("VISIONPIPE_STRIP")
            .ok()
            .and_then(|v| v.parse::<StripPolicy>().ok());

        let log_level = env::var("VISIONPIPE_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            google_api_key,
            vision_endpoint,
            queue_connection,
            queue_name,
            request_timeout_secs,
            language_hints,
            strip,
            log_level,
        }
    }
}

pub fn parse_language_hints(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl VisionPipeConfig {
    /// Checks ranges, names and the log level. Credentials are checked when
    /// the clients are built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if !(self.vision_endpoint.starts_with("http://")
            || self.vision_endpoint.starts_with("https://"))
        {
            return Err(ConfigError::ValidationFailed(format!(
                "Vision endpoint must be an http(s) URL: {}",
                self.vision_endpoint
            )));
        }

        validate_queue_name(&self.queue_name).map_err(ConfigError::ValidationFailed)?;

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn create_queue(&self) -> Result<AzureStorageQueue, ConfigError> {
        let connection = self.queue_connection.as_deref().ok_or_else(|| {
            ConfigError::ValidationFailed(
                "Queue connection string not set. Set VISIONPIPE_QUEUE_CONNECTION".to_string(),
            )
        })?;
        Ok(AzureStorageQueue::with_timeout(
            connection,
            self.request_timeout(),
        )?)
    }

    /// Display map for output formatting, secrets reduced to set/unset
    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let set = |v: &Option<String>| (if v.is_some() { "set" } else { "not set" }).to_string();
        let mut map = BTreeMap::new();

        map.insert("google_api_key".to_string(), set(&self.google_api_key));
        map.insert("vision_endpoint".to_string(), self.vision_endpoint.clone());
        map.insert("queue_connection".to_string(), set(&self.queue_connection));
        map.insert("queue_name".to_string(), self.queue_name.clone());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert("language_hints".to_string(), self.language_hints.join(","));
        map.insert(
            "strip".to_string(),
            self.strip
                .map(|s| s.to_string())
                .unwrap_or_else(|| "per batch".to_string()),
        );
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Debug for VisionPipeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionPipeConfig")
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "<set>"))
            .field("vision_endpoint", &self.vision_endpoint)
            .field("queue_connection", &self.queue_connection.as_ref().map(|_| "<set>"))
            .field("queue_name", &self.queue_name)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("language_hints", &self.language_hints)
            .field("strip", &self.strip)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl fmt::Display for VisionPipeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |v: &Option<String>| if v.is_some() { "set" } else { "not set" };
        writeln!(f, "VisionPipe Configuration:")?;
        writeln!(f, "  API Key: {}", set(&self.google_api_key))?;
        writeln!(f, "  Vision Endpoint: {}", self.vision_endpoint)?;
        writeln!(f, "  Queue Connection: {}", set(&self.queue_connection))?;
        writeln!(f, "  Queue Name: {}", self.queue_name)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        if !self.language_hints.is_empty() {
            writeln!(f, "  Language Hints: {}", self.language_hints.join(","))?;
        }
        match self.strip {
            Some(policy) => writeln!(f, "  Strip: {}", policy)?,
            None => writeln!(f, "  Strip: per batch")?,
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
