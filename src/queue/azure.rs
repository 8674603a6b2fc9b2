//! Azure Storage queue client over the REST API with SAS authentication

use super::connection::ConnectionString;
use super::error::QueueError;
use super::{MessageQueue, QueueCreation, MESSAGE_SIZE_LIMIT};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};

const API_VERSION: &str = "2020-10-02";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct AzureStorageQueue {
    connection: ConnectionString,
    http_client: Client,
}

impl AzureStorageQueue {
    pub fn from_connection_string(connection_string: &str) -> Result<Self, QueueError> {
        Self::with_timeout(
            connection_string,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(connection_string: &str, timeout: Duration) -> Result<Self, QueueError> {
        let connection = ConnectionString::parse(connection_string)?;
        let http_client =
            Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| QueueError::Connection {
                    message: format!("Failed to build HTTP client: {}", e),
                })?;

        Ok(Self {
            connection,
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.connection.queue_endpoint
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}?{}",
            self.connection.queue_endpoint, path, self.connection.sas_token
        )
    }
}

#[async_trait]
impl MessageQueue for AzureStorageQueue {
    async fn ensure_queue(&self, queue: &str) -> Result<QueueCreation, QueueError> {
        let response = self
            .http_client
            .put(self.url(queue))
            .header("x-ms-version", API_VERSION)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("Queue create request for '{}' failed: {}", queue, e);
                QueueError::Create {
                    queue: queue.to_string(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        match status {
            StatusCode::CREATED => {
                info!(queue, "Created queue");
                return Ok(QueueCreation::Created);
            }
            StatusCode::NO_CONTENT => {
                debug!(queue, "Queue already exists");
                return Ok(QueueCreation::AlreadyExists);
            }
            _ => {}
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = parse_error_body(&body);

        if status == StatusCode::CONFLICT && code.as_deref() == Some("QueueAlreadyExists") {
            debug!(queue, "Queue already exists with different metadata");
            return Ok(QueueCreation::AlreadyExists);
        }

        error!("Queue create for '{}' returned {}: {}", queue, status, message);
        Err(QueueError::Create {
            queue: queue.to_string(),
            message: format!("HTTP {}: {}", status.as_u16(), message),
        })
    }

    async fn publish(&self, queue: &str, message: &str) -> Result<(), QueueError> {
        let body = format!(
            "<QueueMessage><MessageText>{}</MessageText></QueueMessage>",
            xml_escape(message)
        );
        let size = body.len();
        if size > MESSAGE_SIZE_LIMIT {
            return Err(QueueError::MessageTooLarge {
                size,
                limit: MESSAGE_SIZE_LIMIT,
            });
        }

        let response = self
            .http_client
            .post(self.url(&format!("{}/messages", queue)))
            .header("x-ms-version", API_VERSION)
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("Queue append to '{}' failed: {}", queue, e);
                QueueError::Append {
                    queue: queue.to_string(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(queue, size, "Appended message");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let (code, detail) = parse_error_body(&text);
        if status == StatusCode::NOT_FOUND && code.as_deref() == Some("QueueNotFound") {
            return Err(QueueError::NotFound {
                queue: queue.to_string(),
            });
        }

        error!("Queue append to '{}' returned {}: {}", queue, status, detail);
        Err(QueueError::Append {
            queue: queue.to_string(),
            message: format!("HTTP {}: {}", status.as_u16(), detail),
        })
    }

    fn name(&self) -> &str {
        "azure-storage-queue"
    }
}

impl fmt::Debug for AzureStorageQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureStorageQueue")
            .field("connection", &self.connection)
            .finish()
    }
}

/// Escapes the five XML special characters
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Pulls `Code` and the first line of `Message` out of a storage error body
fn parse_error_body(body: &str) -> (Option<String>, String) {
    let Ok(doc) = roxmltree::Document::parse(body) else {
        return (None, body.trim().to_string());
    };

    let child_text = |name: &str| {
        doc.root_element()
            .children()
            .find(|n| n.has_tag_name(name))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string())
    };

    let code = child_text("Code");
    let message = child_text("Message")
        .and_then(|m| m.lines().next().map(str::to_string))
        .or_else(|| code.clone())
        .unwrap_or_default();
    (code, message)
}
