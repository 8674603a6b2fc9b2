//! Storage account connection strings
//!
//! Semicolon separated `Key=Value` pairs. The queue endpoint is taken from
//! `QueueEndpoint` when present, otherwise assembled from
//! `DefaultEndpointsProtocol`, `AccountName` and `EndpointSuffix`.

use super::error::QueueError;
use std::collections::HashMap;
use std::fmt;

const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub queue_endpoint: String,
    pub sas_token: String,
}

impl ConnectionString {
    pub fn parse(input: &str) -> Result<Self, QueueError> {
        let pairs: HashMap<String, String> = input
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.split_once('=')
                    .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
                    .ok_or_else(|| QueueError::Connection {
                        message: format!("malformed connection string segment '{}'", part),
                    })
            })
            .collect::<Result<_, _>>()?;

        let queue_endpoint = match pairs.get("queueendpoint") {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => {
                let account = pairs.get("accountname").ok_or_else(|| QueueError::Connection {
                    message: "connection string has neither QueueEndpoint nor AccountName"
                        .to_string(),
                })?;
                let protocol = pairs
                    .get("defaultendpointsprotocol")
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL);
                let suffix = pairs
                    .get("endpointsuffix")
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_ENDPOINT_SUFFIX);
                format!("{}://{}.queue.{}", protocol, account, suffix)
            }
        };

        let sas_token = match pairs.get("sharedaccesssignature") {
            Some(sas) => sas.trim_start_matches('?').to_string(),
            None if pairs.contains_key("accountkey") => {
                return Err(QueueError::Connection {
                    message: "account key authentication is not supported; \
                              provide a SharedAccessSignature"
                        .to_string(),
                })
            }
            None => {
                return Err(QueueError::Connection {
                    message: "connection string is missing SharedAccessSignature".to_string(),
                })
            }
        };

        Ok(Self {
            queue_endpoint,
            sas_token,
        })
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("queue_endpoint", &self.queue_endpoint)
            .field("sas_token", &"<redacted>")
            .finish()
    }
}
