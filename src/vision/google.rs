//! Google Cloud Vision REST client
//!
//! Every call is a single `images:annotate` request carrying one image and
//! one feature. The matching annotation field is cut out of the response and
//! returned as raw text in the shape the envelope builder expects.

use super::client::VisionClient;
use super::error::VisionError;
use super::image::ImageSource;
use super::operation::DetectionOperation;
use super::response::OperationResponse;
use crate::config::VisionPipeConfig;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct GoogleVisionClient {
    endpoint: String,
    api_key: String,
    http_client: Client,
    timeout: Duration,
    language_hints: Vec<String>,
}

impl GoogleVisionClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, VisionError> {
        Self::with_timeout(
            api_key,
            DEFAULT_ENDPOINT,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VisionError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(VisionError::ClientInitialization {
                message: "Google Vision API key is not set".to_string(),
            });
        }

        let http_client = Client::builder().timeout(timeout).build().map_err(|e| {
            VisionError::ClientInitialization {
                message: format!("Failed to build HTTP client: {}", e),
            }
        })?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            http_client,
            timeout,
            language_hints: Vec::new(),
        })
    }

    pub fn from_config(config: &VisionPipeConfig) -> Result<Self, VisionError> {
        let api_key = config
            .google_api_key
            .clone()
            .ok_or_else(|| VisionError::ClientInitialization {
                message: "Google Vision API key is not set (VISIONPIPE_GOOGLE_API_KEY)"
                    .to_string(),
            })?;

        Ok(Self::with_timeout(
            api_key,
            config.vision_endpoint.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_language_hints(config.language_hints.clone()))
    }

    pub fn with_language_hints(mut self, hints: Vec<String>) -> Self {
        self.language_hints = hints;
        self
    }

    fn build_request(&self, feature: &'static str, image: &ImageSource) -> AnnotateRequest {
        let image = match image {
            ImageSource::Uri(uri) => ImagePayload {
                content: None,
                source: Some(ImageLocation {
                    image_uri: uri.clone(),
                }),
            },
            ImageSource::Bytes(bytes) => ImagePayload {
                content: Some(STANDARD.encode(bytes)),
                source: None,
            },
        };

        let image_context = if self.language_hints.is_empty() {
            None
        } else {
            Some(ImageContext {
                language_hints: self.language_hints.clone(),
            })
        };

        AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image,
                features: vec![Feature {
                    feature_type: feature,
                }],
                image_context,
            }],
        }
    }

    async fn send(&self, request: &AnnotateRequest) -> Result<Value, VisionError> {
        let url = format!("{}/v1/images:annotate", self.endpoint);
        let start = Instant::now();

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("Vision request to {} failed: {}", self.endpoint, e);
                VisionError::from_reqwest(e, self.timeout.as_secs())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Vision API returned error status {}: {}", status, body);
            return Err(VisionError::Api {
                message: api_error_message(&body),
                status: Some(status.as_u16()),
            });
        }

        let batch: BatchAnnotateResponse = response.json().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to parse vision response: {}", e);
            VisionError::InvalidResponse {
                message: format!("JSON parse error: {}", e),
            }
        })?;

        debug!(
            "Vision request completed in {:.2}s",
            start.elapsed().as_secs_f64()
        );

        batch
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| VisionError::InvalidResponse {
                message: "response contained no annotation results".to_string(),
            })
    }
}

#[async_trait]
impl VisionClient for GoogleVisionClient {
    async fn annotate(
        &self,
        operation: DetectionOperation,
        image: &ImageSource,
    ) -> Result<OperationResponse, VisionError> {
        let feature =
            operation
                .feature_type()
                .ok_or_else(|| VisionError::UnsupportedOperation {
                    operation: operation.to_string(),
                    client: self.name().to_string(),
                })?;

        info!(operation = %operation, image = %image, "Requesting annotation");

        let request = self.build_request(feature, image);
        let result = self.send(&request).await?;

        if let Some(err) = result.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            let code = err.get("code").and_then(Value::as_i64).unwrap_or(0) as i32;
            return Err(VisionError::Image { message, code });
        }

        extract_payload(operation, &result)
    }

    fn name(&self) -> &str {
        "google-vision"
    }

    fn endpoint_info(&self) -> Option<String> {
        Some(self.endpoint.clone())
    }
}

impl fmt::Debug for GoogleVisionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleVisionClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("language_hints", &self.language_hints)
            .finish()
    }
}

/// Cuts the operation's annotation out of one image result
pub fn extract_payload(
    operation: DetectionOperation,
    result: &Value,
) -> Result<OperationResponse, VisionError> {
    let array = |field: &str| {
        result
            .get(field)
            .filter(|v| v.is_array())
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()))
    };
    let object = |field: &str| {
        result
            .get(field)
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or_else(|| json!({}))
    };

    let raw = match operation {
        DetectionOperation::Text => json!({ "textAnnotations": array("textAnnotations") }).to_string(),
        DetectionOperation::Faces => json!({ "faceAnnotations": array("faceAnnotations") }).to_string(),
        DetectionOperation::Labels => array("labelAnnotations").to_string(),
        DetectionOperation::Landmarks => array("landmarkAnnotations").to_string(),
        DetectionOperation::Logos => array("logoAnnotations").to_string(),
        DetectionOperation::WebDetection => object("webDetection").to_string(),
        DetectionOperation::SafeSearch => object("safeSearchAnnotation").to_string(),
        DetectionOperation::Properties => object("imagePropertiesAnnotation").to_string(),
        DetectionOperation::CropHints => object("cropHintsAnnotation").to_string(),
        DetectionOperation::DocumentText => result
            .get("fullTextAnnotation")
            .and_then(|v| v.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        DetectionOperation::All => {
            return Err(VisionError::UnsupportedOperation {
                operation: operation.to_string(),
                client: "google-vision".to_string(),
            })
        }
    };

    OperationResponse::new(operation, raw).ok_or_else(|| VisionError::InvalidResponse {
        message: format!("no response shape for {}", operation),
    })
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageRequest {
    image: ImagePayload,
    features: Vec<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_context: Option<ImageContext>,
}

#[derive(Debug, Serialize)]
struct ImagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<ImageLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageLocation {
    image_uri: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageContext {
    language_hints: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BatchAnnotateResponse {
    #[serde(default)]
    responses: Vec<Value>,
}
