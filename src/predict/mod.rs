use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::Config;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    payload: ImagePayload<'a>,
}

#[derive(Debug, Serialize)]
struct ImagePayload<'a> {
    image: ImageBytes<'a>,
}

#[derive(Debug, Serialize)]
struct ImageBytes<'a> {
    #[serde(rename = "imageBytes")]
    image_bytes: &'a str,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: Option<ServiceErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("prediction request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("prediction service error ({status}): {message}")]
    Service { status: u16, message: String },
    #[error("unreadable prediction response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Seam for the managed object-detection service. Handlers depend on this
/// rather than the concrete HTTP client.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Submits a base64-encoded image and resolves with the service's raw
    /// response list.
    async fn predict(&self, b64_image: &str) -> Result<Value, PredictError>;
}

/// Client for the managed object-detection model. Built once at startup and
/// shared across requests; each call is stateless.
pub struct PredictionClient {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl PredictionClient {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        let model_path = format!(
            "projects/{}/locations/{}/models/{}",
            config.project_name, config.region, config.model_id
        );
        let endpoint = format!(
            "https://{}-automl.googleapis.com/v1/{}:predict",
            config.region, model_path
        );

        Self {
            client,
            endpoint,
            access_token: config.access_token.clone(),
        }
    }
}

#[async_trait]
impl Predictor for PredictionClient {
    /// Image content and size are not validated here; a bad payload fails
    /// with the service's own error.
    async fn predict(&self, b64_image: &str) -> Result<Value, PredictError> {
        let body = PredictRequest {
            payload: ImagePayload {
                image: ImageBytes { image_bytes: b64_image },
            },
        };

        info!(
            "Requesting prediction ({} base64 chars of image)",
            b64_image.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(PredictError::Service {
                status: status.as_u16(),
                message: service_message(&text),
            });
        }

        let parsed: Value = serde_json::from_str(&text)?;

        // One response object per call; callers see the raw response list.
        Ok(Value::Array(vec![parsed]))
    }
}

fn service_message(body: &str) -> String {
    serde_json::from_str::<ServiceErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            project_name: "trashcam".to_string(),
            region: "us-central1".to_string(),
            model_id: "IOD12345".to_string(),
            access_token: "token".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }

    #[test]
    fn endpoint_is_qualified_by_project_region_and_model() {
        let client = PredictionClient::new(&test_config());
        assert_eq!(
            client.endpoint,
            "https://us-central1-automl.googleapis.com/v1/projects/trashcam/locations/us-central1/models/IOD12345:predict"
        );
    }

    #[test]
    fn request_body_wraps_image_bytes() {
        let body = PredictRequest {
            payload: ImagePayload {
                image: ImageBytes { image_bytes: "aGVsbG8=" },
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "payload": { "image": { "imageBytes": "aGVsbG8=" } } })
        );
    }

    #[test]
    fn service_message_prefers_structured_error() {
        let body = r#"{"error": {"code": 403, "message": "permission denied"}}"#;
        assert_eq!(service_message(body), "permission denied");
    }

    #[test]
    fn service_message_falls_back_to_raw_body() {
        assert_eq!(service_message("upstream exploded"), "upstream exploded");
    }
}
