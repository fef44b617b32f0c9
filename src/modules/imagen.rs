use crate::modules::state::AspectRatio;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const MODEL: &str = "imagen-4.0-generate-001";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { message: String },

    #[error("failed to decode image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("the service returned no images")]
    Empty,
}

// Capability object for the remote generation call. The workflow owns one of
// these rather than reaching for a process-wide client, so tests can
// substitute a mock.
pub trait GenerationBackend: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        image_count: u32,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<Vec<u8>>, GenerateError>;
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PromptInstance<'a>>,
    parameters: PredictParameters<'a>,
}

#[derive(Serialize)]
struct PromptInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: u32,
    aspect_ratio: &'a str,
    output_mime_type: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct ImagenClient {
    http: reqwest::blocking::Client,
    api_key: Option<String>,
    base_url: String,
}

impl ImagenClient {
    pub fn from_env() -> Self {
        let api_key: Option<String> = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok();
        if api_key.is_none() {
            log::warn!("no GEMINI_API_KEY in environment; generation will fail until one is set");
        }
        Self {
            http: reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::blocking::Client::new()),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }
}

impl GenerationBackend for ImagenClient {
    fn generate(
        &self,
        prompt: &str,
        image_count: u32,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<Vec<u8>>, GenerateError> {
        let api_key: &str = self.api_key.as_deref().ok_or(GenerateError::MissingKey)?;
        let url: String = format!("{}/models/{}:predict", self.base_url, MODEL);
        let request = PredictRequest {
            instances: vec![PromptInstance { prompt }],
            parameters: PredictParameters {
                sample_count: image_count,
                aspect_ratio: aspect_ratio.label(),
                output_mime_type: "image/jpeg",
            },
        };

        log::info!("requesting {} images from {}", image_count, MODEL);
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response.text().unwrap_or_default();
            let message: String = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("request failed with status {}", status));
            return Err(GenerateError::Api { message });
        }

        let body: PredictResponse = response.json()?;
        let mut images: Vec<Vec<u8>> = Vec::with_capacity(body.predictions.len());
        for prediction in &body.predictions {
            images.push(
                base64::engine::general_purpose::STANDARD
                    .decode(&prediction.bytes_base64_encoded)?,
            );
        }
        if images.is_empty() {
            return Err(GenerateError::Empty);
        }
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_predict_layout() {
        let request = PredictRequest {
            instances: vec![PromptInstance { prompt: "a logo" }],
            parameters: PredictParameters {
                sample_count: 4,
                aspect_ratio: AspectRatio::Wide.label(),
                output_mime_type: "image/jpeg",
            },
        };
        let value: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["instances"][0]["prompt"], "a logo");
        assert_eq!(value["parameters"]["sampleCount"], 4);
        assert_eq!(value["parameters"]["aspectRatio"], "16:9");
        assert_eq!(value["parameters"]["outputMimeType"], "image/jpeg");
    }

    #[test]
    fn response_parses_predictions_and_error_body() {
        let body: PredictResponse = serde_json::from_str(
            r#"{"predictions":[{"bytesBase64Encoded":"aGVsbG8=","mimeType":"image/jpeg"}]}"#,
        )
        .unwrap();
        assert_eq!(body.predictions.len(), 1);
        let decoded: Vec<u8> = base64::engine::general_purpose::STANDARD
            .decode(&body.predictions[0].bytes_base64_encoded)
            .unwrap();
        assert_eq!(decoded, b"hello");

        let err: ApiErrorBody = serde_json::from_str(
            r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#,
        )
        .unwrap();
        assert_eq!(err.error.message, "API key not valid.");
    }

    #[test]
    fn missing_predictions_field_is_tolerated() {
        let body: PredictResponse = serde_json::from_str("{}").unwrap();
        assert!(body.predictions.is_empty());
    }
}
