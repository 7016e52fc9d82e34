use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqa_core::error::AppError;

use super::Generator;
use crate::config::GenerationConfig;

/// Client for a hosted text-generation endpoint speaking the `{inputs, parameters}` contract.
#[derive(Clone)]
pub struct InferenceApiGenerator {
    endpoint: String,
    api_token: String,
    config: GenerationConfig,
}

impl std::fmt::Debug for InferenceApiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceApiGenerator")
            .field("endpoint", &self.endpoint)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl InferenceApiGenerator {
    /// Only `https://` endpoints are accepted; the token travels as a bearer header.
    pub fn new(
        endpoint: &str,
        api_token: impl Into<String>,
        config: GenerationConfig,
    ) -> Result<Self, AppError> {
        let endpoint = endpoint.trim().trim_end_matches('/').to_string();
        if !endpoint.starts_with("https://") || endpoint.len() <= "https://".len() {
            return Err(AppError::new(
                "AI_CONFIG_INVALID",
                "Inference endpoint must be an https URL",
            )
            .with_details(format!("endpoint={endpoint}")));
        }
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(AppError::new(
                "AI_CONFIG_INVALID",
                "Inference API token must not be empty",
            ));
        }
        Ok(Self {
            endpoint,
            api_token,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Clone, Serialize)]
struct InferenceParameters {
    max_length: u32,
    temperature: f32,
    top_p: f32,
    do_sample: bool,
    top_k: u32,
    repetition_penalty: f32,
}

#[derive(Debug, Clone, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Clone, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// The endpoint answers with either a single object or a one-element list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Many(Vec<GeneratedText>),
    One(GeneratedText),
}

impl InferenceResponse {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Many(items) => items.into_iter().next().map(|g| g.generated_text),
            Self::One(g) => Some(g.generated_text),
        }
    }
}

impl Generator for InferenceApiGenerator {
    fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let cfg = &self.config;
        let req = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                max_length: cfg.max_length,
                temperature: cfg.temperature,
                top_p: cfg.top_p,
                do_sample: cfg.do_sample,
                top_k: cfg.top_k,
                repetition_penalty: cfg.repetition_penalty,
            },
        };

        let resp = ureq::post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_token))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new("AI_GENERATION_FAILED", "Failed to encode inference request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: InferenceResponse = r.into_json().map_err(|e| {
                    AppError::new("AI_GENERATION_FAILED", "Failed to decode inference response")
                        .with_details(e.to_string())
                })?;
                match v.into_text() {
                    Some(text) if !text.trim().is_empty() => Ok(text),
                    _ => Err(AppError::new(
                        "AI_GENERATION_FAILED",
                        "Inference response was empty",
                    )),
                }
            }
            Ok(r) => Err(
                AppError::new("AI_GENERATION_FAILED", "Inference request failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(ureq::Error::Status(code, _)) => Err(AppError::new(
                "AI_GENERATION_FAILED",
                "Inference request failed",
            )
            .with_details(format!("status={code}"))
            .with_retryable(code == 429 || code >= 500)),
            Err(e) => Err(
                AppError::new("AI_GENERATOR_UNREACHABLE", "Failed to call inference endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_https_endpoint_and_token() {
        let cfg = GenerationConfig::default();
        assert!(InferenceApiGenerator::new("https://api.example.com/models/x", "tok", cfg.clone()).is_ok());
        assert!(InferenceApiGenerator::new("http://api.example.com/models/x", "tok", cfg.clone()).is_err());
        assert!(InferenceApiGenerator::new("https://", "tok", cfg.clone()).is_err());
        assert!(InferenceApiGenerator::new("https://api.example.com", "  ", cfg).is_err());
    }

    #[test]
    fn debug_output_redacts_token() {
        let g = InferenceApiGenerator::new("https://api.example.com/", "secret-token", GenerationConfig::default())
            .expect("valid");
        let dbg = format!("{g:?}");
        assert!(!dbg.contains("secret-token"));
        assert_eq!(g.endpoint(), "https://api.example.com");
    }

    #[test]
    fn response_accepts_list_or_object() {
        let list: InferenceResponse =
            serde_json::from_str(r#"[{"generated_text":"hello"}]"#).expect("list");
        assert_eq!(list.into_text().as_deref(), Some("hello"));
        let one: InferenceResponse = serde_json::from_str(r#"{"generated_text":"hi"}"#).expect("obj");
        assert_eq!(one.into_text().as_deref(), Some("hi"));
        let empty: InferenceResponse = serde_json::from_str("[]").expect("empty");
        assert_eq!(empty.into_text(), None);
    }
}
