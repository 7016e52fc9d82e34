use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqa_core::error::AppError;

use super::Generator;
use crate::config::GenerationConfig;
use crate::ollama::OllamaClient;

#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
    config: GenerationConfig,
}

impl OllamaGenerator {
    pub fn new(client: OllamaClient, model: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            client,
            model: model.into(),
            config,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    repeat_penalty: f32,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl Generator for OllamaGenerator {
    fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let cfg = &self.config;
        let req = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: cfg.max_length,
                // Ollama samples unless temperature is zero.
                temperature: if cfg.do_sample { cfg.temperature } else { 0.0 },
                top_p: cfg.top_p,
                top_k: cfg.top_k,
                repeat_penalty: cfg.repetition_penalty,
            },
        };

        let resp = ureq::post(&url)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new("AI_GENERATION_FAILED", "Failed to encode generate request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: GenerateResponse = r.into_json().map_err(|e| {
                    AppError::new("AI_GENERATION_FAILED", "Failed to decode generate response")
                        .with_details(e.to_string())
                })?;
                if v.response.trim().is_empty() {
                    return Err(AppError::new(
                        "AI_GENERATION_FAILED",
                        "Generate response was empty",
                    ));
                }
                Ok(v.response)
            }
            Ok(r) => Err(
                AppError::new("AI_GENERATION_FAILED", "Generate request failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(e) => Err(
                AppError::new("AI_GENERATOR_UNREACHABLE", "Failed to call generate endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}
