use std::sync::Arc;

use sqa_core::error::AppError;

use crate::config::{GeneratorBackend, PipelineConfig};
use crate::ollama::OllamaClient;

pub mod inference_api;
pub mod ollama_llm;

pub use inference_api::InferenceApiGenerator;
pub use ollama_llm::OllamaGenerator;

/// Text-in/text-out generation service used to expand a selected passage into prose.
///
/// Implementations return an error for transport failures, non-2xx responses and empty
/// output; callers decide how to degrade.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

/// Stand-in used when expansion is turned off. Always fails, so answers fall back to the
/// selected study sentences.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

impl Generator for DisabledGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        Err(AppError::new(
            "AI_GENERATION_DISABLED",
            "Answer expansion is disabled",
        ))
    }
}

/// Build the generator selected by `config.backend`.
pub fn build_generator(config: &PipelineConfig) -> Result<Arc<dyn Generator>, AppError> {
    match &config.backend {
        GeneratorBackend::Ollama { base_url, model } => {
            let client = OllamaClient::new(base_url)?;
            Ok(Arc::new(OllamaGenerator::new(
                client,
                model.clone(),
                config.generation.clone(),
            )))
        }
        GeneratorBackend::InferenceApi {
            endpoint,
            api_token_env,
        } => {
            let token = std::env::var(api_token_env).map_err(|e| {
                AppError::new("AI_CONFIG_INVALID", "Inference API token is not set")
                    .with_details(format!("env={api_token_env}; err={e}"))
            })?;
            Ok(Arc::new(InferenceApiGenerator::new(
                endpoint,
                token,
                config.generation.clone(),
            )?))
        }
        GeneratorBackend::Disabled => Ok(Arc::new(DisabledGenerator)),
    }
}
