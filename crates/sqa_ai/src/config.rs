use serde::{Deserialize, Serialize};
use sqa_core::error::AppError;

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30 * 60;

/// Sampling settings sent with every generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_length: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repetition_penalty: f32,
    pub do_sample: bool,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: 250,
            temperature: 0.8,
            top_p: 0.9,
            top_k: 50,
            repetition_penalty: 1.2,
            do_sample: true,
            timeout_secs: 30,
        }
    }
}

/// Which generation service answers are expanded with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorBackend {
    /// Local Ollama on 127.0.0.1.
    Ollama { base_url: String, model: String },
    /// Hosted text-generation endpoint; the bearer token is read from `api_token_env`.
    InferenceApi { endpoint: String, api_token_env: String },
    /// No expansion; answers are the selected study sentences only.
    Disabled,
}

impl Default for GeneratorBackend {
    fn default() -> Self {
        Self::Ollama {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "llama3.2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Questions answered concurrently per batch.
    pub batch_size: usize,
    pub cache_ttl_secs: u64,
    pub backend: GeneratorBackend,
    pub generation: GenerationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            backend: GeneratorBackend::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse host-supplied JSON; missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let cfg: Self = serde_json::from_str(raw).map_err(|e| {
            AppError::new("AI_CONFIG_INVALID", "Failed to parse pipeline config")
                .with_details(e.to_string())
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.batch_size == 0 {
            return Err(AppError::new(
                "AI_CONFIG_INVALID",
                "batch_size must be at least 1",
            ));
        }
        if self.cache_ttl_secs == 0 {
            return Err(AppError::new(
                "AI_CONFIG_INVALID",
                "cache_ttl_secs must be at least 1",
            ));
        }
        if self.generation.timeout_secs == 0 {
            return Err(AppError::new(
                "AI_CONFIG_INVALID",
                "generation.timeout_secs must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> time::Duration {
        time::Duration::seconds(self.cache_ttl_secs.min(i64::MAX as u64) as i64)
    }
}
