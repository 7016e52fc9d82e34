pub mod answer;
pub mod config;
pub mod llm;
pub mod ollama;
pub mod pipeline;
pub mod prompts;
