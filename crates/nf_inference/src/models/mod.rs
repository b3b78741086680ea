use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nf_core::{Error, Result};

use crate::Config;

pub mod dummy;
pub mod openai;

/// A single-turn text completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String>;
}

pub fn create_model(config: &Config) -> Result<Arc<dyn ChatModel>> {
    match config.provider.to_ascii_lowercase().as_str() {
        "openai" => Ok(Arc::new(openai::OpenAiModel::new(
            config.api_key.clone(),
            &config.model_name,
            &config.base_url,
            config.timeout(),
        )?)),
        other => Err(Error::Config(format!("unsupported inference provider: {other}"))),
    }
}
