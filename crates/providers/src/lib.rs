//! Model gateway implementations for DeskPilot.

pub mod gemini;

pub use gemini::GeminiProvider;

use deskpilot_config::AppConfig;
use deskpilot_core::error::ProviderError;
use deskpilot_core::provider::Provider;
use std::sync::Arc;

/// Build the configured provider. A missing model API key is a hard
/// startup precondition, not a runtime concern.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("No model API key configured".into()))?;
    Ok(Arc::new(GeminiProvider::new(api_key)))
}
