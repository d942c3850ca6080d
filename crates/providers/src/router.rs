//! Provider selection from configuration.
//!
//! Selection is static: one vendor adapter is chosen at startup from
//! `default_provider` and used for the life of the process. There is no
//! failover between vendors.

use crate::anthropic::AnthropicProvider;
use crate::openai_compat::OpenAiCompatProvider;
use eva_config::AppConfig;
use eva_core::Provider;
use eva_core::error::ProviderError;
use std::sync::Arc;
use tracing::info;

/// Build the configured provider.
pub fn build_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("No API key configured".into()))?;

    let provider: Arc<dyn Provider> = match config.default_provider.as_str() {
        "anthropic" => Arc::new(AnthropicProvider::new(api_key)?),
        "openai" => Arc::new(OpenAiCompatProvider::openai(api_key)?),
        other => {
            return Err(ProviderError::NotConfigured(format!(
                "Unknown provider '{other}' (expected 'anthropic' or 'openai')"
            )));
        }
    };

    info!(provider = provider.name(), model = %config.default_model, "Provider selected");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_anthropic_by_default() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-ant-test".into());
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "anthropic");
    }

    #[test]
    fn builds_openai_when_selected() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-test".into());
        config.default_provider = "openai".into();
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn missing_key_is_not_configured() {
        let config = AppConfig::default();
        let err = build_provider(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn unknown_vendor_is_rejected() {
        let mut config = AppConfig::default();
        config.api_key = Some("k".into());
        config.default_provider = "cohere".into();
        let err = build_provider(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
