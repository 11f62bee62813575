//! Model factory for creating provider clients from configuration.
//!
//! Handles provider selection and API key loading from environment
//! variables when no explicit key is supplied.

use crate::{CohereModel, MockModel, OpenAIModel};
use postforge_abstraction::{Model, ModelError};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Provider enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    /// Mock provider for testing and offline runs.
    Mock,
    /// OpenAI drafting provider.
    OpenAi,
    /// Cohere evaluator provider.
    Cohere,
}

impl FromStr for ModelProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "openai" => Ok(Self::OpenAi),
            "cohere" => Ok(Self::Cohere),
            _ => Err(()),
        }
    }
}

/// Provider client configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Which provider to create a client for.
    pub provider: ModelProvider,
    /// The model ID (e.g., "gpt-4o-mini", "command-a-03-2025").
    pub model_id: String,
    /// Optional API key (if not provided, loaded from environment).
    pub api_key: Option<String>,
    /// Optional per-request timeout.
    pub request_timeout: Option<Duration>,
}

impl ProviderConfig {
    /// Creates a new `ProviderConfig` for the given provider and model ID.
    #[must_use]
    pub fn new(provider: ModelProvider, model_id: String) -> Self {
        Self { provider, model_id, api_key: None, request_timeout: None }
    }

    /// Sets an explicit API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// Factory for creating model clients.
pub struct ModelFactory;

impl ModelFactory {
    /// Creates a model client from the given configuration.
    ///
    /// # Errors
    /// Returns a `ModelError` if the required API key is missing.
    pub fn create(config: ProviderConfig) -> Result<Arc<dyn Model>, ModelError> {
        debug!(
            provider = ?config.provider,
            model_id = %config.model_id,
            "Creating model client"
        );

        match config.provider {
            ModelProvider::Mock => Ok(Arc::new(MockModel::new(config.model_id))),
            ModelProvider::OpenAi => {
                let mut model = if let Some(api_key) = config.api_key {
                    OpenAIModel::with_api_key(config.model_id, api_key)
                } else {
                    OpenAIModel::new(config.model_id)?
                };
                if let Some(timeout) = config.request_timeout {
                    model = model.with_timeout(timeout);
                }
                Ok(Arc::new(model))
            }
            ModelProvider::Cohere => {
                let mut model = if let Some(api_key) = config.api_key {
                    CohereModel::with_api_key(config.model_id, api_key)
                } else {
                    CohereModel::new(config.model_id)?
                };
                if let Some(timeout) = config.request_timeout {
                    model = model.with_timeout(timeout);
                }
                Ok(Arc::new(model))
            }
        }
    }

    /// Creates a model client from a provider string and model ID.
    ///
    /// # Errors
    /// Returns a `ModelError` if the provider string is unrecognized or
    /// creation fails.
    pub fn create_from_str(
        provider_str: &str,
        model_id: String,
    ) -> Result<Arc<dyn Model>, ModelError> {
        let provider = ModelProvider::from_str(provider_str).map_err(|()| {
            error!(provider = %provider_str, "Unrecognized provider");
            ModelError::UnsupportedModelProvider(format!(
                "Unrecognized provider: {}",
                provider_str
            ))
        })?;

        Self::create(ProviderConfig::new(provider, model_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(ModelProvider::from_str("mock"), Ok(ModelProvider::Mock));
        assert_eq!(ModelProvider::from_str("OpenAI"), Ok(ModelProvider::OpenAi));
        assert_eq!(ModelProvider::from_str("COHERE"), Ok(ModelProvider::Cohere));
        assert_eq!(ModelProvider::from_str("gemini"), Err(()));
    }

    #[test]
    fn test_provider_config_builders() {
        let config = ProviderConfig::new(ModelProvider::OpenAi, "gpt-4o-mini".to_string())
            .with_api_key("test-key".to_string())
            .with_timeout(Duration::from_secs(30));
        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_factory_create_mock() {
        let config = ProviderConfig::new(ModelProvider::Mock, "test-mock".to_string());
        let model = ModelFactory::create(config).unwrap();
        assert_eq!(model.model_id(), "test-mock");
    }

    #[test]
    fn test_factory_create_openai_with_api_key() {
        let config = ProviderConfig::new(ModelProvider::OpenAi, "gpt-4o-mini".to_string())
            .with_api_key("test-key".to_string());
        let model = ModelFactory::create(config).unwrap();
        assert_eq!(model.model_id(), "gpt-4o-mini");
    }

    #[test]
    fn test_factory_create_cohere_with_api_key() {
        let config = ProviderConfig::new(ModelProvider::Cohere, "command-a-03-2025".to_string())
            .with_api_key("test-key".to_string());
        let model = ModelFactory::create(config).unwrap();
        assert_eq!(model.model_id(), "command-a-03-2025");
    }

    #[test]
    fn test_factory_create_invalid_provider() {
        let result = ModelFactory::create_from_str("invalid", "test".to_string());
        assert!(result.is_err());
    }
}
