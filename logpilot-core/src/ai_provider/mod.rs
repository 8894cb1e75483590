use reqwest::Response;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::ProviderSettings;

pub mod claude;
pub mod gemini;
pub mod openai;
pub mod prompts;

pub use claude::ClaudeProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;

#[derive(Error, Debug)]
pub enum AIError {
    #[error("{provider} API key is not set (export {env_var} or add api_key to the config file)")]
    MissingApiKey { provider: String, env_var: String },
    #[error("API request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Authentication failed")]
    AuthenticationError,
    #[error("Rate limited")]
    RateLimited,
    #[error("Provider not supported: {0}")]
    UnsupportedProvider(String),
}

impl AIError {
    /// True for errors caused by local configuration rather than the remote service.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            AIError::MissingApiKey { .. } | AIError::UnsupportedProvider(_)
        )
    }
}

/// A generative-text backend: prompt in, free-form text out.
///
/// Replies are untrusted natural language; callers parse them defensively.
#[async_trait::async_trait]
pub trait AIProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AIError>;
    fn get_provider_name(&self) -> &str;
    fn get_model(&self) -> &str;
}

/// Providers the factory knows how to build.
pub const SUPPORTED_PROVIDERS: &[&str] = &["gemini", "claude", "anthropic", "openai", "openrouter"];

pub fn create_provider(provider_name: &str, api_key: &str) -> Result<Box<dyn AIProvider>, AIError> {
    create_provider_with_settings(provider_name, api_key, None)
}

pub fn create_provider_with_settings(
    provider_name: &str,
    api_key: &str,
    settings: Option<&ProviderSettings>,
) -> Result<Box<dyn AIProvider>, AIError> {
    let model = settings.and_then(|s| s.model.clone());
    info!("Creating AI provider: {} with model: {:?}", provider_name, model);

    let timeout = settings.map(ProviderSettings::timeout).unwrap_or(ProviderSettings::DEFAULT_TIMEOUT);
    let max_tokens = settings.and_then(|s| s.max_tokens);
    let temperature = settings.and_then(|s| s.temperature);

    match provider_name.to_lowercase().as_str() {
        "gemini" => {
            debug!("Initializing Gemini provider");
            let mut provider = GeminiProvider::new(api_key.to_string(), timeout)?;
            if let Some(model_id) = model {
                provider = provider.with_model(model_id);
            }
            if let Some(tokens) = max_tokens {
                provider = provider.with_max_tokens(tokens);
            }
            if let Some(t) = temperature {
                provider = provider.with_temperature(t);
            }
            Ok(Box::new(provider))
        }
        "claude" | "anthropic" => {
            debug!("Initializing Claude/Anthropic provider");
            let mut provider = ClaudeProvider::new(api_key.to_string(), timeout)?;
            if let Some(model_id) = model {
                provider = provider.with_model(model_id);
            }
            if let Some(tokens) = max_tokens {
                provider = provider.with_max_tokens(tokens);
            }
            if let Some(t) = temperature {
                provider = provider.with_temperature(t);
            }
            Ok(Box::new(provider))
        }
        "openai" | "openrouter" => {
            let mut provider = if provider_name.eq_ignore_ascii_case("openrouter") {
                debug!("Initializing OpenRouter provider");
                OpenAIProvider::openrouter(api_key.to_string(), timeout)?
            } else {
                debug!("Initializing OpenAI provider");
                OpenAIProvider::new(api_key.to_string(), timeout)?
            };
            if let Some(base_url) = settings.and_then(|s| s.base_url.clone()) {
                provider = provider.with_base_url(base_url);
            }
            if let Some(model_id) = model {
                provider = provider.with_model(model_id);
            }
            if let Some(tokens) = max_tokens {
                provider = provider.with_max_tokens(tokens);
            }
            if let Some(t) = temperature {
                provider = provider.with_temperature(t);
            }
            Ok(Box::new(provider))
        }
        _ => {
            error!("Unsupported AI provider: {}", provider_name);
            Err(AIError::UnsupportedProvider(provider_name.to_string()))
        }
    }
}

/// Map HTTP failure statuses onto `AIError`, passing successful responses through.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, AIError> {
    let status = response.status();
    if status == 401 || status == 403 {
        return Err(AIError::AuthenticationError);
    }
    if status == 429 {
        return Err(AIError::RateLimited);
    }
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AIError::InvalidResponse(format!("HTTP {}: {}", status, error_text)));
    }
    Ok(response)
}

/// Join the non-empty text parts of a reply, or `None` when there are none.
pub(crate) fn join_text_parts<'a, I>(parts: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let texts: Vec<&str> = parts.into_iter().filter(|t| !t.is_empty()).collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}
