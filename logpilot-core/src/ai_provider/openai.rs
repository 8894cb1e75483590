use crate::ai_provider::{ensure_success, join_text_parts, AIError, AIProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

/// Chat-completions client. OpenRouter speaks the same wire format, so it is
/// this provider pointed at a different base URL.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    name: &'static str,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAIProvider {
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";
    pub const DEFAULT_OPENROUTER_MODEL: &'static str = "google/gemini-2.0-flash-001";

    pub fn new(api_key: String, timeout: Duration) -> Result<Self, AIError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
            name: "openai",
            max_tokens: 2000,
            temperature: 0.1,
        })
    }

    pub fn openrouter(api_key: String, timeout: Duration) -> Result<Self, AIError> {
        let mut provider = Self::new(api_key, timeout)?;
        provider.model = Self::DEFAULT_OPENROUTER_MODEL.to_string();
        provider.base_url = OPENROUTER_BASE_URL.to_string();
        provider.name = "openrouter";
        Ok(provider)
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn get_endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn extract_text(body: &str) -> String {
    let parsed: OpenAIResponse = serde_json::from_str(body).unwrap_or_default();
    let parts = parsed
        .choices
        .iter()
        .filter_map(|c| c.message.as_ref())
        .filter_map(|m| m.content.as_deref());
    join_text_parts(parts).unwrap_or_else(|| body.to_string())
}

#[async_trait::async_trait]
impl AIProvider for OpenAIProvider {
    async fn generate(&self, prompt: &str) -> Result<String, AIError> {
        let openai_request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Sending {} prompt chars to {} model {}", prompt.len(), self.name, self.model);
        let response = self
            .client
            .post(self.get_endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await?;

        let body = ensure_success(response).await?.text().await?;
        Ok(extract_text(&body))
    }

    fn get_provider_name(&self) -> &str {
        self.name
    }

    fn get_model(&self) -> &str {
        &self.model
    }
}
