use crate::ai_provider::{ensure_success, join_text_parts, AIError, AIProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    text: Option<String>,
}

pub struct ClaudeProvider {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ClaudeProvider {
    pub const DEFAULT_MODEL: &'static str = "claude-3-5-haiku-latest";

    pub fn new(api_key: String, timeout: Duration) -> Result<Self, AIError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
            temperature: 0.1,
        })
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
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
}

fn extract_text(body: &str) -> String {
    let parsed: ClaudeResponse = serde_json::from_str(body).unwrap_or_default();
    join_text_parts(parsed.content.iter().filter_map(|c| c.text.as_deref()))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait::async_trait]
impl AIProvider for ClaudeProvider {
    async fn generate(&self, prompt: &str) -> Result<String, AIError> {
        let claude_request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        debug!("Sending {} prompt chars to Claude model {}", prompt.len(), self.model);
        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&claude_request)
            .send()
            .await?;

        let body = ensure_success(response).await?.text().await?;
        Ok(extract_text(&body))
    }

    fn get_provider_name(&self) -> &str {
        "claude"
    }

    fn get_model(&self) -> &str {
        &self.model
    }
}
