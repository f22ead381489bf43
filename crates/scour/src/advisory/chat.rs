//! Chat-completions advisory provider (Groq by default, any OpenAI-compatible API).

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{Result, ScourError};

use super::provider::{AdvisoryProvider, AdvisoryRequest};

const SYSTEM_PROMPT: &str = "You are a helpful data cleaning assistant.";

/// Settings for [`ChatAdvisor`].
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Chat-completions endpoint.
    pub endpoint: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f64,
    pub timeout: Duration,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama3-70b-8192".to_string(),
            max_tokens: 300,
            temperature: 0.2,
            timeout: Duration::from_secs(30),
            api_key_env: "GROQ_API_KEY".to_string(),
        }
    }
}

/// Asks a hosted language model for cleaning suggestions.
pub struct ChatAdvisor {
    client: Client,
    api_key: String,
    config: ChatConfig,
}

impl ChatAdvisor {
    /// Create an advisor with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, ChatConfig::default())
    }

    /// Create an advisor with custom settings.
    pub fn with_config(api_key: impl Into<String>, config: ChatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScourError::Advisory(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    /// Create from the API key environment variable named in the config.
    pub fn from_env(config: ChatConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ScourError::Advisory(format!(
                "{} environment variable not set",
                config.api_key_env
            ))
        })?;
        Self::with_config(api_key, config)
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| ScourError::Advisory(format!("Invalid API key: {}", e)))?,
        );
        Ok(headers)
    }

    fn send_message(&self, user_prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt }
            ]
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .map_err(|e| ScourError::Advisory(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(ScourError::Advisory(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: ChatResponse = response
            .json()
            .map_err(|e| ScourError::Advisory(format!("Failed to parse API response: {}", e)))?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ScourError::Advisory("Empty response from API".to_string()))
    }
}

impl AdvisoryProvider for ChatAdvisor {
    fn suggest(&self, request: &AdvisoryRequest<'_>) -> Result<Vec<String>> {
        let prompt = build_prompt(request);
        debug!(model = %self.config.model, "requesting suggestions");
        let reply = self.send_message(&prompt)?;
        Ok(parse_suggestions(&reply))
    }

    fn name(&self) -> &str {
        "chat"
    }
}

/// Build the user prompt from the run's issue summaries.
pub fn build_prompt(request: &AdvisoryRequest<'_>) -> String {
    let (rows, columns) = request.dataset.shape();
    format!(
        "You are a data cleaning assistant.\n\
         Based on the cleaning and validation summaries below, give concise, actionable \
         suggestions to further improve the dataset quality.\n\n\
         Dataset shape: {} rows x {} columns\n\n\
         Cleaning Summary:\n{}\n\n\
         Validation Summary:\n{}\n\n\
         Output each suggestion as a short bullet point.",
        rows,
        columns,
        request.cleaning_summary(),
        request.validation_summary()
    )
}

/// Split a reply into one suggestion per non-empty line, dropping bullet marks.
pub fn parse_suggestions(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(|line| line.trim_matches(|c: char| c == ' ' || c == '-' || c == '*' || c == '\t'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}
