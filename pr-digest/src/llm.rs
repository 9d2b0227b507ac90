#![doc = "LLM providers: implements the core's Summarizer against the OpenAI, Anthropic and Gemini HTTP APIs."]
//
//! # Summarization providers
//!
//! - [`build_summarizer`] picks a provider from [`LlmSettings`]. An unknown provider or a
//!   missing API key gives a [`DisabledSummarizer`], so the run falls back to the rule summary.
//! - Every provider sends the same system prompt and the same user prompt
//!   ([`build_summary_user_prompt`]) and returns the trimmed reply text, or `None` when the
//!   reply carries no text.
//! - A non-2xx response is an error carrying status and body; the digest logs it and
//!   falls back as well.

use std::str::FromStr;

use async_trait::async_trait;
use pr_digest_core::contract::{ClientError, Summarizer};
use pr_digest_core::summary::{build_summary_user_prompt, LlmInput, SUMMARY_SYSTEM_PROMPT};
use serde_json::{json, Value};

pub const DEFAULT_LLM_PROVIDER: &str = "openai";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-5.2";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3.0";

pub const OPENAI_API_URL: &str = "https://api.openai.com";
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 700;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "gemini" => Ok(Provider::Gemini),
            other => Err(format!("unknown LLM provider {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LlmSettings {
    pub provider: String,
    pub openai_api_key: String,
    pub anthropic_api_key: String,
    pub gemini_api_key: String,
    pub openai_model: String,
    pub anthropic_model: String,
    pub gemini_model: String,
}

/// Yields no summary. Used when no provider is configured.
pub struct DisabledSummarizer;

#[async_trait]
impl Summarizer for DisabledSummarizer {
    async fn summarize(&self, _input: &LlmInput) -> Result<Option<String>, ClientError> {
        Ok(None)
    }
}

pub fn build_summarizer(settings: &LlmSettings) -> Box<dyn Summarizer> {
    let provider = match settings.provider.parse::<Provider>() {
        Ok(provider) => provider,
        Err(e) => {
            tracing::warn!(error = %e, "LLM summary disabled");
            return Box::new(DisabledSummarizer);
        }
    };

    let (key, model) = match provider {
        Provider::OpenAi => (&settings.openai_api_key, &settings.openai_model),
        Provider::Anthropic => (&settings.anthropic_api_key, &settings.anthropic_model),
        Provider::Gemini => (&settings.gemini_api_key, &settings.gemini_model),
    };
    if key.is_empty() {
        tracing::warn!(?provider, "API key missing, LLM summary disabled");
        return Box::new(DisabledSummarizer);
    }

    tracing::info!(?provider, model = %model, "LLM summarizer configured");
    match provider {
        Provider::OpenAi => Box::new(OpenAiSummarizer::new(key, model)),
        Provider::Anthropic => Box::new(AnthropicSummarizer::new(key, model)),
        Provider::Gemini => Box::new(GeminiSummarizer::new(key, model)),
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `output_text` when present, else the first `output_text` item of the output content.
pub fn extract_openai_text(data: &Value) -> Option<String> {
    if let Some(text) = data.get("output_text").and_then(Value::as_str) {
        if let Some(text) = non_empty(text.to_string()) {
            return Some(text);
        }
    }
    data.get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .find(|content| content.get("type").and_then(Value::as_str) == Some("output_text"))
        .and_then(|content| content.get("text").and_then(Value::as_str))
        .and_then(|text| non_empty(text.to_string()))
}

/// All `text` content items joined by newlines.
pub fn extract_anthropic_text(data: &Value) -> Option<String> {
    let parts: Vec<&str> = data
        .get("content")?
        .as_array()?
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .collect();
    non_empty(parts.join("\n"))
}

/// The first candidate's part texts joined by newlines.
pub fn extract_gemini_text(data: &Value) -> Option<String> {
    let parts: Vec<&str> = data
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    non_empty(parts.join("\n"))
}

async fn read_json(provider: &str, response: reqwest::Response) -> Result<Value, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(provider, %status, body = %body, "LLM API error");
        return Err(format!("{provider} API error: {status} {body}").into());
    }
    Ok(response.json::<Value>().await?)
}

pub struct OpenAiSummarizer {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(api_key: &str, model: &str) -> Self {
        OpenAiSummarizer {
            http: reqwest::Client::new(),
            base_url: OPENAI_API_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, input: &LlmInput) -> Result<Option<String>, ClientError> {
        let body = json!({
            "model": self.model,
            "input": [
                { "role": "system", "content": SUMMARY_SYSTEM_PROMPT },
                { "role": "user", "content": build_summary_user_prompt(input) },
            ],
            "temperature": TEMPERATURE,
            "max_output_tokens": MAX_OUTPUT_TOKENS,
        });
        tracing::debug!(model = %self.model, "Requesting OpenAI summary");
        let response = self
            .http
            .post(format!("{}/v1/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let data = read_json("OpenAI", response).await?;
        Ok(extract_openai_text(&data))
    }
}

pub struct AnthropicSummarizer {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AnthropicSummarizer {
    pub fn new(api_key: &str, model: &str) -> Self {
        AnthropicSummarizer {
            http: reqwest::Client::new(),
            base_url: ANTHROPIC_API_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Summarizer for AnthropicSummarizer {
    async fn summarize(&self, input: &LlmInput) -> Result<Option<String>, ClientError> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "temperature": TEMPERATURE,
            "system": SUMMARY_SYSTEM_PROMPT,
            "messages": [
                { "role": "user", "content": build_summary_user_prompt(input) },
            ],
        });
        tracing::debug!(model = %self.model, "Requesting Anthropic summary");
        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;
        let data = read_json("Anthropic", response).await?;
        Ok(extract_anthropic_text(&data))
    }
}

pub struct GeminiSummarizer {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: &str, model: &str) -> Self {
        GeminiSummarizer {
            http: reqwest::Client::new(),
            base_url: GEMINI_API_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, input: &LlmInput) -> Result<Option<String>, ClientError> {
        let body = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": build_summary_user_prompt(input) }] },
            ],
            "systemInstruction": { "parts": [{ "text": SUMMARY_SYSTEM_PROMPT }] },
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            },
        });
        tracing::debug!(model = %self.model, "Requesting Gemini summary");
        let response = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;
        let data = read_json("Gemini", response).await?;
        Ok(extract_gemini_text(&data))
    }
}
