// src/parser/ai.rs
//! LLM-backed resume extraction. One HTTP call per parse, provider-shaped
//! payloads, and a JSON-out-of-prose response decoder with a regex fallback.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::types::ResumeFields;

const SYSTEM_PROMPT: &str = r#"You are an expert resume parser. Extract information from the resume text and return it as a JSON object.

Extract the following fields:
- name: The person's full name
- title: Professional title/headline (e.g., "Software Engineer", "Project Manager")
- contact: Contact information (email, phone, location, LinkedIn, website) - combine into one string with | separator
- summary: Professional summary or objective statement
- skills: List of skills (combine into comma-separated string)
- experience: Work experience (format as plain text with job titles, companies, dates, and bullet points)
- education: Education details (degrees, institutions, graduation years)
- certifications: Certifications and licenses
- projects: Notable projects
- languages: Languages spoken
- references: References information

Return ONLY valid JSON. If a field is not found, use an empty string ""."#;

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const MIN_TEXT_LEN: usize = 50;

static JSON_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Gemini,
    HuggingFace,
    Ollama,
    LmStudio,
    OpenAi,
    Custom,
}

impl AiProvider {
    pub fn default_model(self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini-1.5-flash",
            AiProvider::HuggingFace => "mistralai/Mistral-7B-Instruct-v0.3",
            AiProvider::Ollama => "llama3.2",
            AiProvider::LmStudio => "local-model",
            AiProvider::OpenAi => "gpt-3.5-turbo",
            AiProvider::Custom => "",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            AiProvider::Gemini => {
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
            }
            AiProvider::HuggingFace => "https://api-inference.huggingface.co/models",
            AiProvider::Ollama => "http://localhost:11434/api/chat",
            AiProvider::LmStudio => "http://localhost:1234/v1/chat/completions",
            AiProvider::OpenAi => "https://api.openai.com/v1/chat/completions",
            AiProvider::Custom => "",
        }
    }

    /// Local providers run without an API key.
    pub fn is_local(self) -> bool {
        matches!(self, AiProvider::Ollama | AiProvider::LmStudio)
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            AiProvider::Gemini => "gemini",
            AiProvider::HuggingFace => "huggingface",
            AiProvider::Ollama => "ollama",
            AiProvider::LmStudio => "lmstudio",
            AiProvider::OpenAi => "openai",
            AiProvider::Custom => "custom",
        };
        write!(f, "{}", id)
    }
}

impl FromStr for AiProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(AiProvider::Gemini),
            "huggingface" => Ok(AiProvider::HuggingFace),
            "ollama" => Ok(AiProvider::Ollama),
            "lmstudio" => Ok(AiProvider::LmStudio),
            "openai" => Ok(AiProvider::OpenAi),
            "custom" => Ok(AiProvider::Custom),
            other => anyhow::bail!("Unknown AI provider: {}", other),
        }
    }
}

/// Provider catalog entry for the API and CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub default_model: String,
    pub setup: String,
}

/// Persisted AI configuration (`~/.cvforge/ai_config.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    #[serde(default)]
    pub api_key: String,
    pub provider: AiProvider,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub endpoint: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self::new(AiProvider::Gemini)
    }
}

impl AiSettings {
    pub fn new(provider: AiProvider) -> Self {
        Self {
            api_key: std::env::var("AI_API_KEY").unwrap_or_default(),
            provider,
            model: provider.default_model().to_string(),
            endpoint: provider.default_endpoint().to_string(),
        }
    }

    fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".cvforge").join("ai_config.json"))
    }

    /// Load saved settings, falling back to defaults when no file exists.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<AiSettings>(&content) {
                Ok(mut settings) => {
                    if settings.model.is_empty() {
                        settings.model = settings.provider.default_model().to_string();
                    }
                    if settings.endpoint.is_empty() {
                        settings.endpoint = settings.provider.default_endpoint().to_string();
                    }
                    settings
                }
                Err(e) => {
                    warn!("Ignoring malformed AI config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write AI config: {}", path.display()))
    }
}

pub struct AiParser {
    client: reqwest::Client,
    settings: AiSettings,
}

impl AiParser {
    pub fn new(settings: AiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    /// Parse resume text through the configured provider.
    pub async fn parse_resume(&self, text: &str) -> Result<ResumeFields> {
        if text.trim().len() < MIN_TEXT_LEN {
            return Ok(ResumeFields::default());
        }

        info!(
            "Calling AI provider {} (model: {})",
            self.settings.provider, self.settings.model
        );

        let response = match self.settings.provider {
            AiProvider::Gemini => self.call_gemini(text).await?,
            AiProvider::HuggingFace => self.call_huggingface(text).await?,
            AiProvider::Ollama => self.call_ollama(text).await?,
            AiProvider::LmStudio | AiProvider::OpenAi | AiProvider::Custom => {
                self.call_chat_completions(text).await?
            }
        };

        Ok(Self::parse_response(&response))
    }

    async fn call_gemini(&self, text: &str) -> Result<String> {
        if self.settings.api_key.is_empty() {
            anyhow::bail!(
                "Gemini API key required. Get a free key at: https://makersuite.google.com/app/apikey"
            );
        }

        let url = AiProvider::Gemini
            .default_endpoint()
            .replace("gemini-1.5-flash", &self.settings.model);

        let payload = json!({
            "contents": [{
                "parts": [{
                    "text": format!("{}\n\nParse this resume:\n\n{}", SYSTEM_PROMPT, text)
                }]
            }],
            "generationConfig": {
                "temperature": 0.1,
                "maxOutputTokens": 2000
            }
        });

        let data = self
            .post_json(&url, &payload, &[("key", self.settings.api_key.as_str())], None)
            .await?;

        Ok(data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn call_huggingface(&self, text: &str) -> Result<String> {
        if self.settings.api_key.is_empty() {
            anyhow::bail!(
                "Hugging Face API key required. Get a free key at: https://huggingface.co/settings/tokens"
            );
        }

        let url = format!(
            "{}/{}",
            AiProvider::HuggingFace.default_endpoint(),
            self.settings.model
        );

        // Instruction-tuned prompt format
        let prompt = format!(
            "<s>[INST] {}\n\nParse this resume:\n\n{} [/INST]",
            SYSTEM_PROMPT, text
        );

        let payload = json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": 1500,
                "temperature": 0.1,
                "return_full_text": false
            }
        });

        let data = self
            .post_json(&url, &payload, &[], Some(&self.settings.api_key))
            .await?;

        if let Some(first) = data.as_array().and_then(|arr| arr.first()) {
            return Ok(first["generated_text"].as_str().unwrap_or_default().to_string());
        }
        Ok(data["generated_text"].as_str().unwrap_or_default().to_string())
    }

    async fn call_ollama(&self, text: &str) -> Result<String> {
        let payload = json!({
            "model": self.settings.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": format!("Parse this resume:\n\n{}", text)}
            ],
            "stream": false,
            "options": {
                "temperature": 0.1,
                "num_predict": 2000
            }
        });

        let data = self
            .post_json(&self.settings.endpoint, &payload, &[], None)
            .await?;

        Ok(data["message"]["content"].as_str().unwrap_or_default().to_string())
    }

    /// LM Studio, OpenAI and custom endpoints all speak the chat-completions
    /// shape; the response content location varies slightly.
    async fn call_chat_completions(&self, text: &str) -> Result<String> {
        if self.settings.provider == AiProvider::OpenAi && self.settings.api_key.is_empty() {
            anyhow::bail!("OpenAI API key required");
        }

        let payload = json!({
            "model": self.settings.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": format!("Parse this resume:\n\n{}", text)}
            ],
            "temperature": 0.1,
            "max_tokens": 2000
        });

        let bearer = if self.settings.api_key.is_empty() {
            None
        } else {
            Some(self.settings.api_key.as_str())
        };

        let data = self
            .post_json(&self.settings.endpoint, &payload, &[], bearer)
            .await?;

        if let Some(content) = data["choices"][0]["message"]["content"].as_str() {
            return Ok(content.to_string());
        }
        if let Some(content) = data["message"]["content"].as_str() {
            return Ok(content.to_string());
        }
        if let Some(content) = data["content"].as_str() {
            return Ok(content.to_string());
        }
        Ok(data.to_string())
    }

    async fn post_json(
        &self,
        url: &str,
        payload: &serde_json::Value,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<serde_json::Value> {
        let mut request = self.client.post(url).json(payload);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("AI request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("AI provider returned status {}: {}", status, body);
        }

        response
            .json::<serde_json::Value>()
            .await
            .context("Failed to parse AI provider response as JSON")
    }

    /// Decode the model's free-text answer: find the first `{...}` block and
    /// map its known keys, or fall back to regex field extraction.
    pub fn parse_response(response: &str) -> ResumeFields {
        if let Some(m) = JSON_BLOCK_RE.find(response) {
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(m.as_str()) {
                let mut fields = ResumeFields::default();
                for key in ResumeFields::KEYS {
                    let value = match &parsed[key] {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Array(items) => items
                            .iter()
                            .map(|v| match v {
                                serde_json::Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join(", "),
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    fields.set(key, value);
                }
                return fields;
            }
        }

        Self::extract_fields_fallback(response)
    }

    /// When the model did not return usable JSON, salvage what regex can find.
    fn extract_fields_fallback(text: &str) -> ResumeFields {
        let mut fields = ResumeFields::default();

        let mut contact_parts: Vec<String> = Vec::new();
        contact_parts.extend(
            EMAIL_RE
                .find_iter(text)
                .take(2)
                .map(|m| m.as_str().to_string()),
        );
        contact_parts.extend(
            PHONE_RE
                .find_iter(text)
                .take(2)
                .map(|m| m.as_str().trim().to_string()),
        );
        if !contact_parts.is_empty() {
            fields.contact = contact_parts.join(" | ");
        }

        for line in text.split('\n') {
            let trimmed = line.trim();
            if !trimmed.is_empty()
                && trimmed.len() < 50
                && !trimmed.contains(['@', '(', ')', '-'])
            {
                fields.name = trimmed.to_string();
                break;
            }
        }

        fields
    }

    /// Probe whether the configured provider is reachable/configured.
    pub async fn is_available(&self) -> bool {
        match self.settings.provider {
            AiProvider::Ollama => {
                let base = self.settings.endpoint.replace("/api/chat", "");
                self.probe(&base).await
            }
            AiProvider::LmStudio => {
                let base = self.settings.endpoint.replace("/v1/chat/completions", "");
                self.probe(&base).await
            }
            AiProvider::Custom => self.probe(&self.settings.endpoint).await,
            AiProvider::Gemini | AiProvider::HuggingFace | AiProvider::OpenAi => {
                !self.settings.api_key.is_empty()
            }
        }
    }

    async fn probe(&self, url: &str) -> bool {
        self.client
            .get(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

/// Static provider catalog.
pub fn available_providers() -> Vec<ProviderInfo> {
    vec![
        ProviderInfo {
            id: "gemini".to_string(),
            name: "Google Gemini (Free)".to_string(),
            description: "Free tier available (1500 requests/day)".to_string(),
            default_model: AiProvider::Gemini.default_model().to_string(),
            setup: "Get API key at: https://makersuite.google.com/app/apikey".to_string(),
        },
        ProviderInfo {
            id: "huggingface".to_string(),
            name: "Hugging Face (Free)".to_string(),
            description: "Free inference API".to_string(),
            default_model: AiProvider::HuggingFace.default_model().to_string(),
            setup: "Get API key at: https://huggingface.co/settings/tokens".to_string(),
        },
        ProviderInfo {
            id: "ollama".to_string(),
            name: "Ollama (Local/Free)".to_string(),
            description: "Run AI locally (requires Ollama installed)".to_string(),
            default_model: AiProvider::Ollama.default_model().to_string(),
            setup: "Install at: https://ollama.ai/ then run: ollama pull llama3.2".to_string(),
        },
        ProviderInfo {
            id: "lmstudio".to_string(),
            name: "LM Studio (Local/Free)".to_string(),
            description: "Run AI locally (requires LM Studio)".to_string(),
            default_model: AiProvider::LmStudio.default_model().to_string(),
            setup: "Install at: https://lmstudio.ai/".to_string(),
        },
        ProviderInfo {
            id: "openai".to_string(),
            name: "OpenAI API (Paid)".to_string(),
            description: "Cloud AI (requires API key, paid)".to_string(),
            default_model: AiProvider::OpenAi.default_model().to_string(),
            setup: "Get API key at: https://platform.openai.com/".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("gemini".parse::<AiProvider>().unwrap(), AiProvider::Gemini);
        assert_eq!("OLLAMA".parse::<AiProvider>().unwrap(), AiProvider::Ollama);
        assert!("watson".parse::<AiProvider>().is_err());
    }

    #[test]
    fn test_default_models() {
        assert_eq!(AiProvider::Ollama.default_model(), "llama3.2");
        assert_eq!(AiProvider::OpenAi.default_model(), "gpt-3.5-turbo");
        assert!(AiProvider::Ollama.is_local());
        assert!(!AiProvider::Gemini.is_local());
    }

    #[test]
    fn test_parse_response_json_in_prose() {
        let response = r#"Here is the extracted data:
{"name": "John Doe", "title": "Engineer", "skills": "Rust, Go", "contact": "john@x.com"}
Hope that helps!"#;
        let fields = AiParser::parse_response(response);
        assert_eq!(fields.name, "John Doe");
        assert_eq!(fields.title, "Engineer");
        assert_eq!(fields.skills, "Rust, Go");
        assert_eq!(fields.contact, "john@x.com");
        assert!(fields.summary.is_empty());
    }

    #[test]
    fn test_parse_response_joins_arrays() {
        let response = r#"{"name": "Ann", "skills": ["Rust", "SQL"], "languages": ["English", "French"]}"#;
        let fields = AiParser::parse_response(response);
        assert_eq!(fields.skills, "Rust, SQL");
        assert_eq!(fields.languages, "English, French");
    }

    #[test]
    fn test_parse_response_regex_fallback() {
        let response = "Sorry, I could not format that.\nJohn Doe\nReach him at john@x.com or 555-123-4567.";
        let fields = AiParser::parse_response(response);
        assert!(fields.contact.contains("john@x.com"));
        assert!(fields.contact.contains("555-123-4567"));
        // First short line without contact punctuation
        assert_eq!(fields.name, "Sorry, I could not format that.");
    }

    #[test]
    fn test_settings_defaults() {
        let settings = AiSettings::new(AiProvider::LmStudio);
        assert_eq!(settings.model, "local-model");
        assert!(settings.endpoint.contains("localhost:1234"));
    }

    #[tokio::test]
    async fn test_short_text_skips_provider_call() {
        let parser = AiParser::new(AiSettings::new(AiProvider::Ollama)).unwrap();
        let fields = parser.parse_resume("too short").await.unwrap();
        assert!(fields.is_empty());
    }
}
