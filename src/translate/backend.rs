use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::{Result, SyncError};

/// A text translation service, called once per entry
pub trait Translator {
    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
}

impl<F> Translator for F
where
    F: Fn(&str, &str, &str) -> Result<String>,
{
    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        self(text, source_lang, target_lang)
    }
}

pub const DEFAULT_GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Longest text the public endpoint accepts in one request
const MAX_TEXT_CHARS: usize = 5000;

/// Google Translate through the public `client=gtx` endpoint
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("i18n-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SyncError::backend)?;
        Ok(Self {
            client,
            endpoint: DEFAULT_GOOGLE_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Join the translated segments of a `translate_a/single` response
    fn parse_response(body: &str) -> Result<String> {
        let json: Value = serde_json::from_str(body)
            .map_err(|e| SyncError::backend(format!("unexpected response: {}", e)))?;

        let segments = json
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| SyncError::backend("response has no translation segments"))?;

        let translated: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();

        if translated.is_empty() {
            return Err(SyncError::backend("empty translation"));
        }
        Ok(translated)
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        if text.chars().count() > MAX_TEXT_CHARS {
            return Err(SyncError::backend(format!(
                "text is longer than {} characters",
                MAX_TEXT_CHARS
            )));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(SyncError::backend)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::backend(format!("HTTP {}", status)));
        }

        let body = response.text().map_err(SyncError::backend)?;
        Self::parse_response(&body)
    }
}
