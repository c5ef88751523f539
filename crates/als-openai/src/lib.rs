//! OpenAI adapter (digest summarization).
//!
//! Uses the OpenAI `chat/completions` endpoint; implements the `als-core`
//! CompletionClient port.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use als_core::{
    errors::Error,
    ports::{CompletionClient, CompletionRequest},
    Result,
};

#[derive(Clone, Debug)]
pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("reqwest client build: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            http,
        })
    }

    fn request_body(&self, req: &CompletionRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": req.prompt }],
            "max_tokens": req.max_tokens,
            "temperature": req.temperature,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, req: CompletionRequest) -> Result<String> {
        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(&req))
            .send()
            .await
            .map_err(|e| Error::Completion(format!("openai request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Completion(format!(
                "openai completion failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let v: Value = resp
            .json()
            .await
            .map_err(|e| Error::Completion(format!("openai json error: {e}")))?;

        if let Some(usage) = v.get("usage") {
            debug!(model = %self.model, %usage, "completion usage");
        }

        extract_message_text(&v)
    }
}

/// Text of the first choice; empty or missing text counts as a failure.
fn extract_message_text(v: &Value) -> Result<String> {
    let text = v
        .pointer("/choices/0/message/content")
        .and_then(|t| t.as_str())
        .unwrap_or("")
        .trim();

    if text.is_empty() {
        return Err(Error::Completion(
            "openai completion returned empty text".to_string(),
        ));
    }
    Ok(text.to_string())
}
