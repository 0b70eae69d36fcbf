use super::{
    types::{ChatRequest, ChatResponse},
    ChatService,
};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use tracing::debug;

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    endpoint: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let api_key = cfg.api_key()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.service.timeout_seconds))
            .build()
            .with_context(|| "building HTTP client")?;
        Ok(Self {
            endpoint: format!(
                "{}/chat/completions",
                cfg.service.api_base.trim_end_matches('/')
            ),
            api_key,
            client,
        })
    }
}

impl ChatService for OpenAiClient {
    fn complete(&self, req: &ChatRequest) -> Result<String> {
        debug!("chat request model={} messages={}", req.model, req.messages.len());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("chat request timed out: {e}")
                } else if e.is_connect() {
                    anyhow!("cannot reach {}: {e}", self.endpoint)
                } else {
                    anyhow!("chat request failed: {e}")
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("service returned {}: {}", status.as_u16(), body));
        }

        let parsed: ChatResponse = response
            .json()
            .with_context(|| "parsing chat completion response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("chat completion carried no message content"))
    }
}
