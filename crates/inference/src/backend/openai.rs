//! OpenAI-compatible backend implementation
//!
//! Talks to any server exposing `/v1/chat/completions`: the hosted OpenAI API,
//! LM Studio, vLLM, a llama.cpp server, or an API gateway in front of them.

use async_trait::async_trait;

use super::{
    post_chat_completion, BackendCapabilities, BackendConfig, BackendError, InferenceBackend,
};
use crate::constants::{defaults, endpoints};
use crate::types::{ChatRequest, ChatResponse};

/// Backend for OpenAI-compatible HTTP servers
pub struct OpenAiBackend {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    /// Base URL of the server (set on start)
    base_url: Option<String>,
    /// Bearer token, if the server needs one
    api_key: Option<String>,
    /// Whether the backend is ready
    ready: bool,
}

impl OpenAiBackend {
    /// Create a new, unconnected backend
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: None,
            api_key: None,
            ready: false,
        }
    }

    /// Get static capabilities (for registry info before instantiation)
    pub fn static_capabilities() -> BackendCapabilities {
        BackendCapabilities {
            structured_output: true,
            requires_api_key: true,
            local: false,
        }
    }
}

impl Default for OpenAiBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn description(&self) -> &'static str {
        "OpenAI-compatible chat completion API (hosted or self-served)."
    }

    fn capabilities(&self) -> BackendCapabilities {
        Self::static_capabilities()
    }

    async fn start(&mut self, config: &BackendConfig) -> Result<(), BackendError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| defaults::OPENAI_BASE_URL.to_string());

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(BackendError::Config(format!(
                "Base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        // Hosted OpenAI rejects anonymous requests; self-served servers usually don't care.
        if config.api_key.is_none() && base_url == defaults::OPENAI_BASE_URL {
            return Err(BackendError::Config(
                "An API key is required for the hosted OpenAI API".to_string(),
            ));
        }

        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self.api_key = config.api_key.clone();
        self.ready = true;
        log::info!(
            "OpenAI-compatible backend configured for {}",
            self.base_url.as_deref().unwrap_or_default()
        );
        Ok(())
    }

    fn stop(&mut self) {
        self.base_url = None;
        self.api_key = None;
        self.ready = false;
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn health_check(&self) -> bool {
        let Some(ref base_url) = self.base_url else {
            return false;
        };

        let url = format!("{}{}", base_url, endpoints::MODELS);
        let mut builder = self.http_client.get(&url);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        match builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                log::warn!("Health check against {} failed: {}", url, e);
                false
            }
        }
    }

    fn base_url(&self) -> Option<String> {
        self.base_url.clone()
    }

    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let base_url = self.base_url.as_ref().ok_or(BackendError::NotReady)?;
        post_chat_completion(&self.http_client, base_url, self.api_key.as_deref(), request).await
    }
}
