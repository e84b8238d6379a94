//! Ollama backend implementation
//!
//! This backend integrates with the Ollama daemon for inference. Chat requests
//! go through Ollama's OpenAI-compatible endpoint.

use async_trait::async_trait;

use super::{
    post_chat_completion, BackendCapabilities, BackendConfig, BackendError, InferenceBackend,
};
use crate::constants::{defaults, endpoints};
use crate::types::{ChatRequest, ChatResponse};

/// Ollama backend using the Ollama daemon
///
/// This backend communicates with an Ollama server via HTTP.
/// The daemon must already be running (`ollama serve`).
pub struct OllamaBackend {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    /// Base URL of the Ollama server
    base_url: Option<String>,
    /// Whether the backend is ready
    ready: bool,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: None,
            ready: false,
        }
    }

    /// Get static capabilities (for registry info before instantiation)
    pub fn static_capabilities() -> BackendCapabilities {
        BackendCapabilities {
            structured_output: true, // Via `response_format` on the OpenAI-compatible API
            requires_api_key: false,
            local: true,
        }
    }

    /// Check if Ollama is available on the system
    pub fn check_availability() -> (bool, Option<String>) {
        if which::which("ollama").is_ok() {
            (true, None)
        } else {
            (
                false,
                Some("Ollama not found in PATH. Install from ollama.com".to_string()),
            )
        }
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    fn description(&self) -> &'static str {
        "Already-running Ollama daemon, reached through its OpenAI-compatible endpoint"
    }

    fn capabilities(&self) -> BackendCapabilities {
        Self::static_capabilities()
    }

    async fn start(&mut self, config: &BackendConfig) -> Result<(), BackendError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| defaults::OLLAMA_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        // Check if Ollama is already running
        let health_url = format!("{}{}", &base_url, endpoints::OLLAMA_TAGS);
        match self.http_client.get(&health_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                self.base_url = Some(base_url);
                self.ready = true;
                log::info!("Connected to Ollama server");
                Ok(())
            }
            _ => Err(BackendError::StartupFailed(
                "Ollama server not running. Start with 'ollama serve'".to_string(),
            )),
        }
    }

    fn stop(&mut self) {
        self.base_url = None;
        self.ready = false;
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn health_check(&self) -> bool {
        if let Some(ref base_url) = self.base_url {
            let health_url = format!("{}{}", base_url, endpoints::OLLAMA_TAGS);
            match self.http_client.get(&health_url).send().await {
                Ok(resp) => resp.status().is_success(),
                Err(_) => false,
            }
        } else {
            false
        }
    }

    fn base_url(&self) -> Option<String> {
        self.base_url.clone()
    }

    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let base_url = self.base_url.as_ref().ok_or(BackendError::NotReady)?;
        post_chat_completion(&self.http_client, base_url, None, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name() {
        let backend = OllamaBackend::new();
        assert_eq!(backend.name(), "Ollama");
    }

    #[test]
    fn test_description_matches_behavior() {
        let description = OllamaBackend::new().description();
        assert!(description.contains("OpenAI-compatible"));
        assert!(!description.contains("pulled"));
    }

    #[test]
    fn test_capabilities() {
        let caps = OllamaBackend::static_capabilities();
        assert!(caps.local);
        assert!(!caps.requires_api_key);
        assert!(caps.structured_output);
    }

    #[test]
    fn test_not_ready_initially() {
        let backend = OllamaBackend::new();
        assert!(!backend.is_ready());
        assert!(backend.base_url().is_none());
    }

    #[tokio::test]
    async fn test_start_fails_without_daemon() {
        let mut backend = OllamaBackend::new();
        // Port 9 (discard) is never an Ollama server
        let config = BackendConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            api_key: None,
        };
        let result = backend.start(&config).await;
        assert!(matches!(result, Err(BackendError::StartupFailed(_))));
        assert!(!backend.is_ready());
    }
}
