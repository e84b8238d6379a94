//! Pluggable inference backend abstraction
//!
//! This module provides a trait-based abstraction for different text-model
//! servers (hosted OpenAI-compatible APIs, a local Ollama daemon). All backends
//! implement the same interface, allowing runtime switching between engines.

pub mod registry;

#[cfg(feature = "backend-openai")]
pub mod openai;

#[cfg(feature = "backend-ollama")]
pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(feature = "backend-openai", feature = "backend-ollama"))]
use crate::constants::endpoints;
use crate::types::{ChatRequest, ChatResponse};

#[cfg(feature = "backend-openai")]
pub use openai::OpenAiBackend;

#[cfg(feature = "backend-ollama")]
pub use ollama::OllamaBackend;

pub use registry::{BackendFactory, BackendRegistry};

/// Error types for backend operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend not ready")]
    NotReady,

    #[error("Startup failed: {0}")]
    StartupFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Capabilities that a backend may or may not support
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendCapabilities {
    /// Honors `response_format` with a JSON schema
    pub structured_output: bool,
    /// Requires an API key
    pub requires_api_key: bool,
    /// Runs on the local machine
    pub local: bool,
}

/// Backend information for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend identifier (e.g., "OpenAI", "Ollama")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Backend capabilities
    pub capabilities: BackendCapabilities,
    /// Whether this backend is available (dependencies met)
    pub available: bool,
    /// Reason if unavailable
    pub unavailable_reason: Option<String>,
}

/// Configuration for starting a backend
#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    /// Server base URL without the `/v1` suffix; backend default when unset
    pub base_url: Option<String>,
    /// Bearer token for hosted APIs
    pub api_key: Option<String>,
}

/// The core trait that all inference backends must implement.
///
/// Application code never calls a backend directly; requests go through
/// [`crate::InferenceGateway`], which forwards to whichever backend is active.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    // ─── IDENTITY ───────────────────────────────────────────────────

    /// Human-readable name for display
    fn name(&self) -> &'static str;

    /// Description of this backend
    fn description(&self) -> &'static str;

    /// What this backend supports
    fn capabilities(&self) -> BackendCapabilities;

    // ─── LIFECYCLE ──────────────────────────────────────────────────

    /// Connect the backend using the given configuration
    async fn start(&mut self, config: &BackendConfig) -> Result<(), BackendError>;

    /// Disconnect and forget the connection settings
    fn stop(&mut self);

    /// Is the backend ready to accept requests?
    fn is_ready(&self) -> bool;

    /// Health check - verify the backend is responding
    async fn health_check(&self) -> bool;

    /// Base URL requests are sent to, once started
    fn base_url(&self) -> Option<String>;

    // ─── INFERENCE ──────────────────────────────────────────────────

    /// Run a single non-streaming chat completion.
    ///
    /// One attempt only: transport and server errors are returned to the
    /// caller unchanged.
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;
}

/// POST a chat completion to an OpenAI-compatible endpoint and decode it.
#[cfg(any(feature = "backend-openai", feature = "backend-ollama"))]
pub(crate) async fn post_chat_completion(
    client: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
    request: &ChatRequest,
) -> Result<ChatResponse, BackendError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), endpoints::CHAT_COMPLETIONS);

    let mut builder = client.post(&url).json(request);
    if let Some(key) = api_key {
        builder = builder.bearer_auth(key);
    }

    log::debug!(
        "POST {} (model={}, messages={})",
        url,
        request.model,
        request.messages.len()
    );

    let response = builder.send().await.map_err(BackendError::Http)?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::Inference(format!(
            "API error {}: {}",
            status, body
        )));
    }

    response
        .json::<ChatResponse>()
        .await
        .map_err(|e| BackendError::Inference(format!("Failed to parse response: {}", e)))
}
