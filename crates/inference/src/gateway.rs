//! Inference Gateway - Single entry point for all inference operations
//!
//! The gateway abstracts over different inference backends (OpenAI-compatible
//! servers, Ollama) providing a unified interface for the rest of the
//! application. It manages backend lifecycle, switching, and forwards requests
//! to the active backend.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::backend::{
    BackendCapabilities, BackendConfig, BackendError, BackendInfo, BackendRegistry,
    InferenceBackend,
};
use crate::types::{ChatRequest, ChatResponse, LLMStatus};

#[cfg(feature = "backend-openai")]
use crate::backend::OpenAiBackend;

/// Error types for gateway operations
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Backend switch failed: {0}")]
    SwitchFailed(String),
}

/// The single entry point for ALL inference operations.
///
/// Application code should only interact with InferenceGateway, never
/// with backends directly. The gateway handles backend lifecycle and
/// forwards requests to the active backend.
pub struct InferenceGateway {
    /// The currently active backend
    backend: Arc<RwLock<Box<dyn InferenceBackend>>>,
    /// Registry of available backends
    registry: BackendRegistry,
    /// Name of the current backend
    current_backend_name: Arc<RwLock<String>>,
    /// Last config the backend was started with (reused after a switch)
    last_config: Arc<RwLock<Option<BackendConfig>>>,
}

impl InferenceGateway {
    /// Create a new gateway with the OpenAI-compatible backend as the default
    #[cfg(feature = "backend-openai")]
    pub fn new() -> Self {
        Self::with_backend(Box::new(OpenAiBackend::new()), "OpenAI")
    }

    /// Create a new gateway with a specific backend
    pub fn with_backend(backend: Box<dyn InferenceBackend>, name: &str) -> Self {
        Self {
            backend: Arc::new(RwLock::new(backend)),
            registry: BackendRegistry::new(),
            current_backend_name: Arc::new(RwLock::new(name.to_string())),
            last_config: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the registry for backend information
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Get the name of the currently active backend
    pub async fn current_backend_name(&self) -> String {
        self.current_backend_name.read().await.clone()
    }

    /// Switch to a different backend
    ///
    /// This stops the current backend and creates a new instance
    /// of the specified backend. The backend is not started - call
    /// `start()` after switching to initialize it.
    pub async fn switch_backend(&self, name: &str) -> Result<(), GatewayError> {
        // Create new backend first to validate the name
        let new_backend = self
            .registry
            .create(name)
            .map_err(|e| GatewayError::SwitchFailed(e.to_string()))?;

        {
            let mut guard = self.backend.write().await;
            guard.stop();
            *guard = new_backend;
        }

        {
            let mut name_guard = self.current_backend_name.write().await;
            *name_guard = name.to_string();
        }

        log::info!("Switched to backend: {}", name);
        Ok(())
    }

    /// List all available backends with their info
    pub fn available_backends(&self) -> Vec<BackendInfo> {
        self.registry.list()
    }

    // ─── LIFECYCLE METHODS ──────────────────────────────────────────

    /// Start the current backend with the given configuration
    pub async fn start(&self, config: &BackendConfig) -> Result<(), GatewayError> {
        {
            let mut last_config = self.last_config.write().await;
            *last_config = Some(config.clone());
        }

        let mut guard = self.backend.write().await;
        guard.start(config).await.map_err(GatewayError::Backend)
    }

    /// Stop the current backend
    pub async fn stop(&self) {
        let mut guard = self.backend.write().await;
        guard.stop();
    }

    /// Get the last config passed to `start()`
    pub async fn last_config(&self) -> Option<BackendConfig> {
        self.last_config.read().await.clone()
    }

    /// Check if the current backend is ready
    pub async fn is_ready(&self) -> bool {
        let guard = self.backend.read().await;
        guard.is_ready()
    }

    /// Health check the current backend
    pub async fn health_check(&self) -> bool {
        let guard = self.backend.read().await;
        guard.health_check().await
    }

    /// Get the base URL of the current backend
    pub async fn base_url(&self) -> Option<String> {
        let guard = self.backend.read().await;
        guard.base_url()
    }

    /// Get capabilities of the current backend
    pub async fn capabilities(&self) -> BackendCapabilities {
        let guard = self.backend.read().await;
        guard.capabilities()
    }

    /// Status snapshot for display
    pub async fn status(&self) -> LLMStatus {
        LLMStatus {
            ready: self.is_ready().await,
            backend: self.current_backend_name().await,
            url: self.base_url().await,
        }
    }

    // ─── INFERENCE METHODS ──────────────────────────────────────────

    /// Run a single chat completion on the active backend
    pub async fn chat_completion(
        &self,
        request: &ChatRequest,
    ) -> Result<ChatResponse, GatewayError> {
        let guard = self.backend.read().await;
        if !guard.is_ready() {
            return Err(GatewayError::Backend(BackendError::NotReady));
        }
        guard
            .chat_completion(request)
            .await
            .map_err(GatewayError::Backend)
    }
}

#[cfg(feature = "backend-openai")]
impl Default for InferenceGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared gateway type for application state
pub type SharedGateway = Arc<InferenceGateway>;
