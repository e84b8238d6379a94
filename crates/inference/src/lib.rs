//! Multi-backend text-model inference library
//!
//! This library provides a unified interface for different text-model servers:
//! - **OpenAI-compatible**: the hosted OpenAI API or any server speaking the
//!   same `/v1/chat/completions` protocol (default)
//! - **Ollama**: Integration with the Ollama daemon
//!
//! # Example
//!
//! ```rust,ignore
//! use inference::{BackendConfig, ChatMessage, ChatRequest, InferenceGateway};
//!
//! let gateway = InferenceGateway::new();
//! gateway
//!     .start(&BackendConfig {
//!         api_key: Some(key),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let request = ChatRequest::new("gpt-4o-mini", vec![ChatMessage::user("Hello")]);
//! let response = gateway.chat_completion(&request).await?;
//! ```

pub mod backend;
pub mod constants;
pub mod gateway;
pub mod types;

// Re-exports for convenience
pub use backend::{
    BackendCapabilities, BackendConfig, BackendError, BackendFactory, BackendInfo,
    BackendRegistry, InferenceBackend,
};

#[cfg(feature = "backend-openai")]
pub use backend::OpenAiBackend;

#[cfg(feature = "backend-ollama")]
pub use backend::OllamaBackend;

pub use gateway::{GatewayError, InferenceGateway, SharedGateway};
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, Choice, JsonSchemaSpec, LLMStatus, ResponseFormat,
    Role,
};
