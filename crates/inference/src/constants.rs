//! Inference-wide constants
//!
//! Single source of truth for backend URLs, endpoint paths and defaults.

/// Default values for backend configuration
pub mod defaults {
    /// Base URL of the hosted OpenAI API
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    /// Base URL of a local Ollama daemon
    pub const OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";
    /// Model used when none is configured
    pub const MODEL: &str = "gpt-4o-mini";
}

/// Endpoint paths relative to a backend base URL
pub mod endpoints {
    /// OpenAI-compatible chat completion endpoint
    pub const CHAT_COMPLETIONS: &str = "/v1/chat/completions";
    /// OpenAI-compatible model listing (used for health checks)
    pub const MODELS: &str = "/v1/models";
    /// Ollama's native model listing (used for health checks)
    pub const OLLAMA_TAGS: &str = "/api/tags";
}

/// Registered backend names
pub mod backends {
    pub const OPENAI: &str = "OpenAI";
    pub const OLLAMA: &str = "Ollama";
}
