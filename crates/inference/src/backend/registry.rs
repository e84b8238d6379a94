//! Backend registry for runtime backend discovery and instantiation
//!
//! The registry manages available backends and provides factory methods
//! to create backend instances. Backends are registered at compile time
//! via feature flags.

use std::collections::HashMap;

use super::{BackendError, BackendInfo, InferenceBackend};

#[cfg(feature = "backend-openai")]
use super::OpenAiBackend;

#[cfg(feature = "backend-ollama")]
use super::OllamaBackend;

#[cfg(any(feature = "backend-openai", feature = "backend-ollama"))]
use crate::constants::backends;

/// Factory trait for creating backend instances
pub trait BackendFactory: Send + Sync {
    /// Create a new backend instance
    fn create(&self) -> Result<Box<dyn InferenceBackend>, BackendError>;

    /// Get information about this backend
    fn info(&self) -> BackendInfo;
}

/// Factory for OpenAI-compatible backend
#[cfg(feature = "backend-openai")]
pub struct OpenAiFactory;

#[cfg(feature = "backend-openai")]
impl BackendFactory for OpenAiFactory {
    fn create(&self) -> Result<Box<dyn InferenceBackend>, BackendError> {
        Ok(Box::new(OpenAiBackend::new()))
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: backends::OPENAI.to_string(),
            description: "OpenAI-compatible chat completion API".to_string(),
            capabilities: OpenAiBackend::static_capabilities(),
            available: true,
            unavailable_reason: None,
        }
    }
}

/// Factory for Ollama backend
#[cfg(feature = "backend-ollama")]
pub struct OllamaFactory;

#[cfg(feature = "backend-ollama")]
impl BackendFactory for OllamaFactory {
    fn create(&self) -> Result<Box<dyn InferenceBackend>, BackendError> {
        Ok(Box::new(OllamaBackend::new()))
    }

    fn info(&self) -> BackendInfo {
        let (available, unavailable_reason) = OllamaBackend::check_availability();
        BackendInfo {
            name: backends::OLLAMA.to_string(),
            description: OllamaBackend::new().description().to_string(),
            capabilities: OllamaBackend::static_capabilities(),
            available,
            unavailable_reason,
        }
    }
}

/// Registry of available inference backends
///
/// Backends are registered at compile time based on feature flags.
/// At runtime, the registry can list available backends and create
/// instances on demand.
pub struct BackendRegistry {
    factories: HashMap<String, Box<dyn BackendFactory>>,
}

impl BackendRegistry {
    /// Create a new registry with all available backends registered
    pub fn new() -> Self {
        #[cfg_attr(
            not(any(feature = "backend-openai", feature = "backend-ollama")),
            allow(unused_mut)
        )]
        let mut registry = Self {
            factories: HashMap::new(),
        };

        #[cfg(feature = "backend-openai")]
        registry.register(backends::OPENAI, Box::new(OpenAiFactory));

        #[cfg(feature = "backend-ollama")]
        registry.register(backends::OLLAMA, Box::new(OllamaFactory));

        registry
    }

    /// Register a backend factory
    pub fn register(&mut self, name: &str, factory: Box<dyn BackendFactory>) {
        self.factories.insert(name.to_string(), factory);
    }

    /// List all available backend names, sorted
    pub fn available_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get information about all registered backends
    pub fn list(&self) -> Vec<BackendInfo> {
        self.factories.values().map(|f| f.info()).collect()
    }

    /// Create a backend instance by name
    pub fn create(&self, name: &str) -> Result<Box<dyn InferenceBackend>, BackendError> {
        self.factories
            .get(name)
            .ok_or_else(|| BackendError::Config(format!("Unknown backend: {}", name)))?
            .create()
    }

    /// Check if a backend is registered
    pub fn is_available(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
