//! Model invocation flows
//!
//! Each flow pairs a validated input type with an output type whose JSON
//! schema is declared to the model. A flow renders its instruction template,
//! dispatches exactly one chat completion through the inference gateway and
//! deserializes the reply into the output type.

use async_trait::async_trait;
use inference::{
    ChatMessage, ChatRequest, GatewayError, JsonSchemaSpec, ResponseFormat, SharedGateway,
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::bundle::Variant;
use crate::prompt;

/// Error types for flow execution
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("Model returned an unexpected response: {0}")]
    InvalidOutput(String),

    #[error("Schema error: {0}")]
    Schema(String),
}

// =============================================================================
// Inputs
// =============================================================================

fn require(value: &str, what: &str) -> Result<(), FlowError> {
    if value.trim().is_empty() {
        return Err(FlowError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(())
}

/// Input of both generation flows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        require(&self.prompt, "prompt")
    }
}

/// Input of the multi-file edit flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCodeRequest {
    /// Current code, serialized with section delimiters
    pub existing_code: String,
    pub prompt: String,
}

impl EditCodeRequest {
    pub fn validate(&self) -> Result<(), FlowError> {
        require(&self.prompt, "prompt")?;
        require(&self.existing_code, "existing code")
    }
}

/// Input of the component edit flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditComponentRequest {
    pub existing_component: String,
    pub existing_css: String,
    pub prompt: String,
}

impl EditComponentRequest {
    pub fn validate(&self) -> Result<(), FlowError> {
        require(&self.prompt, "prompt")?;
        if self.existing_component.trim().is_empty() && self.existing_css.trim().is_empty() {
            return Err(FlowError::InvalidInput(
                "existing code must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Outputs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GenerateCodeOutput {
    /// Body markup without <html>, <head> or <body> wrappers
    pub html: String,
    pub css: String,
    pub javascript: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateComponentOutput {
    /// Functional component named `App`
    pub react_component: String,
    pub css: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditCodeOutput {
    /// Complete code with every section framed by its delimiters
    pub modified_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditComponentOutput {
    pub modified_component: String,
    pub modified_css: String,
}

// =============================================================================
// Flow declarations
// =============================================================================

/// A named model call with a declared input and output contract
pub trait Flow {
    /// Schema name sent to the model
    const NAME: &'static str;
    type Input: Send + Sync;
    type Output: DeserializeOwned + JsonSchema;

    fn validate(input: &Self::Input) -> Result<(), FlowError>;
    fn instruction(input: &Self::Input) -> String;
}

pub struct GenerateCodeFlow;
pub struct GenerateComponentFlow;
pub struct EditCodeFlow;
pub struct EditComponentFlow;

impl Flow for GenerateCodeFlow {
    const NAME: &'static str = "generate_code";
    type Input = GenerateRequest;
    type Output = GenerateCodeOutput;

    fn validate(input: &GenerateRequest) -> Result<(), FlowError> {
        input.validate()
    }

    fn instruction(input: &GenerateRequest) -> String {
        prompt::generation_instruction(Variant::MultiFile, &input.prompt)
    }
}

impl Flow for GenerateComponentFlow {
    const NAME: &'static str = "generate_component";
    type Input = GenerateRequest;
    type Output = GenerateComponentOutput;

    fn validate(input: &GenerateRequest) -> Result<(), FlowError> {
        input.validate()
    }

    fn instruction(input: &GenerateRequest) -> String {
        prompt::generation_instruction(Variant::Component, &input.prompt)
    }
}

impl Flow for EditCodeFlow {
    const NAME: &'static str = "edit_code";
    type Input = EditCodeRequest;
    type Output = EditCodeOutput;

    fn validate(input: &EditCodeRequest) -> Result<(), FlowError> {
        input.validate()
    }

    fn instruction(input: &EditCodeRequest) -> String {
        prompt::edit_code_instruction(input)
    }
}

impl Flow for EditComponentFlow {
    const NAME: &'static str = "edit_component";
    type Input = EditComponentRequest;
    type Output = EditComponentOutput;

    fn validate(input: &EditComponentRequest) -> Result<(), FlowError> {
        input.validate()
    }

    fn instruction(input: &EditComponentRequest) -> String {
        prompt::edit_component_instruction(input)
    }
}

/// JSON schema of a flow's output type
pub fn output_schema<F: Flow>() -> Result<serde_json::Value, FlowError> {
    let root = schemars::schema_for!(F::Output);
    let mut value = serde_json::to_value(root).map_err(|e| FlowError::Schema(e.to_string()))?;
    if let Some(map) = value.as_object_mut() {
        map.remove("$schema");
    }
    Ok(value)
}

/// Drop a surrounding Markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (e.g. `json`) on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

// =============================================================================
// Code model
// =============================================================================

/// The four model operations the session depends on
#[async_trait]
pub trait CodeModel: Send + Sync {
    async fn generate_code(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateCodeOutput, FlowError>;

    async fn generate_component(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateComponentOutput, FlowError>;

    async fn edit_code(&self, request: &EditCodeRequest) -> Result<EditCodeOutput, FlowError>;

    async fn edit_component(
        &self,
        request: &EditComponentRequest,
    ) -> Result<EditComponentOutput, FlowError>;
}

/// Runs flows as chat completions through the inference gateway
pub struct GatewayCodeModel {
    gateway: SharedGateway,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl GatewayCodeModel {
    pub fn new(gateway: SharedGateway, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the chat request for a flow without sending it
    pub fn build_request<F: Flow>(&self, input: &F::Input) -> Result<ChatRequest, FlowError> {
        F::validate(input)?;

        let instruction = F::instruction(input);
        let system = format!(
            "Reply with a single JSON object matching the `{}` schema and nothing else.",
            F::NAME
        );
        let format = ResponseFormat::JsonSchema {
            json_schema: JsonSchemaSpec {
                name: F::NAME.to_string(),
                schema: output_schema::<F>()?,
                strict: false,
            },
        };

        Ok(ChatRequest::new(
            self.model.clone(),
            vec![ChatMessage::system(system), ChatMessage::user(instruction)],
        )
        .with_response_format(format)
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens))
    }

    /// Validate, dispatch once and decode
    pub async fn run<F: Flow>(&self, input: &F::Input) -> Result<F::Output, FlowError> {
        let request = self.build_request::<F>(input)?;
        log::info!("Dispatching '{}' flow to model '{}'", F::NAME, self.model);
        log::debug!(
            "'{}' instruction is {} bytes",
            F::NAME,
            request.messages.last().map_or(0, |m| m.content.len())
        );

        let response = self.gateway.chat_completion(&request).await.map_err(|e| {
            log::error!("'{}' flow failed: {}", F::NAME, e);
            FlowError::Gateway(e)
        })?;

        let content = response.content().ok_or_else(|| {
            log::error!("'{}' flow returned no choices", F::NAME);
            FlowError::InvalidOutput("response contained no message".to_string())
        })?;

        serde_json::from_str(strip_code_fence(content)).map_err(|e| {
            log::error!("'{}' flow returned malformed output: {}", F::NAME, e);
            FlowError::InvalidOutput(e.to_string())
        })
    }
}

#[async_trait]
impl CodeModel for GatewayCodeModel {
    async fn generate_code(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateCodeOutput, FlowError> {
        self.run::<GenerateCodeFlow>(request).await
    }

    async fn generate_component(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateComponentOutput, FlowError> {
        self.run::<GenerateComponentFlow>(request).await
    }

    async fn edit_code(&self, request: &EditCodeRequest) -> Result<EditCodeOutput, FlowError> {
        self.run::<EditCodeFlow>(request).await
    }

    async fn edit_component(
        &self,
        request: &EditComponentRequest,
    ) -> Result<EditComponentOutput, FlowError> {
        self.run::<EditComponentFlow>(request).await
    }
}
