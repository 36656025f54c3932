//! The three playbook roles and the gateway client they share.
//!
//! Every role sends the same request shape: one system message holding its
//! fixed instruction and one user message holding the rendered playbook and
//! task data. Roles read the playbook; they never mutate it.

pub mod curator;
pub mod generator;
pub mod prompts;
pub mod reflector;

pub use crate::parser::RoleOutput;
pub use curator::{Curator, CuratorOutput};
pub use generator::{Generator, GeneratorOutput};
pub use reflector::{Reflector, ReflectorOutput};

use ace_core::provider::{Provider, ProviderRequest, Usage};
use ace_core::Result;
use std::sync::Arc;
use tracing::debug;

use crate::parser::parse_response;

/// A decoded role output plus what the gateway reported about the call.
#[derive(Debug, Clone)]
pub struct Completion<T> {
    pub output: T,
    pub usage: Usage,
    pub model: String,
}

/// Gateway handle and sampling settings shared by the roles.
#[derive(Clone)]
pub struct RoleClient {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl RoleClient {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One blocking round trip: send, await the full text, decode.
    pub async fn call<T: RoleOutput>(&self, instruction: &str, data: String) -> Result<Completion<T>> {
        let request = ProviderRequest::new(&self.model, instruction, data)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let response = self.provider.complete(request).await?;
        debug!(
            record = T::RECORD,
            model = %response.model,
            chars = response.message.content.len(),
            "Gateway replied"
        );

        let output = parse_response::<T>(&response.message.content)?;
        Ok(Completion {
            output,
            usage: response.usage.unwrap_or_default(),
            model: response.model,
        })
    }
}
