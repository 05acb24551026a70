//! the external completion call, behind a one-method trait.
//!
//! the plugin only ever sees `Completer`; the `llm`-backed adapter is one
//! implementation, tests and demos plug in their own.

use async_trait::async_trait;
use bevy::prelude::*;
use std::sync::Arc;

use llm::{
    LLMProvider,
    chat::{ChatMessage, ChatProvider},
    error::LLMError,
};

/// why a completion did not produce text. users only ever see the fixed
/// failure message; this detail is for logs and `ImproveFailed` readers.
#[derive(thiserror::Error, Debug)]
pub enum CompletionError {
    #[error("completion provider failed: {0}")]
    Provider(#[from] LLMError),
    #[error("completion response carried no text")]
    MissingText,
    #[error("completion task ended before settling: {0}")]
    Interrupted(String),
}

/// string in, string-or-failure out. exactly one attempt per call.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// `Completion` over any `llm` provider: one user message, one-shot `chat()`.
#[derive(Clone)]
pub struct LlmCompletion {
    provider: Arc<dyn LLMProvider>,
}

impl LlmCompletion {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Completion for LlmCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let messages = vec![ChatMessage::user().content(prompt.to_string()).build()];
        let resp = self.provider.chat(&messages).await?;
        resp.text().ok_or(CompletionError::MissingText)
    }
}

/// the completer the plugin dispatches to. insert before submitting.
#[derive(Resource, Clone)]
pub struct Completer {
    completion: Arc<dyn Completion>,
    kind: &'static str,
}

impl Completer {
    pub fn new<C: Completion + 'static>(completion: C) -> Self {
        let kind = std::any::type_name::<C>();
        info!(target: "bevy_prompt_improver", "Completer: {}", kind);
        Self { completion: Arc::new(completion), kind }
    }

    pub fn completion(&self) -> Arc<dyn Completion> {
        self.completion.clone()
    }

    /// concrete type name of the wrapped completion, for logs.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn from_provider(provider: Arc<dyn LLMProvider>) -> Self {
        Self::new(LlmCompletion::new(provider))
    }
}
