//! provider settings, seeded from env for apps and demos.
//! the form controller itself reads no environment.

use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

use llm::{
    LLMProvider,
    builder::{LLMBackend, LLMBuilder},
    error::LLMError,
};

const DEFAULT_BACKEND: &str = "openai";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-5";

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderConfig {
    /// `llm` backend name, e.g. `openai`, `anthropic`, `ollama`.
    pub backend: String,
    /// unset means the backend's own default endpoint.
    pub base_url: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl ProviderConfig {
    /// `LLM_BACKEND`, `LLM_BASE_URL`, `LLM_MODEL`, `LLM_API_KEY` (falls back to
    /// `OPENAI_API_KEY`). unset or empty keeps the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(mut get: impl FnMut(&str) -> Option<String>) -> Self {
        let mut get = move |k: &str| get(k).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();
        if let Some(v) = get("LLM_BACKEND") {
            cfg.backend = v;
        }
        cfg.base_url = get("LLM_BASE_URL");
        if let Some(v) = get("LLM_MODEL") {
            cfg.model = v;
        }
        cfg.api_key = get("LLM_API_KEY").or_else(|| get("OPENAI_API_KEY"));
        cfg
    }

    fn is_openai(&self) -> bool {
        self.backend.eq_ignore_ascii_case("openai")
    }

    /// base url as handed to the builder; `None` leaves the backend default.
    /// openai-compatible endpoints need `/v1`.
    pub fn resolved_base_url(&self) -> Option<String> {
        if self.is_openai() {
            let base = self.base_url.as_deref().unwrap_or(DEFAULT_OPENAI_BASE_URL);
            Some(format!("{}/", normalize_oai_base(base)))
        } else {
            self.base_url.clone()
        }
    }

    pub fn build(&self) -> Result<Arc<dyn LLMProvider>, LLMError> {
        let backend = LLMBackend::from_str(&self.backend)
            .map_err(|e| LLMError::InvalidRequest(format!("unknown backend '{}': {e}", self.backend)))?;
        bevy::log::info!(
            target: "bevy_prompt_improver",
            "ProviderConfig::build: backend='{}', base_url={:?}, model='{}', key_present={}",
            self.backend, self.base_url, self.model, self.api_key.is_some()
        );
        let mut b = LLMBuilder::new().backend(backend).model(self.model.clone());
        if let Some(url) = self.resolved_base_url() {
            b = b.base_url(url);
        }
        if let Some(k) = &self.api_key {
            b = b.api_key(k.clone());
        }
        Ok(b.build()?.into())
    }
}

/// users might paste a base with or without `/v1`; the provider wants it.
pub fn normalize_oai_base(base: &str) -> String {
    let b = base.trim().trim_end_matches('/');
    if b.ends_with("/v1") {
        b.to_string()
    } else {
        format!("{}/v1", b)
    }
}
