// SPDX-License-Identifier: MIT

//! Configuration loading and model-client bootstrap
//!
//! Settings come from an optional YAML file, then environment overrides,
//! then CLI flags (applied by the binary). The API key is resolved last and
//! may be prompted for interactively; none of this runs inside the chain.

use crate::adk::error::ConfigError;
use crate::adk::model::anthropic::{
    ModelClientConfig, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL_ID,
};
use crate::adk::model::GenerationConfig;
use crate::chain::executor::{ChainOptions, DEFAULT_TOPIC};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const MODEL_ENV: &str = "ANTHROPIC_MODEL";
pub const BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";

/// Top-level settings file
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChainConfig {
    /// Topic used when none is given on the command line
    pub default_topic: String,
    /// Anthropic model id
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Messages API root, e.g. a proxy
    pub base_url: Option<String>,
    pub diagram: DiagramConfig,
}

/// Where and how the workflow diagram is written
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DiagramConfig {
    pub enabled: bool,
    pub png_path: String,
    pub markdown_path: String,
    /// mermaid.ink-compatible rendering service
    pub renderer_url: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            default_topic: DEFAULT_TOPIC.to_string(),
            model: DEFAULT_MODEL_ID.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            base_url: None,
            diagram: DiagramConfig::default(),
        }
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            png_path: "workflow_graph.png".to_string(),
            markdown_path: "workflow_graph.md".to_string(),
            renderer_url: "https://mermaid.ink".to_string(),
        }
    }
}

impl ChainConfig {
    /// Load settings from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_yaml(&content)
    }

    /// Parse settings from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the chain cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_topic.trim().is_empty() {
            return Err(ConfigError::Empty("default_topic".to_string()));
        }
        Ok(())
    }

    /// Apply `ANTHROPIC_MODEL` / `ANTHROPIC_BASE_URL` from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.is_empty()) {
            self.model = model;
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = Some(url);
        }
    }

    /// Executor options derived from these settings
    pub fn chain_options(&self) -> Result<ChainOptions, ConfigError> {
        ChainOptions::new(
            self.default_topic.clone(),
            GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: Some(self.max_tokens),
                ..GenerationConfig::default()
            },
        )
    }

    /// Resolve the model client config, prompting on the terminal for the
    /// API key when it is not in the environment
    pub fn resolve_model_client(&self) -> Result<ModelClientConfig, ConfigError> {
        self.resolve_model_client_with(
            |key| std::env::var(key).ok(),
            |var| rpassword::prompt_password(format!("Enter value for {}: ", var)),
        )
    }

    /// [`Self::resolve_model_client`] with injectable environment and prompt
    pub fn resolve_model_client_with<E, P>(
        &self,
        lookup: E,
        prompt: P,
    ) -> Result<ModelClientConfig, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
        P: FnOnce(&str) -> std::io::Result<String>,
    {
        let api_key = match lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            Some(key) => key,
            None => {
                log::warn!("{} not set, asking on the terminal", API_KEY_ENV);
                prompt(API_KEY_ENV).map_err(|source| ConfigError::Prompt {
                    var: API_KEY_ENV.to_string(),
                    source,
                })?
            }
        };

        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::Empty(API_KEY_ENV.to_string()));
        }

        Ok(ModelClientConfig {
            api_key,
            model_name: self.model.clone(),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: self.max_tokens,
        })
    }
}
