// SPDX-License-Identifier: MIT

//! Model module - defines the LLM model trait and its implementation
//!
//! This module provides the core Model trait and shared types.
//! The provider implementation lives in its own submodule:
//! - [anthropic] - Anthropic's Claude API

pub mod anthropic;

use crate::adk::error::ModelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    /// A single-part user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// A single-part model message
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// All text parts joined together; thinking blocks are skipped
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::Thinking(_) => None,
            })
            .collect()
    }
}

/// Parts of a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Part {
    /// Regular text output from the model
    Text(String),
    /// Thinking/reasoning content from extended-thinking models
    Thinking(String),
}

/// Core trait for LLM model implementations
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content, ModelError>;
}

/// Send a single prompt and return the raw text of the reply
pub async fn complete(
    model: &dyn Model,
    prompt: &str,
    config: Option<&GenerationConfig>,
) -> Result<String, ModelError> {
    let response = model
        .generate_content(&[Content::user(prompt)], config)
        .await?;
    Ok(response.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct EchoModel {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Model for EchoModel {
        async fn generate_content(
            &self,
            history: &[Content],
            _config: Option<&GenerationConfig>,
        ) -> Result<Content, ModelError> {
            let last = history.last().map(|c| c.text()).unwrap_or_default();
            self.seen.lock().unwrap().push(last.clone());
            Ok(Content {
                role: "model".to_string(),
                parts: vec![
                    Part::Thinking("hmm".to_string()),
                    Part::Text(format!("echo: {}", last)),
                ],
            })
        }
    }

    #[test]
    fn test_content_text_skips_thinking() {
        let content = Content {
            role: "model".to_string(),
            parts: vec![
                Part::Text("Hello".to_string()),
                Part::Thinking("ignored".to_string()),
                Part::Text(", world".to_string()),
            ],
        };
        assert_eq!(content.text(), "Hello, world");
    }

    #[test]
    fn test_content_text_empty() {
        let content = Content {
            role: "model".to_string(),
            parts: vec![],
        };
        assert_eq!(content.text(), "");
    }

    #[tokio::test]
    async fn test_complete_sends_user_prompt() {
        let model = EchoModel {
            seen: Mutex::new(vec![]),
        };

        let reply = complete(&model, "ping", None).await.unwrap();

        assert_eq!(reply, "echo: ping");
        assert_eq!(*model.seen.lock().unwrap(), vec!["ping".to_string()]);
    }
}
