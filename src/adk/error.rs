// SPDX-License-Identifier: MIT

//! Typed error handling for prompt-chain-rs
//!
//! Three families, matching how far each one is allowed to travel:
//! - [`ModelError`] - the model could not answer; fatal, ends the run
//! - [`ConfigError`] - bootstrap problems before any model call is made
//! - [`ExportError`] - diagram export trouble; logged and dropped

use thiserror::Error;

/// Model/LLM invocation errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Provider answered with a non-success status
    #[error("API error from {provider} (status {status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    /// Transport-level failure talking to the provider
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }
}

/// Configuration resolution errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Interactive secret prompt failed
    #[error("Failed to read {var} from the terminal: {source}")]
    Prompt {
        var: String,
        #[source]
        source: std::io::Error,
    },

    /// A required value resolved to an empty string
    #[error("{0} is empty")]
    Empty(String),
}

/// Diagram export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// Renderer could not produce an image
    #[error("Diagram renderer failed: {0}")]
    Render(String),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ModelError::api("Anthropic", 529, "overloaded");
        assert_eq!(
            err.to_string(),
            "API error from Anthropic (status 529): overloaded"
        );
    }

    #[test]
    fn test_config_error_from_yaml() {
        let yaml_err = serde_yaml::from_str::<u32>("not a number").unwrap_err();
        let err: ConfigError = yaml_err.into();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_export_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: ExportError = io.into();
        assert_eq!(err.to_string(), "read-only");
    }
}
