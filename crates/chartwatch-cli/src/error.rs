//! CLI error types with exit code handling
//!
//! Library errors are folded into a single type here so that `main` can
//! render them with miette and pick the process exit code.

use chartwatch_rancher::RancherError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Required setting missing or malformed
    #[error("Configuration error: {message}")]
    #[diagnostic(code(chartwatch::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The management server could not be queried
    #[error("Rancher error: {message}")]
    #[diagnostic(code(chartwatch::cli::rancher))]
    Rancher {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Report could not be serialized
    #[error("Output error: {message}")]
    #[diagnostic(code(chartwatch::cli::output))]
    Output { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(chartwatch::cli::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Rancher { .. } => exit_codes::ERROR,
            CliError::Output { .. } => exit_codes::ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<RancherError> for CliError {
    fn from(err: RancherError) -> Self {
        match err {
            RancherError::InvalidConfig(message) => CliError::config_with_help(
                message,
                "Set RANCHER_URL and RANCHER_TOKEN, or pass --url and --token",
            ),
            RancherError::InvalidUrl(e) => CliError::config_with_help(
                format!("invalid Rancher URL: {}", e),
                "Expected the management API base, e.g. https://rancher.example.com/v3",
            ),
            RancherError::AuthFailed { .. } => CliError::Rancher {
                message: err.to_string(),
                help: Some("Create a new API key in Rancher under Account & API Keys".to_string()),
            },
            other => CliError::Rancher {
                message: other.to_string(),
                help: None,
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
