//! Core error types

use thiserror::Error;

/// Pipeline stage at which a release payload could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    Base64,
    Decompress,
    Document,
}

impl std::fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeStage::Base64 => write!(f, "base64"),
            DecodeStage::Decompress => write!(f, "gzip"),
            DecodeStage::Document => write!(f, "document"),
        }
    }
}

/// A release payload that could not be turned into a `ReleaseRecord`.
///
/// Decoding either fully succeeds or fails with the stage that broke;
/// callers skip the record and carry on with the rest of the batch.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("base64 decode: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("gzip decompress: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("release document: {0}")]
    Document(#[from] serde_yaml::Error),

    #[error("release document: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    /// The pipeline stage that failed
    pub fn stage(&self) -> DecodeStage {
        match self {
            DecodeError::Base64(_) => DecodeStage::Base64,
            DecodeError::Decompress(_) => DecodeStage::Decompress,
            DecodeError::Document(_) | DecodeError::Json(_) => DecodeStage::Document,
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to decode release: {0}")]
    Decode(#[from] DecodeError),

    #[error("Failed to parse chart index: {message}")]
    IndexParse { message: String },

    #[error("Failed to serialize release: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
