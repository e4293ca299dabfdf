//! Error types for the featurizers.
//!
//! Every failure is a [`FeaturizerError`]. Messages always carry the name of
//! the offending parameter or map so a caller can tell which input was wrong.
//!
//! # Examples
//!
//! ```
//! use tf_idf_featurizer::error::{FeaturizerError, Result};
//!
//! fn check_norm(norm: &str) -> Result<()> {
//!     if norm != "l1" && norm != "l2" {
//!         return Err(FeaturizerError::invalid_argument("norm"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_norm("l3").is_err());
//! ```

use thiserror::Error;

/// The main error type for featurizer operations.
#[derive(Error, Debug)]
pub enum FeaturizerError {
    /// A constructor parameter is invalid (empty map, bad bound, unknown norm ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Finalization produced an empty map although documents were processed
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// A document matched no vocabulary term, so it cannot be normalized
    #[error("Empty document: the document contains no term of the vocabulary")]
    EmptyDocument,

    /// fit / complete_training called while the estimator is not training
    #[error("Not training: {0}")]
    NotTraining(String),

    /// Transformer or annotation requested before training finished
    #[error("Not finished: {0}")]
    NotFinished(String),

    /// Persisted state could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for operations that may fail with FeaturizerError.
pub type Result<T> = std::result::Result<T, FeaturizerError>;

impl FeaturizerError {
    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        FeaturizerError::InvalidArgument(msg.into())
    }

    /// Create a new empty result error.
    pub fn empty_result<S: Into<String>>(msg: S) -> Self {
        FeaturizerError::EmptyResult(msg.into())
    }

    /// Create a new not training error.
    pub fn not_training<S: Into<String>>(msg: S) -> Self {
        FeaturizerError::NotTraining(msg.into())
    }

    /// Create a new not finished error.
    pub fn not_finished<S: Into<String>>(msg: S) -> Self {
        FeaturizerError::NotFinished(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        FeaturizerError::Serialization(msg.into())
    }
}

impl From<serde_cbor::Error> for FeaturizerError {
    fn from(err: serde_cbor::Error) -> Self {
        FeaturizerError::Serialization(err.to_string())
    }
}
