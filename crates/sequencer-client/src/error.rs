//! Client error taxonomy.
//!
//! `Network` and `Parse` are the transient class: the fetcher retries them
//! with backoff before surfacing. Everything else is fatal for its scope;
//! registry errors abort construction, verification errors halt the stream.

use thiserror::Error;
use threshold_bls::{RegistryError, ThresholdError};

/// Convenience result alias
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, HTTP error status)
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body that could not be interpreted; treated like a
    /// transient transport fault, not a crash
    #[error("malformed response: {0}")]
    Parse(String),

    /// A finalization proof failed stake-threshold verification. Fatal:
    /// retrying cannot make forged or under-signed data valid.
    #[error("finalization proof rejected at index {index}")]
    InvalidSignature { index: u64 },

    /// The verifier itself could not run (unknown non-signer id, curve
    /// failure)
    #[error(transparent)]
    Verifier(#[from] ThresholdError),

    /// Operator records could not be turned into a registry snapshot
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The operator directory answered with zero operators
    #[error("operator directory returned no operators")]
    EmptyDirectory,

    /// Batch submission was not acknowledged
    #[error("batch submission rejected with status {0}")]
    Submission(reqwest::StatusCode),
}

impl ClientError {
    /// Whether the fetcher may retry after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Parse(_))
    }
}
