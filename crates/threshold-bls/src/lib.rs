//! # Threshold BLS
//!
//! Stake-weighted aggregate BLS signature verification on BLS12-381.
//!
//! The crate has two layers. The `bls` and `hash_to_curve` modules hold the
//! curve-facing primitives: key and signature newtypes plus the pairing
//! equality check. The `registry` and `threshold` modules hold the operator
//! model built on top of them: an immutable [`OperatorSet`] with a
//! precomputed aggregate public key, and the threshold check that subtracts
//! declared non-signers before verifying.
//!
//! Curve types never escape this crate; consumers see only [`PublicKey`],
//! [`Signature`] and [`OperatorSet`].

/// BLS signing primitives
pub(crate) mod bls;
pub use bls::{G1Key, PrivateKey, PublicKey, Signature};

/// Hashing to curve utilities
pub mod hash_to_curve;
pub use hash_to_curve::HashToCurve;

/// Operator records and the immutable operator set
pub mod registry;
pub use registry::{Operator, OperatorSet, RawOperator, RegistryError};

/// Stake-threshold aggregate verification
pub mod threshold;
pub use threshold::ThresholdError;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use thiserror::Error;

/// Convenience result alias
pub type BlsResult<T> = std::result::Result<T, BLSError>;

/// Domain separator for signing messages
pub const SIG_DOMAIN: &[u8] = b"seqfinal";

#[derive(Debug, Error)]
/// Error type for the curve-facing primitives
pub enum BLSError {
    /// The pairing equality check did not hold
    #[error("signature verification failed")]
    VerificationFailed,
    /// No curve point was found within the attempt bound
    #[error("could not hash message to curve")]
    HashToCurveFailed,
    /// A coordinate did not describe a valid group element
    #[error("malformed curve point: {0}")]
    MalformedPoint(String),
    /// Compressed point encoding error
    #[error("{0}")]
    Serialization(#[from] ark_serialize::SerializationError),
}
