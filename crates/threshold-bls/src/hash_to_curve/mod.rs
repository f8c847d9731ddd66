/// Try-and-increment hashing to G1, see the module docs.
pub mod try_and_increment;

use crate::BLSError;

/// Trait for hashing arbitrary data to a group element on an elliptic curve
pub trait HashToCurve {
    /// The type of the curve point being produced.
    type Output;

    /// Given a domain separator and a message, produces a hash of them which
    /// is a curve point.
    fn hash(&self, domain: &[u8], message: &[u8]) -> Result<Self::Output, BLSError>;
}
