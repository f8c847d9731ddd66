//! Implementation of the `MapToGroup` algorithm (Paragraph 3.3) of
//! [this paper](https://link.springer.com/content/pdf/10.1007/3-540-45682-1_30.pdf).
//!
//! The digest of the data along with a counter is interpreted as an x
//! coordinate. If a curve point exists for it, the point is scaled into the
//! prime-order subgroup and returned; if not, the counter is incremented and
//! the digest recomputed.
//!
//! **This algorithm is not constant time**, which is acceptable here: it only
//! ever runs over public finalization messages.

use super::HashToCurve;
use crate::BLSError;

use ark_bls12_381::{Fq, G1Affine, G1Projective};
use ark_ec::AffineRepr;
use ark_ff::PrimeField;
use log::trace;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use std::marker::PhantomData;

const NUM_TRIES: u8 = 255;

/// SHA-256 based try-and-increment hasher to BLS12-381 G1.
pub static SHA256_HASH_TO_G1: Lazy<TryAndIncrement<Sha256>> = Lazy::new(TryAndIncrement::new);

/// A try-and-increment method for hashing to G1, generic over the digest
/// producing the point candidates.
#[derive(Clone, Debug)]
pub struct TryAndIncrement<D> {
    digest: PhantomData<D>,
}

impl<D: Digest> TryAndIncrement<D> {
    pub fn new() -> Self {
        TryAndIncrement {
            digest: PhantomData,
        }
    }
}

impl<D: Digest> Default for TryAndIncrement<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest> HashToCurve for TryAndIncrement<D> {
    type Output = G1Projective;

    fn hash(&self, domain: &[u8], message: &[u8]) -> Result<G1Projective, BLSError> {
        self.hash_with_attempt(domain, message).map(|res| res.0)
    }
}

impl<D: Digest> TryAndIncrement<D> {
    /// Hashes the input, returning the point and the counter value that
    /// produced it.
    pub fn hash_with_attempt(
        &self,
        domain: &[u8],
        message: &[u8],
    ) -> Result<(G1Projective, usize), BLSError> {
        for c in 0..NUM_TRIES {
            let candidate = D::new()
                .chain_update(domain)
                .chain_update([c])
                .chain_update(message)
                .finalize();
            let x = Fq::from_be_bytes_mod_order(candidate.as_ref());
            let greatest = candidate.as_ref()[0] & 1 == 1;

            if let Some(point) = G1Affine::get_point_from_x_unchecked(x, greatest) {
                let scaled = point.clear_cofactor();
                if scaled.is_zero() {
                    continue;
                }
                trace!(
                    "succeeded hashing \"{}\" to curve in {} tries",
                    hex::encode(message),
                    c
                );
                return Ok((scaled.into_group(), c as usize));
            }
        }
        Err(BLSError::HashToCurveFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SIG_DOMAIN;
    use ark_std::Zero;

    #[test]
    fn hash_is_deterministic() {
        let hasher = &*SHA256_HASH_TO_G1;
        let a = hasher.hash(SIG_DOMAIN, b"batch contents").unwrap();
        let b = hasher.hash(SIG_DOMAIN, b"batch contents").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_inputs_produce_distinct_points() {
        let hasher = &*SHA256_HASH_TO_G1;
        let a = hasher.hash(SIG_DOMAIN, b"one").unwrap();
        let b = hasher.hash(SIG_DOMAIN, b"two").unwrap();
        let c = hasher.hash(b"otherdom", b"one").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn output_is_a_subgroup_element() {
        let (point, _) = SHA256_HASH_TO_G1
            .hash_with_attempt(SIG_DOMAIN, b"subgroup check")
            .unwrap();
        assert!(!point.is_zero());
        use ark_ec::CurveGroup;
        let affine = point.into_affine();
        assert!(affine.is_on_curve());
        assert!(affine.is_in_correct_subgroup_assuming_on_curve());
    }
}
