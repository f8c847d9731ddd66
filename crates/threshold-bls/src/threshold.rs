//! Stake-threshold verification of aggregate signatures.
//!
//! A finalization signature is accepted when the operators who did *not*
//! sign hold too little stake to block the threshold, and the aggregate
//! signature verifies against the aggregate public key with the declared
//! non-signers' keys subtracted out.

use crate::{
    hash_to_curve::try_and_increment::SHA256_HASH_TO_G1, BLSError, HashToCurve, OperatorSet,
    Signature,
};

use ark_bls12_381::G1Projective;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThresholdError {
    /// A declared non-signer id is not a member of the operator set
    #[error("unknown operator in non-signer list: {0}")]
    UnknownOperator(String),
    /// The underlying curve operations failed (not a plain rejection)
    #[error(transparent)]
    Bls(BLSError),
}

impl OperatorSet {
    /// Checks an aggregate signature over `message` against this set.
    ///
    /// `Ok(false)` covers both rejection cases: the declared non-signers
    /// hold more stake than `100 - threshold_percent` percent of the total
    /// (checked first, before any point arithmetic), or the pairing equation
    /// does not hold. Unknown non-signer ids fail fast with
    /// [`ThresholdError::UnknownOperator`] and no crypto work.
    ///
    /// The call is pure: identical inputs always produce identical output.
    pub fn verify(
        &self,
        message: &[u8],
        signature: &Signature,
        nonsigner_ids: &[String],
        threshold_percent: f64,
    ) -> Result<bool, ThresholdError> {
        self.verify_with(
            message,
            signature,
            nonsigner_ids,
            threshold_percent,
            &*SHA256_HASH_TO_G1,
        )
    }

    /// As [`verify`](Self::verify), with an explicit message hasher.
    pub fn verify_with<H: HashToCurve<Output = G1Projective>>(
        &self,
        message: &[u8],
        signature: &Signature,
        nonsigner_ids: &[String],
        threshold_percent: f64,
        hash_to_g1: &H,
    ) -> Result<bool, ThresholdError> {
        let nonsigners = nonsigner_ids
            .iter()
            .map(|id| {
                self.get(id)
                    .ok_or_else(|| ThresholdError::UnknownOperator(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total_stake = self.total_stake();
        if total_stake <= 0.0 {
            return Ok(false);
        }
        let nonsigner_stake: f64 = nonsigners.iter().map(|o| o.stake()).sum();
        if 100.0 * nonsigner_stake / total_stake > 100.0 - threshold_percent {
            return Ok(false);
        }

        let effective_key = nonsigners
            .iter()
            .fold(self.aggregate_public_key().clone(), |key, nonsigner| {
                &key - nonsigner.public_key_g2()
            });
        match effective_key.verify(message, signature, hash_to_g1) {
            Ok(()) => Ok(true),
            Err(BLSError::VerificationFailed) => Ok(false),
            Err(e) => Err(ThresholdError::Bls(e)),
        }
    }
}

/// Aggregate the public keys of every member except the declared
/// non-signers, without going through the precomputed aggregate. Slower than
/// the subtraction path; used to cross-check it in tests.
#[cfg(test)]
fn signer_key(set: &OperatorSet, nonsigner_ids: &[String]) -> crate::PublicKey {
    crate::PublicKey::aggregate(
        set.operators()
            .filter(|o| !nonsigner_ids.iter().any(|id| id == o.id()))
            .map(|o| o.public_key_g2()),
    )
}
