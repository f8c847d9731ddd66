use crate::{BLSError, BlsResult};

use ark_bls12_381::{G1Affine, G1Projective};
use ark_ec::CurveGroup;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use std::borrow::Borrow;

/// A BLS signature (or aggregate signature) on G1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(G1Projective);

impl From<G1Projective> for Signature {
    fn from(sig: G1Projective) -> Signature {
        Signature(sig)
    }
}

impl AsRef<G1Projective> for Signature {
    fn as_ref(&self) -> &G1Projective {
        &self.0
    }
}

impl Signature {
    /// Sums the provided signatures to produce the aggregate signature.
    pub fn aggregate<S: Borrow<Signature>>(signatures: impl IntoIterator<Item = S>) -> Signature {
        signatures
            .into_iter()
            .map(|s| s.borrow().0)
            .sum::<G1Projective>()
            .into()
    }

    /// Compressed encoding of the signature point.
    pub fn to_bytes(&self) -> BlsResult<Vec<u8>> {
        let mut out = Vec::new();
        self.0.into_affine().serialize_compressed(&mut out)?;
        Ok(out)
    }

    /// Decodes a compressed signature point, validating curve and subgroup
    /// membership.
    pub fn from_bytes(bytes: &[u8]) -> BlsResult<Signature> {
        let point = G1Affine::deserialize_compressed(bytes)?;
        Ok(Signature(point.into()))
    }

    pub fn to_hex(&self) -> BlsResult<String> {
        Ok(hex::encode(self.to_bytes()?))
    }

    /// Decodes a hex-encoded compressed signature as carried in finalization
    /// proofs.
    pub fn from_hex(s: &str) -> BlsResult<Signature> {
        let bytes = hex::decode(s)
            .map_err(|_| BLSError::MalformedPoint(format!("invalid signature hex: {s:?}")))?;
        Signature::from_bytes(&bytes)
    }
}
