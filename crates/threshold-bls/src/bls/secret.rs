use crate::{BlsResult, HashToCurve, PublicKey, Signature, SIG_DOMAIN};

use ark_bls12_381::{Fr, G1Projective, G2Projective};
use ark_ec::Group;
use ark_std::rand::RngCore;
use ark_std::UniformRand;

/// A BLS private key, a scalar of the curve's prime-order subgroup.
#[derive(Clone, Debug)]
pub struct PrivateKey(Fr);

impl From<Fr> for PrivateKey {
    fn from(sk: Fr) -> PrivateKey {
        PrivateKey(sk)
    }
}

impl AsRef<Fr> for PrivateKey {
    fn as_ref(&self) -> &Fr {
        &self.0
    }
}

impl PrivateKey {
    pub fn generate<R: RngCore>(rng: &mut R) -> PrivateKey {
        PrivateKey(Fr::rand(rng))
    }

    /// Signs the message under the crate's signing domain.
    pub fn sign<H: HashToCurve<Output = G1Projective>>(
        &self,
        message: &[u8],
        hash_to_g1: &H,
    ) -> BlsResult<Signature> {
        let hash = hash_to_g1.hash(SIG_DOMAIN, message)?;
        Ok(Signature::from(hash * self.0))
    }

    pub fn to_public(&self) -> PublicKey {
        PublicKey::from(G2Projective::generator() * self.0)
    }
}
