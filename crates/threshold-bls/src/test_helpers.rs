//! Helpers for generating operator sets and aggregate signatures in tests.

use crate::{
    hash_to_curve::try_and_increment::SHA256_HASH_TO_G1, PrivateKey, RawOperator, Signature,
};

use ark_bls12_381::{Fq, G1Projective};
use ark_ec::{CurveGroup, Group};
use ark_ff::PrimeField;
use ark_std::rand::RngCore;
use num_bigint::BigUint;

/// Generates `n` fresh private keys.
pub fn keygen<R: RngCore>(n: usize, rng: &mut R) -> Vec<PrivateKey> {
    (0..n).map(|_| PrivateKey::generate(rng)).collect()
}

/// Builds a directory-shaped record for the key, with decimal coordinate
/// strings as the directory serves them. `raw_stake` is the unscaled
/// 18-decimal stake.
pub fn raw_operator(id: &str, key: &PrivateKey, raw_stake: f64) -> RawOperator {
    let dec = |f: &Fq| BigUint::from(f.into_bigint()).to_str_radix(10);

    let g2 = key.to_public().as_ref().into_affine();
    let g1 = (G1Projective::generator() * *key.as_ref()).into_affine();

    RawOperator {
        id: id.to_string(),
        operator_id: format!("0x{}", hex::encode(id)),
        socket: format!("http://{id}.example:8000"),
        stake: format!("{raw_stake:.0}"),
        pubkey_g1_x: dec(&g1.x),
        pubkey_g1_y: dec(&g1.y),
        pubkey_g2_x: vec![dec(&g2.x.c0), dec(&g2.x.c1)],
        pubkey_g2_y: vec![dec(&g2.y.c0), dec(&g2.y.c1)],
    }
}

/// Signs `message` with every key and aggregates the result.
pub fn sign_aggregate(keys: &[PrivateKey], message: &[u8]) -> Signature {
    Signature::aggregate(
        keys.iter()
            .map(|k| k.sign(message, &*SHA256_HASH_TO_G1).expect("signing failed")),
    )
}
