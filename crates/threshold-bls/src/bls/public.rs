use crate::{BLSError, BlsResult, HashToCurve, Signature, SIG_DOMAIN};

use ark_bls12_381::{Bls12_381, Fq, Fq2, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{BigInteger384, PrimeField};
use ark_std::Zero;
use num_bigint::BigUint;

use std::{
    borrow::Borrow,
    ops::{Add, Sub},
    str::FromStr,
};

/// A BLS public key on G2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(G2Projective);

impl From<G2Projective> for PublicKey {
    fn from(pk: G2Projective) -> PublicKey {
        PublicKey(pk)
    }
}

impl AsRef<G2Projective> for PublicKey {
    fn as_ref(&self) -> &G2Projective {
        &self.0
    }
}

impl PublicKey {
    /// Sums the provided keys to produce the aggregate public key. Point
    /// addition is commutative, so the iteration order does not matter.
    pub fn aggregate<P: Borrow<PublicKey>>(keys: impl IntoIterator<Item = P>) -> PublicKey {
        keys.into_iter()
            .map(|k| k.borrow().0)
            .sum::<G2Projective>()
            .into()
    }

    /// Builds a key from decimal coordinate limbs `[c0, c1]` for x and y, as
    /// served by the operator directory. The point must be on the curve and
    /// in the prime-order subgroup.
    pub fn from_limbs(x: &[String], y: &[String]) -> BlsResult<PublicKey> {
        if x.len() != 2 || y.len() != 2 {
            return Err(BLSError::MalformedPoint(
                "G2 coordinate needs exactly two limbs".to_string(),
            ));
        }
        let x = Fq2::new(parse_fq(&x[0])?, parse_fq(&x[1])?);
        let y = Fq2::new(parse_fq(&y[0])?, parse_fq(&y[1])?);
        let point = G2Affine::new_unchecked(x, y);
        if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
            return Err(BLSError::MalformedPoint(
                "G2 point not in the prime-order subgroup".to_string(),
            ));
        }
        Ok(PublicKey(point.into()))
    }

    /// Verifies an (aggregate) signature on `message` under the signing
    /// domain, via the pairing equality `e(sig, -g2) * e(H(m), pk) == 1`.
    pub fn verify<H: HashToCurve<Output = G1Projective>>(
        &self,
        message: &[u8],
        signature: &Signature,
        hash_to_g1: &H,
    ) -> BlsResult<()> {
        let message_hash = hash_to_g1.hash(SIG_DOMAIN, message)?;
        let product = Bls12_381::multi_pairing(
            [
                signature.as_ref().into_affine(),
                message_hash.into_affine(),
            ],
            [-G2Affine::generator(), self.0.into_affine()],
        );
        if product.is_zero() {
            Ok(())
        } else {
            Err(BLSError::VerificationFailed)
        }
    }
}

impl Add<&PublicKey> for &PublicKey {
    type Output = PublicKey;

    fn add(self, other: &PublicKey) -> PublicKey {
        PublicKey(self.0 + other.0)
    }
}

impl Sub<&PublicKey> for &PublicKey {
    type Output = PublicKey;

    fn sub(self, other: &PublicKey) -> PublicKey {
        PublicKey(self.0 - other.0)
    }
}

/// An operator's G1 public key. Carried in the registry for completeness;
/// threshold verification only uses the G2 keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct G1Key(G1Projective);

impl From<G1Projective> for G1Key {
    fn from(p: G1Projective) -> G1Key {
        G1Key(p)
    }
}

impl AsRef<G1Projective> for G1Key {
    fn as_ref(&self) -> &G1Projective {
        &self.0
    }
}

impl G1Key {
    /// Builds a G1 key from decimal x and y coordinates.
    pub fn from_coordinates(x: &str, y: &str) -> BlsResult<G1Key> {
        let point = G1Affine::new_unchecked(parse_fq(x)?, parse_fq(y)?);
        if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
            return Err(BLSError::MalformedPoint(
                "G1 point not in the prime-order subgroup".to_string(),
            ));
        }
        Ok(G1Key(point.into()))
    }
}

/// Parses a decimal base-field element, rejecting values outside the field.
fn parse_fq(s: &str) -> BlsResult<Fq> {
    let digits = BigUint::from_str(s)
        .map_err(|_| BLSError::MalformedPoint(format!("not a decimal coordinate: {s:?}")))?;
    let repr = BigInteger384::try_from(digits)
        .map_err(|_| BLSError::MalformedPoint(format!("coordinate out of range: {s:?}")))?;
    Fq::from_bigint(repr)
        .ok_or_else(|| BLSError::MalformedPoint(format!("coordinate out of range: {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hash_to_curve::try_and_increment::SHA256_HASH_TO_G1, PrivateKey};
    use ark_std::UniformRand;
    use rand::thread_rng;

    #[test]
    fn aggregate_is_order_independent() {
        let rng = &mut thread_rng();
        let keys = (0..5)
            .map(|_| PrivateKey::generate(rng).to_public())
            .collect::<Vec<_>>();

        let forward = PublicKey::aggregate(&keys);
        let mut reversed = keys.clone();
        reversed.reverse();
        assert_eq!(forward, PublicKey::aggregate(&reversed));

        // pairwise folding gives the same point as the bulk sum
        let folded = keys
            .iter()
            .fold(PublicKey::from(G2Projective::zero()), |acc, k| &acc + k);
        assert_eq!(forward, folded);
    }

    #[test]
    fn add_then_sub_roundtrips() {
        let rng = &mut thread_rng();
        let a = PrivateKey::generate(rng).to_public();
        let b = PrivateKey::generate(rng).to_public();
        let sum = &a + &b;
        assert_eq!(&sum - &b, a);
    }

    #[test]
    fn aggregate_signature_verifies() {
        let rng = &mut thread_rng();
        let hasher = &*SHA256_HASH_TO_G1;
        let message = b"state checkpoint";

        let sk1 = PrivateKey::generate(rng);
        let sk2 = PrivateKey::generate(rng);
        let asig = Signature::aggregate([
            sk1.sign(message, hasher).unwrap(),
            sk2.sign(message, hasher).unwrap(),
        ]);

        let apk = PublicKey::aggregate([sk1.to_public(), sk2.to_public()]);
        apk.verify(message, &asig, hasher).unwrap();
        apk.verify(b"another message", &asig, hasher).unwrap_err();
        sk1.to_public().verify(message, &asig, hasher).unwrap_err();
    }

    #[test]
    fn limb_roundtrip_and_rejection() {
        let rng = &mut thread_rng();
        let pk = PrivateKey::generate(rng).to_public();
        let affine = pk.as_ref().into_affine();
        let dec = |f: &Fq| BigUint::from(f.into_bigint()).to_str_radix(10);

        let x = vec![dec(&affine.x.c0), dec(&affine.x.c1)];
        let y = vec![dec(&affine.y.c0), dec(&affine.y.c1)];
        assert_eq!(PublicKey::from_limbs(&x, &y).unwrap(), pk);

        // an off-curve point must be rejected
        let mut bad_y = y.clone();
        bad_y[0] = "7".to_string();
        assert!(PublicKey::from_limbs(&x, &bad_y).is_err());

        // non-decimal and oversized limbs must be rejected
        assert!(parse_fq("0xff").is_err());
        let too_big = (BigUint::from(1u8) << 400u32).to_str_radix(10);
        assert!(parse_fq(&too_big).is_err());
    }

    #[test]
    fn random_g1_coordinates_roundtrip() {
        let rng = &mut thread_rng();
        let point = G1Projective::rand(rng).into_affine();
        let dec = |f: &Fq| BigUint::from(f.into_bigint()).to_str_radix(10);
        let key = G1Key::from_coordinates(&dec(&point.x), &dec(&point.y)).unwrap();
        assert_eq!(key.as_ref().into_affine(), point);
    }
}
