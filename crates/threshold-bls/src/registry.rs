//! Operator registry: turns raw directory records into an immutable
//! [`OperatorSet`] with a precomputed aggregate public key.

use crate::{BLSError, G1Key, PublicKey};

use std::collections::HashMap;
use thiserror::Error;

/// Raw stakes are 18-decimal fixed-point integers; dividing by this scale
/// yields the comparable stake weight.
pub const STAKE_SCALE: f64 = 1e18;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// A public key coordinate did not describe a valid curve point
    #[error("operator {operator} has a malformed public key: {source}")]
    MalformedKey {
        operator: String,
        #[source]
        source: BLSError,
    },
    /// Two records carried the same operator id
    #[error("duplicate operator id {0}")]
    DuplicateId(String),
    /// The raw stake was negative or not numeric
    #[error("operator {operator} has an invalid stake {raw:?}")]
    InvalidStake { operator: String, raw: String },
}

/// An operator record as served by the directory, before any validation.
#[derive(Clone, Debug)]
pub struct RawOperator {
    pub id: String,
    pub operator_id: String,
    pub socket: String,
    /// Decimal integer stake, scaled by 10^18
    pub stake: String,
    pub pubkey_g1_x: String,
    pub pubkey_g1_y: String,
    /// `[c0, c1]` limbs of the G2 x coordinate
    pub pubkey_g2_x: Vec<String>,
    /// `[c0, c1]` limbs of the G2 y coordinate
    pub pubkey_g2_y: Vec<String>,
}

/// A validated operator. Immutable once constructed.
#[derive(Clone, Debug)]
pub struct Operator {
    id: String,
    operator_id: String,
    socket: String,
    stake: f64,
    public_key_g1: G1Key,
    public_key_g2: PublicKey,
}

impl Operator {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn operator_id(&self) -> &str {
        &self.operator_id
    }

    /// Network endpoint advertised by the operator.
    pub fn socket(&self) -> &str {
        &self.socket
    }

    /// Stake weight, normalized from the raw 18-decimal integer.
    pub fn stake(&self) -> f64 {
        self.stake
    }

    pub fn public_key_g1(&self) -> &G1Key {
        &self.public_key_g1
    }

    pub fn public_key_g2(&self) -> &PublicKey {
        &self.public_key_g2
    }
}

/// The operator set at a directory snapshot, with the aggregate G2 key of
/// every member computed once at build time.
///
/// The set is immutable for its lifetime, which makes it safe to share
/// read-only behind an `Arc` across concurrently running streams. Membership
/// changes require building a fresh set.
#[derive(Clone, Debug)]
pub struct OperatorSet {
    operators: HashMap<String, Operator>,
    aggregate_public_key: PublicKey,
    total_stake: f64,
}

impl OperatorSet {
    /// Validates and normalizes the raw records, computing the aggregate
    /// public key over all members.
    pub fn build(records: Vec<RawOperator>) -> Result<OperatorSet, RegistryError> {
        let mut operators = HashMap::with_capacity(records.len());
        for record in records {
            let raw_stake: f64 =
                record
                    .stake
                    .trim()
                    .parse()
                    .map_err(|_| RegistryError::InvalidStake {
                        operator: record.id.clone(),
                        raw: record.stake.clone(),
                    })?;
            if !raw_stake.is_finite() || raw_stake < 0.0 {
                return Err(RegistryError::InvalidStake {
                    operator: record.id.clone(),
                    raw: record.stake.clone(),
                });
            }

            let malformed = |source: BLSError| RegistryError::MalformedKey {
                operator: record.id.clone(),
                source,
            };
            let public_key_g1 = G1Key::from_coordinates(&record.pubkey_g1_x, &record.pubkey_g1_y)
                .map_err(malformed)?;
            let public_key_g2 = PublicKey::from_limbs(&record.pubkey_g2_x, &record.pubkey_g2_y)
                .map_err(malformed)?;

            let operator = Operator {
                id: record.id,
                operator_id: record.operator_id,
                socket: record.socket,
                stake: raw_stake / STAKE_SCALE,
                public_key_g1,
                public_key_g2,
            };
            if let Some(previous) = operators.insert(operator.id.clone(), operator) {
                return Err(RegistryError::DuplicateId(previous.id));
            }
        }

        let aggregate_public_key =
            PublicKey::aggregate(operators.values().map(|o| &o.public_key_g2));
        let total_stake = operators.values().map(|o| o.stake).sum();
        Ok(OperatorSet {
            operators,
            aggregate_public_key,
            total_stake,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Operator> {
        self.operators.get(id)
    }

    pub fn operators(&self) -> impl Iterator<Item = &Operator> {
        self.operators.values()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Sum of all members' G2 public keys.
    pub fn aggregate_public_key(&self) -> &PublicKey {
        &self.aggregate_public_key
    }

    /// Sum of all members' normalized stake weights.
    pub fn total_stake(&self) -> f64 {
        self.total_stake
    }
}
