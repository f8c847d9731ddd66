//! The chaining hash that binds each batch to all prior batches.
//!
//! This is chain-integrity bookkeeping, not cryptography: the hash is a fast
//! 64-bit xxHash over UTF-8 text. The cryptographic statement about the
//! chain is made by the operators' aggregate signature over the checkpoint
//! message, which embeds the chaining hash computed here.

use std::hash::Hasher;
use twox_hash::XxHash64;

/// 64-bit xxHash of the input, rendered as 16 lowercase hex characters.
pub fn chain_hash(input: &str) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(input.as_bytes());
    format!("{:016x}", hasher.finish())
}

/// Position in the verified chain: the last index folded in and the
/// chaining hash at that index.
///
/// The fold is strictly sequential; `fold` is the only way to advance the
/// regular chain, one batch at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainState {
    index: u64,
    chaining_hash: String,
}

impl ChainState {
    /// Starts a chain at `index` from a seed chaining hash the caller
    /// already trusts (empty string for a genesis chain).
    pub fn new(index: u64, chaining_hash: impl Into<String>) -> Self {
        Self {
            index,
            chaining_hash: chaining_hash.into(),
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn chaining_hash(&self) -> &str {
        &self.chaining_hash
    }

    /// Folds the next batch into the chain:
    /// `hash[i] = H(hash[i-1] + H(batch[i]))`.
    pub fn fold(&mut self, batch: &str) {
        self.index += 1;
        self.chaining_hash = chain_hash(&format!("{}{}", self.chaining_hash, chain_hash(batch)));
    }
}
