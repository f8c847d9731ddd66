//! The chained-batch fetch state machine.
//!
//! One fetcher instance drives one verification run: it polls the node for
//! batches after the last confirmed index, folds each batch into the
//! chaining hash in strict sequence order, and buffers everything until the
//! poll stream carries a finalization proof for the running index. Only
//! after that proof passes stake-threshold verification is the buffer
//! released, so a caller never observes unverified data.
//!
//! Transient transport faults (connection errors, missing or malformed
//! bodies) are retried with capped exponential backoff. A finalization
//! proof that fails verification is an integrity violation: the fetcher
//! halts permanently and surfaces the error exactly once.

use crate::chain::{chain_hash, ChainState};
use crate::config::{ClientConfig, RetryPolicy};
use crate::error::{ClientError, Result};
use crate::stream::CancelToken;
use crate::transport::{BatchTransport, FinalizationRecord, PollResponse};

use std::sync::Arc;
use std::time::Duration;
use threshold_bls::{OperatorSet, Signature};
use tracing::{debug, warn};

/// State tag bound into every finalization message.
const STATE_TAG: &str = "finalized";

/// A verified batch, yielded to the caller exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    /// Position in the global batch sequence
    pub index: u64,
    /// Opaque payload as submitted to the sequencer
    pub payload: String,
}

/// The canonical message operators sign for a finalization checkpoint.
/// Serialized as JSON with lexicographically ordered keys, so both sides
/// produce byte-identical text.
pub(crate) fn finalization_message(
    app_name: &str,
    index: u64,
    batch_hash: &str,
    chaining_hash: &str,
) -> String {
    serde_json::json!({
        "app_name": app_name,
        "state": STATE_TAG,
        "index": index,
        "hash": batch_hash,
        "chaining_hash": chaining_hash,
    })
    .to_string()
}

/// A poll response with its finalization signature already decoded.
struct ValidatedPoll {
    batches: Vec<String>,
    finalized: Option<Proof>,
    first_chaining_hash: Option<String>,
}

struct Proof {
    record: FinalizationRecord,
    signature: Signature,
}

/// Polls a node and accumulates the verified batch chain.
pub struct ChainedBatchFetcher<T> {
    transport: T,
    operators: Arc<OperatorSet>,
    app_name: String,
    threshold_percent: f64,
    retry: RetryPolicy,
    poll_interval: Duration,
    chain: ChainState,
    /// True until the first batch fixes the chaining hash; only set when no
    /// trusted seed was supplied
    needs_bootstrap: bool,
    pending: Vec<Batch>,
    confirmed: Option<ChainState>,
    halted: bool,
}

impl<T: BatchTransport> ChainedBatchFetcher<T> {
    /// Starts a run at `start_index`. With `seed` the chain continues from a
    /// chaining hash the caller already verified; without it, the first
    /// poll's server-supplied value is adopted (trust on first use).
    pub fn new(
        transport: T,
        operators: Arc<OperatorSet>,
        config: &ClientConfig,
        start_index: u64,
        seed: Option<String>,
    ) -> Self {
        let needs_bootstrap = seed.is_none();
        Self {
            transport,
            operators,
            app_name: config.app_name.clone(),
            threshold_percent: config.threshold_percent,
            retry: config.retry.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            chain: ChainState::new(start_index, seed.unwrap_or_default()),
            needs_bootstrap,
            pending: Vec::new(),
            confirmed: None,
            halted: false,
        }
    }

    /// Last checkpoint whose finalization proof verified.
    pub fn confirmed(&self) -> Option<&ChainState> {
        self.confirmed.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Runs poll rounds until a finalization proof covers the accumulated
    /// batches, then verifies it and releases the buffer. `Ok(None)` means
    /// the run was cancelled (or already halted); errors from a rejected
    /// proof are terminal.
    pub async fn next_round(&mut self, cancel: &CancelToken) -> Result<Option<Vec<Batch>>> {
        if self.halted {
            return Ok(None);
        }
        loop {
            if cancel.is_cancelled() {
                debug!("cancelled between poll rounds");
                return Ok(None);
            }
            let poll = match self.poll(self.chain.index(), cancel).await? {
                Some(poll) => poll,
                None => return Ok(None),
            };
            let quiet = poll.batches.is_empty();
            if let Some(batches) = self.accumulate(poll)? {
                return Ok(Some(batches));
            }
            if quiet {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
    }

    /// One poll with transient-failure retries. `Ok(None)` means cancelled.
    async fn poll(&self, after: u64, cancel: &CancelToken) -> Result<Option<ValidatedPoll>> {
        let mut attempt = 0u32;
        loop {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            let failure = match self.transport.finalized_batches(after).await {
                Ok(response) => match self.validate(response) {
                    Ok(poll) => return Ok(Some(poll)),
                    Err(e) => e,
                },
                Err(e) if e.is_transient() => e,
                Err(e) => return Err(e),
            };
            attempt += 1;
            if attempt >= self.retry.max_attempts {
                warn!(attempts = attempt, error = %failure, "poll retries exhausted");
                return Err(failure);
            }
            let delay = self.retry.delay_for_attempt(attempt);
            debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "transient poll failure, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Checks the response is complete enough to act on. Failures here are
    /// transient: a node serving partial data gets polled again.
    fn validate(&self, response: PollResponse) -> Result<ValidatedPoll> {
        let data = response
            .data
            .ok_or_else(|| ClientError::Parse("poll response carried no data".into()))?;
        if self.needs_bootstrap && !data.batches.is_empty() && data.first_chaining_hash.is_none() {
            return Err(ClientError::Parse(
                "bootstrap poll carried no first_chaining_hash".into(),
            ));
        }
        let finalized = match data.finalized {
            Some(record) => {
                let signature = Signature::from_hex(&record.finalization_signature)
                    .map_err(|e| ClientError::Parse(format!("finalization signature: {e}")))?;
                Some(Proof { record, signature })
            }
            None => None,
        };
        Ok(ValidatedPoll {
            batches: data.batches,
            finalized,
            first_chaining_hash: data.first_chaining_hash,
        })
    }

    /// Folds the returned batches into the chain in order. Returns the
    /// pending buffer once a proof covering the running index verifies;
    /// otherwise keeps buffering. Batches past the proof index are dropped
    /// and picked up by the next poll round.
    fn accumulate(&mut self, poll: ValidatedPoll) -> Result<Option<Vec<Batch>>> {
        let ValidatedPoll {
            batches,
            finalized,
            first_chaining_hash,
        } = poll;

        for payload in batches {
            if self.needs_bootstrap {
                let seed = first_chaining_hash.clone().ok_or_else(|| {
                    ClientError::Parse("bootstrap poll carried no first_chaining_hash".into())
                })?;
                self.chain = ChainState::new(self.chain.index() + 1, seed);
                self.needs_bootstrap = false;
            } else {
                self.chain.fold(&payload);
            }

            if let Some(proof) = finalized
                .as_ref()
                .filter(|p| p.record.index == self.chain.index())
            {
                let batch_hash = chain_hash(&payload);
                self.pending.push(Batch {
                    index: self.chain.index(),
                    payload,
                });
                self.check_finalization(proof, &batch_hash)?;
                self.confirmed = Some(self.chain.clone());
                debug!(
                    index = self.chain.index(),
                    released = self.pending.len(),
                    "checkpoint verified, releasing batches"
                );
                return Ok(Some(std::mem::take(&mut self.pending)));
            }

            self.pending.push(Batch {
                index: self.chain.index(),
                payload,
            });
        }

        debug!(
            buffered = self.pending.len(),
            index = self.chain.index(),
            "no covering finalization proof yet"
        );
        Ok(None)
    }

    /// Verifies the aggregate signature over the canonical checkpoint
    /// message, built from locally computed values: a checkpoint only
    /// verifies if our chain agrees with what the operators signed.
    fn check_finalization(&mut self, proof: &Proof, batch_hash: &str) -> Result<()> {
        let index = self.chain.index();
        let message = finalization_message(
            &self.app_name,
            index,
            batch_hash,
            self.chain.chaining_hash(),
        );
        match self.operators.verify(
            message.as_bytes(),
            &proof.signature,
            &proof.record.nonsigners,
            self.threshold_percent,
        ) {
            Ok(true) => {
                debug!(
                    index,
                    nonsigners = proof.record.nonsigners.len(),
                    "finalization proof verified"
                );
                Ok(())
            }
            Ok(false) => {
                warn!(index, "finalization proof rejected, halting");
                self.halted = true;
                Err(ClientError::InvalidSignature { index })
            }
            Err(e) => {
                warn!(index, error = %e, "verifier failed, halting");
                self.halted = true;
                Err(e.into())
            }
        }
    }
}
