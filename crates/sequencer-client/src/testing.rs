//! Scripted transport and operator fixtures shared by the fetcher and
//! stream tests.

use crate::chain::{chain_hash, ChainState};
use crate::config::{ClientConfig, RetryPolicy};
use crate::error::Result;
use crate::fetcher::{finalization_message, Batch, ChainedBatchFetcher};
use crate::transport::{BatchTransport, FinalizationRecord, PollData, PollResponse};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use threshold_bls::test_helpers::{keygen, raw_operator, sign_aggregate};
use threshold_bls::{OperatorSet, PrivateKey};

pub(crate) const APP: &str = "demo_app";

/// Transport answering from a fixed script; once the script is exhausted it
/// keeps answering with an empty body.
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<PollResponse>>>,
}

impl MockTransport {
    pub(crate) fn new(responses: Vec<Result<PollResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl BatchTransport for MockTransport {
    async fn finalized_batches(&self, _after: u64) -> Result<PollResponse> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PollResponse { data: None }))
    }
}

/// 40/30/30 stake split across op0/op1/op2.
pub(crate) fn operator_set() -> (Arc<OperatorSet>, Vec<PrivateKey>) {
    let rng = &mut rand::thread_rng();
    let keys = keygen(3, rng);
    let set = OperatorSet::build(vec![
        raw_operator("op0", &keys[0], 40e18),
        raw_operator("op1", &keys[1], 30e18),
        raw_operator("op2", &keys[2], 30e18),
    ])
    .unwrap();
    (Arc::new(set), keys)
}

/// Fetcher over the mock with zero-delay retries and no poll pause.
pub(crate) fn fetcher(
    transport: MockTransport,
    operators: Arc<OperatorSet>,
    start_index: u64,
    seed: Option<&str>,
) -> ChainedBatchFetcher<MockTransport> {
    let mut config = ClientConfig::new(APP, "http://unused.example");
    config.retry = RetryPolicy {
        max_attempts: 3,
        initial_delay_ms: 0,
        max_delay_ms: 0,
        multiplier: 1.0,
    };
    config.poll_interval_ms = 0;
    ChainedBatchFetcher::new(
        transport,
        operators,
        &config,
        start_index,
        seed.map(str::to_string),
    )
}

pub(crate) fn folded(start_index: u64, seed: &str, batches: &[&str]) -> ChainState {
    let mut chain = ChainState::new(start_index, seed);
    for batch in batches {
        chain.fold(batch);
    }
    chain
}

/// A finalization record signed by `signers` over the canonical message for
/// `chain`, declaring `nonsigners` missing.
pub(crate) fn proof(
    signers: &[PrivateKey],
    nonsigners: &[&str],
    chain: &ChainState,
    last_batch: &str,
) -> FinalizationRecord {
    let batch_hash = chain_hash(last_batch);
    let message = finalization_message(APP, chain.index(), &batch_hash, chain.chaining_hash());
    let signature = sign_aggregate(signers, message.as_bytes());
    FinalizationRecord {
        index: chain.index(),
        hash: batch_hash,
        chaining_hash: chain.chaining_hash().to_string(),
        finalization_signature: signature.to_hex().unwrap(),
        nonsigners: nonsigners.iter().map(|s| s.to_string()).collect(),
    }
}

pub(crate) fn poll_round(
    batches: &[&str],
    finalized: Option<FinalizationRecord>,
    first_chaining_hash: Option<&str>,
) -> Result<PollResponse> {
    Ok(PollResponse {
        data: Some(PollData {
            batches: batches.iter().map(|s| s.to_string()).collect(),
            finalized,
            first_chaining_hash: first_chaining_hash.map(str::to_string),
        }),
    })
}

pub(crate) fn no_data() -> Result<PollResponse> {
    Ok(PollResponse { data: None })
}

pub(crate) fn payloads(batches: &[Batch]) -> Vec<(u64, &str)> {
    batches
        .iter()
        .map(|b| (b.index, b.payload.as_str()))
        .collect()
}
