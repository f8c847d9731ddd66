//! Client facade tying directory, transport, and fetcher together.

use crate::config::ClientConfig;
use crate::directory::OperatorDirectory;
use crate::error::Result;
use crate::fetcher::ChainedBatchFetcher;
use crate::stream::BatchStream;
use crate::transport::{FinalizationRecord, HttpTransport};

use std::sync::Arc;
use threshold_bls::OperatorSet;
use tracing::info;

/// Verifying client for one application on one sequencer node.
///
/// Construction resolves the operator set once; every stream started from
/// this client verifies against that same snapshot.
pub struct SequencerClient {
    config: ClientConfig,
    operators: Arc<OperatorSet>,
    transport: HttpTransport,
}

impl SequencerClient {
    /// Fetches the operator set from the configured directory and builds
    /// the client.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let directory = OperatorDirectory::new(&config.directory_url);
        let operators = directory.fetch_operator_set().await?;
        Ok(Self::with_operator_set(config, Arc::new(operators)))
    }

    /// Builds the client around an operator set obtained elsewhere, e.g. a
    /// cached or pinned snapshot.
    pub fn with_operator_set(config: ClientConfig, operators: Arc<OperatorSet>) -> Self {
        info!(
            app = %config.app_name,
            operators = operators.len(),
            total_stake = operators.total_stake(),
            "client ready"
        );
        let transport = HttpTransport::new(&config.base_url, &config.app_name);
        Self {
            config,
            operators,
            transport,
        }
    }

    pub fn operator_set(&self) -> &Arc<OperatorSet> {
        &self.operators
    }

    /// Starts a verified batch stream after `start_index`. Pass the
    /// chaining hash from a previously confirmed checkpoint as `seed` to
    /// resume; without one the first poll's claimed hash is adopted.
    pub fn stream(&self, start_index: u64, seed: Option<String>) -> BatchStream<HttpTransport> {
        let fetcher = ChainedBatchFetcher::new(
            self.transport.clone(),
            Arc::clone(&self.operators),
            &self.config,
            start_index,
            seed,
        );
        BatchStream::new(fetcher)
    }

    /// Submits a batch of opaque transactions to the node.
    pub async fn submit(&self, transactions: &[serde_json::Value]) -> Result<()> {
        self.transport.submit_batch(transactions).await
    }

    /// The node's most recent finalization record. Unverified: use it to
    /// pick a starting point, not as a trusted checkpoint.
    pub async fn last_finalized(&self) -> Result<FinalizationRecord> {
        self.transport.last_finalized().await
    }
}
