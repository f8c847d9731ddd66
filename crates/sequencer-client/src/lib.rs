//! # Sequencer light client
//!
//! A client-side light verifier for a sequencing network. It pulls batches
//! of opaque transaction data from an untrusted node and proves, without
//! trusting that node, that a qualified stake majority of the known operator
//! set attested to the batch sequence:
//!
//! - the operator directory snapshot becomes an immutable
//!   [`OperatorSet`](threshold_bls::OperatorSet) with a precomputed
//!   aggregate public key;
//! - every finalization checkpoint is checked with the stake-threshold
//!   aggregate-signature verification from `threshold-bls`;
//! - a chained 64-bit hash binds each batch to all prior batches, so
//!   reordering or omission across polling rounds is detected.
//!
//! Batches are only ever released to the caller after a finalization proof
//! covering them verifies; the stream halts on the first integrity
//! violation and produces nothing further.
//!
//! ```no_run
//! use sequencer_client::{ClientConfig, SequencerClient};
//!
//! # async fn run() -> sequencer_client::Result<()> {
//! let config = ClientConfig::new("simple_app", "http://node.example:8000");
//! let client = SequencerClient::connect(config).await?;
//! let mut stream = client.stream(0, None);
//! while let Some(batch) = stream.next().await {
//!     let batch = batch?;
//!     println!("batch {}: {}", batch.index, batch.payload);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod fetcher;
pub mod stream;
#[cfg(test)]
pub(crate) mod testing;
pub mod transport;

pub use chain::{chain_hash, ChainState};
pub use client::SequencerClient;
pub use config::{ClientConfig, RetryPolicy};
pub use directory::OperatorDirectory;
pub use error::{ClientError, Result};
pub use fetcher::{Batch, ChainedBatchFetcher};
pub use stream::{BatchStream, CancelToken};
pub use transport::{BatchTransport, FinalizationRecord, HttpTransport};
