//! Pull-based stream of verified batches.

use crate::error::Result;
use crate::fetcher::{Batch, ChainedBatchFetcher};
use crate::transport::BatchTransport;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation handle. Clones share the flag; cancelling any
/// of them stops the stream at the next poll boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Yields verified batches one at a time, in sequence order.
///
/// Batches surface only after a finalization proof covering them has been
/// verified; a whole verified checkpoint's worth is buffered internally and
/// drained across `next` calls. The stream ends (`None`) on cancellation,
/// and yields a final `Err` before ending if verification fails.
pub struct BatchStream<T> {
    fetcher: ChainedBatchFetcher<T>,
    ready: VecDeque<Batch>,
    cancel: CancelToken,
    finished: bool,
}

impl<T: BatchTransport> BatchStream<T> {
    pub fn new(fetcher: ChainedBatchFetcher<T>) -> Self {
        Self {
            fetcher,
            ready: VecDeque::new(),
            cancel: CancelToken::new(),
            finished: false,
        }
    }

    /// Handle for stopping this stream from another task.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Last checkpoint whose finalization proof verified. Feed its values
    /// back as `start_index` and seed to resume a later run from here.
    pub fn confirmed(&self) -> Option<&crate::chain::ChainState> {
        self.fetcher.confirmed()
    }

    /// Next verified batch. `None` means the stream is over: cancelled, or
    /// closed after a terminal error was yielded.
    pub async fn next(&mut self) -> Option<Result<Batch>> {
        if let Some(batch) = self.ready.pop_front() {
            return Some(Ok(batch));
        }
        if self.finished {
            return None;
        }
        match self.fetcher.next_round(&self.cancel).await {
            Ok(Some(batches)) => {
                self.ready.extend(batches);
                self.ready.pop_front().map(Ok)
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::testing::{fetcher, folded, no_data, operator_set, poll_round, proof, MockTransport};

    #[test]
    fn cancel_is_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn drains_a_verified_checkpoint_one_batch_per_call() {
        let (set, keys) = operator_set();
        let checkpoint = folded(0, "", &["b1", "b2", "b3"]);
        let transport = MockTransport::new(vec![poll_round(
            &["b1", "b2", "b3"],
            Some(proof(&keys, &[], &checkpoint, "b3")),
            None,
        )]);

        let mut stream = BatchStream::new(fetcher(transport, set, 0, Some("")));
        for (index, payload) in [(1, "b1"), (2, "b2"), (3, "b3")] {
            let batch = stream.next().await.unwrap().unwrap();
            assert_eq!((batch.index, batch.payload.as_str()), (index, payload));
        }
        assert_eq!(stream.confirmed(), Some(&checkpoint));

        // once drained, cancellation ends the stream cleanly
        stream.cancel_token().cancel();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn rejected_proof_yields_exactly_one_terminal_error() {
        let (set, keys) = operator_set();
        // operators signed a chain folded from another seed
        let foreign = folded(0, "1111111111111111", &["b1"]);
        let transport = MockTransport::new(vec![poll_round(
            &["b1"],
            Some(proof(&keys, &[], &foreign, "b1")),
            None,
        )]);

        let mut stream = BatchStream::new(fetcher(transport, set, 0, Some("")));
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, ClientError::InvalidSignature { index: 1 }));
        assert!(stream.next().await.is_none());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn transient_exhaustion_also_closes_the_stream() {
        let (set, _) = operator_set();
        let transport = MockTransport::new(vec![no_data(), no_data(), no_data()]);

        let mut stream = BatchStream::new(fetcher(transport, set, 0, Some("")));
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.is_transient());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn cancelled_stream_ends_without_yielding() {
        let (set, _) = operator_set();
        let transport = MockTransport::new(vec![]);

        let mut stream = BatchStream::new(fetcher(transport, set, 0, Some("")));
        stream.cancel_token().cancel();
        assert!(stream.next().await.is_none());
        assert!(stream.next().await.is_none());
        assert!(stream.confirmed().is_none());
    }
}
