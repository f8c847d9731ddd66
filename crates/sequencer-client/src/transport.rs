//! HTTP transport to a sequencer node: the finalized-batches poll the
//! fetcher drives, plus the last-finalized query and batch submission.
//!
//! The poll is behind the [`BatchTransport`] trait so the fetcher state
//! machine can be exercised against a scripted transport in tests.

use crate::error::{ClientError, Result};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

/// One poll response. A missing `data` field is a transient condition, not
/// an error shape of its own.
#[derive(Debug, Clone, Deserialize)]
pub struct PollResponse {
    pub data: Option<PollData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollData {
    /// Opaque batch payloads, in sequence order, starting right after the
    /// requested index
    #[serde(default)]
    pub batches: Vec<String>,
    /// Finalization proof embedded in this poll round, if the node has one
    pub finalized: Option<FinalizationRecord>,
    /// Server-claimed chaining hash at the first returned batch; only
    /// consulted for the trust-on-first-use bootstrap
    #[serde(default)]
    pub first_chaining_hash: Option<String>,
}

/// The finalization proof bundle: everything needed to check that a stake
/// majority attested to the chain up to `index`.
#[derive(Debug, Clone, Deserialize)]
pub struct FinalizationRecord {
    pub index: u64,
    /// Content hash of the batch at `index`
    pub hash: String,
    /// Chaining hash at `index`
    pub chaining_hash: String,
    /// Hex-encoded aggregate BLS signature
    pub finalization_signature: String,
    /// Operators that did not contribute to the aggregate signature
    #[serde(default)]
    pub nonsigners: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct LastFinalizedResponse {
    data: Option<FinalizationRecord>,
}

/// The single operation the fetcher needs from a node.
#[async_trait]
pub trait BatchTransport: Send + Sync {
    /// Fetches all batches known after `after`, plus any finalization proof
    /// covering them.
    async fn finalized_batches(&self, after: u64) -> Result<PollResponse>;
}

/// `BatchTransport` over a real sequencer node.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    app_name: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, app_name: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            app_name: app_name.into(),
        }
    }

    /// Fetches the node's most recent finalization record, for bootstrap
    /// and tail queries.
    pub async fn last_finalized(&self) -> Result<FinalizationRecord> {
        let url = format!(
            "{}/node/{}/batches/finalized/last",
            self.base_url, self.app_name
        );
        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let parsed: LastFinalizedResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::Parse(format!("last-finalized response: {e}")))?;
        parsed
            .data
            .ok_or_else(|| ClientError::Parse("last-finalized response carried no data".into()))
    }

    /// Submits a batch of opaque transactions to the node.
    pub async fn submit_batch(&self, transactions: &[serde_json::Value]) -> Result<()> {
        let url = format!("{}/node/{}/batches", self.base_url, self.app_name);
        let response = self.http.put(&url).json(transactions).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::Submission(status));
        }
        // the node acknowledges with a JSON body
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ClientError::Parse(format!("submission acknowledgment: {e}")))?;
        debug!(count = transactions.len(), "batch submitted");
        Ok(())
    }
}

#[async_trait]
impl BatchTransport for HttpTransport {
    async fn finalized_batches(&self, after: u64) -> Result<PollResponse> {
        let url = format!(
            "{}/node/{}/batches/finalized?after={}",
            self.base_url, self.app_name, after
        );
        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Parse(format!("poll response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_response_shape_deserializes() {
        let body = r#"{
            "data": {
                "batches": ["tx-a", "tx-b"],
                "finalized": {
                    "index": 42,
                    "hash": "00112233aabbccdd",
                    "chaining_hash": "ffeeddcc00112233",
                    "finalization_signature": "deadbeef",
                    "nonsigners": ["op2"]
                },
                "first_chaining_hash": "0123456789abcdef"
            }
        }"#;
        let parsed: PollResponse = serde_json::from_str(body).unwrap();
        let data = parsed.data.unwrap();
        assert_eq!(data.batches, vec!["tx-a", "tx-b"]);
        assert_eq!(data.first_chaining_hash.as_deref(), Some("0123456789abcdef"));
        let finalized = data.finalized.unwrap();
        assert_eq!(finalized.index, 42);
        assert_eq!(finalized.nonsigners, vec!["op2"]);
    }

    #[test]
    fn absent_fields_default() {
        let parsed: PollResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(parsed.data.is_none());

        let parsed: PollResponse =
            serde_json::from_str(r#"{"data": {"finalized": null}}"#).unwrap();
        let data = parsed.data.unwrap();
        assert!(data.batches.is_empty());
        assert!(data.finalized.is_none());
        assert!(data.first_chaining_hash.is_none());
    }

    #[test]
    fn base_url_is_normalized() {
        let transport = HttpTransport::new("http://node.example:8000///", "app");
        assert_eq!(transport.base_url, "http://node.example:8000");
    }
}
