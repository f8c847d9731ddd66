//! Operator directory query.
//!
//! The directory is a GraphQL endpoint serving the operator records the
//! registry snapshot is built from. It is consulted exactly once per client;
//! the resulting [`OperatorSet`] is immutable for the client's lifetime.

use crate::error::{ClientError, Result};

use serde::Deserialize;
use threshold_bls::{OperatorSet, RawOperator};
use tracing::info;

const OPERATORS_QUERY: &str = "query { operators { id operatorId pubkeyG1_X pubkeyG1_Y pubkeyG2_X pubkeyG2_Y socket stake } }";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    data: Option<QueryData>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    operators: Vec<OperatorRecord>,
}

#[derive(Debug, Deserialize)]
struct OperatorRecord {
    id: String,
    #[serde(rename = "operatorId")]
    operator_id: String,
    #[serde(rename = "pubkeyG1_X")]
    pubkey_g1_x: String,
    #[serde(rename = "pubkeyG1_Y")]
    pubkey_g1_y: String,
    #[serde(rename = "pubkeyG2_X")]
    pubkey_g2_x: Vec<String>,
    #[serde(rename = "pubkeyG2_Y")]
    pubkey_g2_y: Vec<String>,
    socket: String,
    stake: String,
}

impl From<OperatorRecord> for RawOperator {
    fn from(record: OperatorRecord) -> RawOperator {
        RawOperator {
            id: record.id,
            operator_id: record.operator_id,
            socket: record.socket,
            stake: record.stake,
            pubkey_g1_x: record.pubkey_g1_x,
            pubkey_g1_y: record.pubkey_g1_y,
            pubkey_g2_x: record.pubkey_g2_x,
            pubkey_g2_y: record.pubkey_g2_y,
        }
    }
}

/// Client for the operator directory endpoint.
#[derive(Debug, Clone)]
pub struct OperatorDirectory {
    http: reqwest::Client,
    url: String,
}

impl OperatorDirectory {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Queries the directory and builds the registry snapshot.
    pub async fn fetch_operator_set(&self) -> Result<OperatorSet> {
        let body = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({ "query": OPERATORS_QUERY }))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let parsed: QueryResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::Parse(format!("directory response: {e}")))?;
        let records = parsed
            .data
            .ok_or_else(|| ClientError::Parse("directory response carried no data".into()))?
            .operators;
        if records.is_empty() {
            return Err(ClientError::EmptyDirectory);
        }

        info!(operators = records.len(), "building operator set");
        let set = OperatorSet::build(records.into_iter().map(RawOperator::from).collect())?;
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_shape_deserializes() {
        let body = r#"{
            "data": {
                "operators": [{
                    "id": "0xabc",
                    "operatorId": "0xdef",
                    "pubkeyG1_X": "123",
                    "pubkeyG1_Y": "456",
                    "pubkeyG2_X": ["1", "2"],
                    "pubkeyG2_Y": ["3", "4"],
                    "socket": "http://node.example:8000",
                    "stake": "32000000000000000000"
                }]
            }
        }"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        let records = parsed.data.unwrap().operators;
        assert_eq!(records.len(), 1);

        let raw = RawOperator::from(records.into_iter().next().unwrap());
        assert_eq!(raw.id, "0xabc");
        assert_eq!(raw.pubkey_g2_x, vec!["1", "2"]);
        assert_eq!(raw.stake, "32000000000000000000");
    }
}
