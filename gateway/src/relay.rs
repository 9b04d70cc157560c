//! HTTP JSON-RPC client for the evaluator relay node.

use aim_types::{
    AccountAddress, CompletionRecord, EvaluationEvent, RequestId, TxHash, Wei,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::GatewayError;
use crate::traits::{ReadGateway, SubmissionReceipt, WriteGateway};

/// Default timeout for relay requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for a relay node exposing the evaluator contract over JSON-RPC.
///
/// Every call is a `POST` of `{"action": <name>, ...params}`; the relay answers
/// `{"result": ...}` or `{"error": "..."}`.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    node_url: String,
}

impl RelayClient {
    /// Create a client targeting the given base URL (e.g. `http://127.0.0.1:8545`).
    pub fn new(node_url: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_timeout(node_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(
        node_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::RequestFailed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            node_url: node_url.into(),
        })
    }

    /// The configured relay URL.
    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    /// Send a JSON-RPC request and decode the `result` field.
    async fn rpc_call<T: DeserializeOwned>(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<T, GatewayError> {
        let body = request_body(action, params)?;
        trace!(action, "relay request");

        let response = self.http.post(&self.node_url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(GatewayError::RequestFailed(format!(
                "relay returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(format!("invalid JSON response: {e}")))?;

        decode_envelope(action, json)
    }

    /// Past `ProposalEvaluated` events from `from_block` to head.
    pub async fn evaluation_history(
        &self,
        from_block: u64,
    ) -> Result<Vec<EvaluationEvent>, GatewayError> {
        let events: Vec<EvaluationEvent> = self
            .rpc_call(
                "evaluation_history",
                serde_json::json!({ "from_block": from_block }),
            )
            .await?;
        debug!(from_block, count = events.len(), "fetched evaluation history");
        Ok(events)
    }
}

/// Build the request body: params object with `action` inserted.
fn request_body(
    action: &str,
    params: serde_json::Value,
) -> Result<serde_json::Value, GatewayError> {
    let mut body = params;
    body.as_object_mut()
        .ok_or_else(|| GatewayError::RequestFailed("params must be a JSON object".into()))?
        .insert("action".to_string(), serde_json::json!(action));
    Ok(body)
}

/// Unwrap the relay's `{"result"}` / `{"error"}` envelope.
fn decode_envelope<T: DeserializeOwned>(
    action: &str,
    json: serde_json::Value,
) -> Result<T, GatewayError> {
    if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
        return Err(classify_relay_error(err));
    }

    let result = json
        .get("result")
        .cloned()
        .ok_or_else(|| GatewayError::InvalidResponse(format!("{action}: missing result")))?;

    serde_json::from_value(result)
        .map_err(|e| GatewayError::InvalidResponse(format!("invalid {action} response: {e}")))
}

/// Map a relay error string onto the gateway taxonomy.
fn classify_relay_error(err: &str) -> GatewayError {
    let lower = err.to_lowercase();
    if lower.contains("not found") {
        GatewayError::NotFound(err.to_string())
    } else if lower.contains("rejected")
        || lower.contains("revert")
        || lower.contains("insufficient")
        || lower.contains("denied")
    {
        GatewayError::Rejected(err.to_string())
    } else {
        GatewayError::RequestFailed(format!("relay error: {err}"))
    }
}

/// Response of the `proposal_result` action: the contract's
/// `(proposal, result, completed)` tuple.
#[derive(Debug, Deserialize)]
struct ProposalResultResponse {
    proposal: String,
    #[serde(default)]
    result: String,
    completed: bool,
}

/// Response of the `evaluate_proposal` action.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    tx_hash: String,
    #[serde(default = "default_accepted")]
    accepted: bool,
    #[serde(default)]
    detail: Option<String>,
}

fn default_accepted() -> bool {
    true
}

#[async_trait]
impl ReadGateway for RelayClient {
    async fn constitution(&self) -> Result<String, GatewayError> {
        self.rpc_call("constitution", serde_json::json!({})).await
    }

    async fn constitution_set(&self) -> Result<bool, GatewayError> {
        self.rpc_call("constitution_set", serde_json::json!({})).await
    }

    async fn estimate_fee(&self) -> Result<Wei, GatewayError> {
        self.rpc_call("estimate_fee", serde_json::json!({})).await
    }

    async fn proposal_result(&self, id: RequestId) -> Result<CompletionRecord, GatewayError> {
        let resp: ProposalResultResponse = self
            .rpc_call(
                "proposal_result",
                serde_json::json!({ "request_id": id.raw() }),
            )
            .await?;
        Ok(CompletionRecord {
            request_id: id,
            proposal: resp.proposal,
            result: resp.result,
            completed: resp.completed,
        })
    }
}

#[async_trait]
impl WriteGateway for RelayClient {
    async fn evaluate_proposal(
        &self,
        from: &AccountAddress,
        proposal: &str,
        value: Wei,
    ) -> Result<SubmissionReceipt, GatewayError> {
        let resp: SubmitResponse = self
            .rpc_call(
                "evaluate_proposal",
                serde_json::json!({
                    "from": from.as_str(),
                    "proposal": proposal,
                    "value": value.raw().to_string(),
                }),
            )
            .await?;

        if !resp.accepted {
            return Err(GatewayError::Rejected(
                resp.detail.unwrap_or_else(|| "submission not accepted".into()),
            ));
        }

        Ok(SubmissionReceipt {
            tx_hash: TxHash::new(resp.tx_hash),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_client_creation() {
        let client = RelayClient::new("http://127.0.0.1:8545").unwrap();
        assert_eq!(client.node_url(), "http://127.0.0.1:8545");
    }

    #[test]
    fn request_body_inserts_action() {
        let body = request_body("proposal_result", serde_json::json!({ "request_id": 7 })).unwrap();
        assert_eq!(body["action"], "proposal_result");
        assert_eq!(body["request_id"], 7);
    }

    #[test]
    fn request_body_requires_object() {
        assert!(request_body("x", serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn envelope_result_is_decoded() {
        let fee: Wei = decode_envelope("estimate_fee", serde_json::json!({ "result": "1000" })).unwrap();
        assert_eq!(fee, Wei::new(1000));
    }

    #[test]
    fn envelope_error_is_classified() {
        let err = decode_envelope::<bool>(
            "evaluate_proposal",
            serde_json::json!({ "error": "execution reverted: fee mismatch" }),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));

        let err = decode_envelope::<bool>(
            "proposal_result",
            serde_json::json!({ "error": "request 9 not found" }),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[test]
    fn envelope_without_result_is_invalid() {
        let err = decode_envelope::<bool>("constitution_set", serde_json::json!({})).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn proposal_result_response_tolerates_missing_result() {
        let json = r#"{"proposal": "p", "completed": false}"#;
        let resp: ProposalResultResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.completed);
        assert!(resp.result.is_empty());
    }

    #[test]
    fn submit_response_defaults_to_accepted() {
        let resp: SubmitResponse = serde_json::from_str(r#"{"tx_hash": "0xabc"}"#).unwrap();
        assert!(resp.accepted);
        assert!(resp.detail.is_none());
    }
}
