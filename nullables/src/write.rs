//! Nullable write gateway. Records submissions without sending them.

use aim_gateway::{GatewayError, SubmissionReceipt, WriteGateway};
use aim_types::{AccountAddress, TxHash, Wei};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded `evaluate_proposal` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteCall {
    pub from: AccountAddress,
    pub proposal: String,
    pub value: Wei,
}

/// A [`WriteGateway`] that records calls instead of sending them.
///
/// Accepts everything unless a rejection has been queued with [`reject_next`].
///
/// [`reject_next`]: NullWriteGateway::reject_next
pub struct NullWriteGateway {
    calls: Mutex<Vec<WriteCall>>,
    rejections: Mutex<VecDeque<GatewayError>>,
    required_fee: Mutex<Option<Wei>>,
}

impl NullWriteGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rejections: Mutex::new(VecDeque::new()),
            required_fee: Mutex::new(None),
        }
    }

    /// Fail the next call with `error`.
    pub fn reject_next(&self, error: GatewayError) {
        self.rejections.lock().unwrap().push_back(error);
    }

    /// Reject any call whose attached value differs from `fee`, the way the
    /// contract does when its fee moved after the estimate was read.
    pub fn require_fee(&self, fee: Wei) {
        *self.required_fee.lock().unwrap() = Some(fee);
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<WriteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for NullWriteGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WriteGateway for NullWriteGateway {
    async fn evaluate_proposal(
        &self,
        from: &AccountAddress,
        proposal: &str,
        value: Wei,
    ) -> Result<SubmissionReceipt, GatewayError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(WriteCall {
                from: from.clone(),
                proposal: proposal.to_string(),
                value,
            });
            calls.len()
        };

        if let Some(error) = self.rejections.lock().unwrap().pop_front() {
            return Err(error);
        }
        if let Some(required) = *self.required_fee.lock().unwrap() {
            if required != value {
                return Err(GatewayError::Rejected(format!(
                    "fee mismatch: sent {value}, required {required}"
                )));
            }
        }

        Ok(SubmissionReceipt {
            tx_hash: TxHash::new(format!("0x{index:064x}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountAddress {
        AccountAddress::from_bytes([0xAA; 20])
    }

    #[tokio::test]
    async fn records_and_accepts() {
        let gateway = NullWriteGateway::new();
        let receipt = gateway
            .evaluate_proposal(&account(), "p", Wei::new(5))
            .await
            .unwrap();
        assert!(receipt.tx_hash.as_str().ends_with('1'));
        assert_eq!(gateway.calls()[0].value, Wei::new(5));
    }

    #[tokio::test]
    async fn queued_rejection_applies_once() {
        let gateway = NullWriteGateway::new();
        gateway.reject_next(GatewayError::Rejected("user denied".into()));
        assert!(gateway.evaluate_proposal(&account(), "p", Wei::ZERO).await.is_err());
        assert!(gateway.evaluate_proposal(&account(), "p", Wei::ZERO).await.is_ok());
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn fee_mismatch_rejected() {
        let gateway = NullWriteGateway::new();
        gateway.require_fee(Wei::new(2000));
        let err = gateway
            .evaluate_proposal(&account(), "p", Wei::new(1000))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
    }
}
