//! Nullable read gateway: scripted contract state.

use aim_gateway::{GatewayError, ReadGateway};
use aim_types::{CompletionRecord, RequestId, Wei};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// An in-memory [`ReadGateway`] for testing.
///
/// Results for a request id are scripted as a queue: each read pops the next
/// entry, and the last entry repeats forever once the queue is down to one.
/// Every `proposal_result` call is recorded.
pub struct NullReadGateway {
    constitution: Mutex<Option<String>>,
    fee: Mutex<Result<Wei, GatewayError>>,
    results: Mutex<HashMap<RequestId, VecDeque<Result<CompletionRecord, GatewayError>>>>,
    result_reads: Mutex<Vec<RequestId>>,
}

impl NullReadGateway {
    /// A contract with no constitution and a zero fee.
    pub fn new() -> Self {
        Self {
            constitution: Mutex::new(None),
            fee: Mutex::new(Ok(Wei::ZERO)),
            results: Mutex::new(HashMap::new()),
            result_reads: Mutex::new(Vec::new()),
        }
    }

    /// A contract with `constitution` set and the given fee.
    pub fn with_constitution(constitution: impl Into<String>, fee: Wei) -> Self {
        let gateway = Self::new();
        gateway.set_constitution(constitution);
        gateway.set_fee(fee);
        gateway
    }

    pub fn set_constitution(&self, text: impl Into<String>) {
        *self.constitution.lock().unwrap() = Some(text.into());
    }

    pub fn clear_constitution(&self) {
        *self.constitution.lock().unwrap() = None;
    }

    pub fn set_fee(&self, fee: Wei) {
        *self.fee.lock().unwrap() = Ok(fee);
    }

    pub fn fail_fee(&self, error: GatewayError) {
        *self.fee.lock().unwrap() = Err(error);
    }

    /// Append a result to the script for `record.request_id`.
    pub fn push_result(&self, record: CompletionRecord) {
        self.results
            .lock()
            .unwrap()
            .entry(record.request_id)
            .or_default()
            .push_back(Ok(record));
    }

    /// Append a read failure to the script for `id`.
    pub fn push_failure(&self, id: RequestId, error: GatewayError) {
        self.results
            .lock()
            .unwrap()
            .entry(id)
            .or_default()
            .push_back(Err(error));
    }

    /// Every id passed to `proposal_result`, in call order.
    pub fn result_reads(&self) -> Vec<RequestId> {
        self.result_reads.lock().unwrap().clone()
    }

    /// Number of `proposal_result` calls for `id`.
    pub fn reads_for(&self, id: RequestId) -> usize {
        self.result_reads
            .lock()
            .unwrap()
            .iter()
            .filter(|r| **r == id)
            .count()
    }
}

impl Default for NullReadGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadGateway for NullReadGateway {
    async fn constitution(&self) -> Result<String, GatewayError> {
        Ok(self.constitution.lock().unwrap().clone().unwrap_or_default())
    }

    async fn constitution_set(&self) -> Result<bool, GatewayError> {
        Ok(self.constitution.lock().unwrap().is_some())
    }

    async fn estimate_fee(&self) -> Result<Wei, GatewayError> {
        self.fee.lock().unwrap().clone()
    }

    async fn proposal_result(&self, id: RequestId) -> Result<CompletionRecord, GatewayError> {
        self.result_reads.lock().unwrap().push(id);
        let mut results = self.results.lock().unwrap();
        let script = results
            .get_mut(&id)
            .ok_or_else(|| GatewayError::NotFound(format!("request {id}")))?;
        match script.len() {
            0 => Err(GatewayError::NotFound(format!("request {id}"))),
            1 => script[0].clone(),
            _ => script.pop_front().unwrap_or_else(|| {
                Err(GatewayError::NotFound(format!("request {id}")))
            }),
        }
    }
}
