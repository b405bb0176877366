use std::collections::HashMap;
use std::sync::Mutex;

use alloy::network::TransactionBuilder;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, B256};
use alloy::rpc::types::{Log, TransactionRequest};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;

use crate::{CallRequest, ChainId, Error, MinedTransaction, Transport};

/// Request observed by an [`InMemoryTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    Call(CallRequest),
    EstimateGas(CallRequest),
    FillTransaction(CallRequest),
    SendRawTransaction(Bytes),
    WaitForTransaction(TxHash),
}

#[derive(Debug)]
struct State {
    requests: Vec<RecordedRequest>,
    responses: HashMap<[u8; 4], Bytes>,
    logs: Vec<Log>,
    revert: Option<String>,
    reverted_receipt: bool,
}

/// [`Transport`] keeping everything in memory. Queries answer with programmed responses keyed by
/// function selector, submitted transactions are mined instantly with the programmed logs.
#[derive(Debug)]
pub struct InMemoryTransport {
    chain_id: ChainId,
    gas: u64,

    state: Mutex<State>,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new(ChainId::MAINNET)
    }
}

impl InMemoryTransport {
    pub const GAS_ESTIMATE: u64 = 150_000;
    pub const BLOCK_NUMBER: u64 = 1_000;

    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            gas: Self::GAS_ESTIMATE,
            state: Mutex::new(State {
                requests: vec![],
                responses: HashMap::new(),
                logs: vec![],
                revert: None,
                reverted_receipt: false,
            }),
        }
    }

    pub fn with_gas_estimate(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Answer every query to the function `selector` with `response`
    pub fn with_response(self, selector: [u8; 4], response: impl Into<Bytes>) -> Self {
        self.state().responses.insert(selector, response.into());
        self
    }

    /// Attach `logs` to the receipt of every submitted transaction
    pub fn with_logs(self, logs: Vec<Log>) -> Self {
        self.state().logs = logs;
        self
    }

    /// Every query, simulation and submission reverts with `reason`
    pub fn with_revert(self, reason: &str) -> Self {
        self.state().revert = Some(reason.to_string());
        self
    }

    /// Submitted transactions are mined but reverted
    pub fn with_reverted_receipt(self) -> Self {
        self.state().reverted_receipt = true;
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn submitted_transactions(&self) -> Vec<Bytes> {
        self.requests()
            .into_iter()
            .filter_map(|request| match request {
                RecordedRequest::SendRawTransaction(raw) => Some(raw),
                _ => None,
            })
            .collect()
    }

    /// Builds a log emitted by `address` carrying `event`
    pub fn log<E: SolEvent>(address: Address, event: &E) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address,
                data: event.encode_log_data(),
            },
            ..Default::default()
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record(&self, request: RecordedRequest) -> Result<(), Error> {
        let mut state = self.state();
        state.requests.push(request);

        match &state.revert {
            Some(reason) => Err(Error::Reverted {
                reason: reason.clone(),
                data: None,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn call(&self, request: &CallRequest) -> Result<Bytes, Error> {
        self.record(RecordedRequest::Call(request.clone()))?;

        let selector: Option<[u8; 4]> = request.data.get(..4).and_then(|s| s.try_into().ok());
        selector
            .and_then(|selector| self.state().responses.get(&selector).cloned())
            .ok_or_else(|| Error::Reverted {
                reason: "no response programmed".to_string(),
                data: None,
            })
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, Error> {
        self.record(RecordedRequest::EstimateGas(request.clone()))?;

        Ok(self.gas)
    }

    async fn fill_transaction(&self, request: &CallRequest) -> Result<TransactionRequest, Error> {
        self.record(RecordedRequest::FillTransaction(request.clone()))?;
        request.from.ok_or(Error::MissingSender)?;

        let nonce = self.submitted_transactions().len() as u64;

        Ok(request
            .to_transaction_request()
            .with_nonce(nonce)
            .with_gas_limit(self.gas)
            .with_max_fee_per_gas(2_000_000_000)
            .with_max_priority_fee_per_gas(1_000_000_000)
            .with_chain_id(self.chain_id.as_u64()))
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<TxHash, Error> {
        self.record(RecordedRequest::SendRawTransaction(raw.clone()))?;

        Ok(keccak256(raw))
    }

    async fn wait_for_transaction(&self, hash: TxHash) -> Result<MinedTransaction, Error> {
        self.record(RecordedRequest::WaitForTransaction(hash))?;

        let state = self.state();
        let block_hash = B256::with_last_byte(1);
        let logs = state
            .logs
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, log)| Log {
                block_hash: Some(block_hash),
                block_number: Some(Self::BLOCK_NUMBER),
                transaction_hash: Some(hash),
                log_index: Some(index as u64),
                ..log
            })
            .collect();

        Ok(MinedTransaction {
            transaction_hash: hash,
            block_hash: Some(block_hash),
            block_number: Some(Self::BLOCK_NUMBER),
            gas_used: self.gas,
            success: !state.reverted_receipt,
            logs,
        })
    }
}
