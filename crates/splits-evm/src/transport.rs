use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, BlockHash, Bytes, TxHash, U256};
use alloy::rpc::types::{Log, TransactionReceipt, TransactionRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

/// An unsigned contract call, shared by queries, simulations and submissions so that all of
/// them see the same payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl CallRequest {
    pub fn new(to: Address, value: U256, data: Bytes) -> Self {
        Self { from: None, to, value, data }
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn to_transaction_request(&self) -> TransactionRequest {
        let request = TransactionRequest::default()
            .with_to(self.to)
            .with_value(self.value)
            .with_input(self.data.clone());

        match self.from {
            Some(from) => request.with_from(from),
            None => request,
        }
    }
}

/// Receipt of an included transaction with the fields callers actually consume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinedTransaction {
    pub transaction_hash: TxHash,
    pub block_hash: Option<BlockHash>,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
    pub logs: Vec<Log>,
}

impl From<TransactionReceipt> for MinedTransaction {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            success: ReceiptResponse::status(&receipt),
            transaction_hash: receipt.transaction_hash,
            block_hash: receipt.block_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            logs: receipt.inner.logs().to_vec(),
        }
    }
}

/// Outbound boundary to an EVM node.
///
/// Reverts must be reported as [`Error::Reverted`] so callers can tell them apart from node or
/// connectivity failures.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes `request` against the latest state without creating a transaction
    async fn call(&self, request: &CallRequest) -> Result<Bytes, Error>;

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, Error>;

    /// Completes `request` with nonce, gas limit, fees and chain id so that it can be signed
    async fn fill_transaction(&self, request: &CallRequest) -> Result<TransactionRequest, Error>;

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<TxHash, Error>;

    /// Waits until the transaction is included and returns its receipt
    async fn wait_for_transaction(&self, hash: TxHash) -> Result<MinedTransaction, Error>;
}
