use std::ops::Deref;
use std::time::{Duration, Instant};

use alloy::network::TransactionBuilder;
use alloy::primitives::{Bytes, TxHash};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::client::RpcClient;
use alloy::rpc::json_rpc::RpcError;
use alloy::rpc::types::TransactionRequest;
use alloy::transports::http::Http;
use alloy::transports::{TransportError, TransportErrorKind};
use async_trait::async_trait;
use reqwest::Url;
use splits_common::service::fallback::{FailurePredicate, WithFallback};
use splits_common::{log_if_error, measure_duration, metric};
use tracing::instrument;

use crate::{CallRequest, ChainId, ConfirmationConfiguration, Configuration, Error, MinedTransaction, Transport};

/// Runs an idempotent request on every endpoint in turn until one answers. Captured values are
/// cloned for each attempt.
macro_rules! call_with_fallback {
    ($self: ident, [$($captured: ident),*] |$provider: ident| $body: expr) => {
        $self
            .inner
            .call_all(|$provider| {
                $(let $captured = $captured.clone();)*
                async move { $body.await }
            })
            .await
            .map_err(Error::from)
    };
}

macro_rules! instrument_rpc {
    ($method: literal, $e: expr) => {{
        let (result, duration) = measure_duration!(log_if_error!($e, warn if Error::Reverted { .. }));

        metric!(histogram [ evm_rpc ] = duration.as_millis(), method = $method);
        metric!(on error result => counter [ evm_rpc_error ] = 1, method = $method);

        result
    }};
}

#[derive(Clone)]
struct EvmRpcClient(RootProvider);

impl EvmRpcClient {
    fn new(endpoint: &str, timeout: u64) -> Result<Self, Error> {
        let url = Url::parse(endpoint).map_err(|e| Error::Configuration(format!("invalid endpoint {}: {}", endpoint, e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(5))
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        let transport = Http::with_client(client, url);

        Ok(Self(RootProvider::new(RpcClient::new(transport, false))))
    }
}

impl Deref for EvmRpcClient {
    type Target = RootProvider;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FailurePredicate<TransportError> for EvmRpcClient {
    fn is_err(&self, err: &TransportError) -> bool {
        match err {
            RpcError::Transport(TransportErrorKind::HttpError(e)) => e.is_rate_limit_err() || e.status >= 500,
            RpcError::Transport(_) | RpcError::NullResp => true,
            _ => false,
        }
    }
}

/// [`Transport`] backed by JSON-RPC endpoints. Endpoints are tried in the configured order and
/// an endpoint failing repeatedly is skipped for a while.
#[derive(Clone)]
pub struct RpcTransport {
    chain_id: ChainId,
    confirmation: ConfirmationConfiguration,

    inner: WithFallback<EvmRpcClient>,
}

impl RpcTransport {
    pub fn new(chain_id: ChainId, configuration: &Configuration) -> Result<Self, Error> {
        let mut inner = WithFallback::new()
            .with_policy(configuration.fallback_policy)
            .with(EvmRpcClient::new(&configuration.endpoint, configuration.timeout)?);

        for fallback in &configuration.fallbacks {
            inner = inner.with(EvmRpcClient::new(fallback, configuration.timeout)?);
        }

        Ok(Self {
            chain_id,
            confirmation: configuration.confirmation,
            inner,
        })
    }

    /// Returns the chain_id on which this transport is bound
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Fetch the chain id reported by the node
    #[instrument(name = "fetch_chain_id", skip(self))]
    pub async fn fetch_chain_id(&self) -> Result<ChainId, Error> {
        let id = instrument_rpc!("get_chain_id", call_with_fallback!(self, [] |provider| provider.get_chain_id()))?;

        ChainId::try_from(id)
    }
}

#[async_trait]
impl Transport for RpcTransport {
    #[instrument(name = "call", skip(self, request), fields(to = %request.to))]
    async fn call(&self, request: &CallRequest) -> Result<Bytes, Error> {
        let transaction = request.to_transaction_request();

        instrument_rpc!("call", call_with_fallback!(self, [transaction] |provider| provider.call(transaction)))
    }

    #[instrument(name = "estimate_gas", skip(self, request), fields(to = %request.to))]
    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, Error> {
        let transaction = request.to_transaction_request();

        instrument_rpc!("estimate_gas", call_with_fallback!(self, [transaction] |provider| provider.estimate_gas(transaction)))
    }

    #[instrument(name = "fill_transaction", skip(self, request), fields(to = %request.to))]
    async fn fill_transaction(&self, request: &CallRequest) -> Result<TransactionRequest, Error> {
        let from = request.from.ok_or(Error::MissingSender)?;

        let nonce = instrument_rpc!(
            "get_transaction_count",
            call_with_fallback!(self, [] |provider| provider.get_transaction_count(from).pending())
        )?;
        let gas = self.estimate_gas(request).await?;
        let fees = instrument_rpc!("estimate_eip1559_fees", call_with_fallback!(self, [] |provider| provider.estimate_eip1559_fees()))?;

        Ok(request
            .to_transaction_request()
            .with_nonce(nonce)
            .with_gas_limit(gas)
            .with_max_fee_per_gas(fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas)
            .with_chain_id(self.chain_id.as_u64()))
    }

    #[instrument(name = "send_raw_transaction", skip(self, raw))]
    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<TxHash, Error> {
        let raw = raw.clone();

        // Submission is not replayed on another endpoint
        let result = self
            .inner
            .call(|provider| async move { provider.send_raw_transaction(&raw).await.map(|pending| *pending.tx_hash()) })
            .await
            .map_err(Error::from);

        instrument_rpc!("send_raw_transaction", result)
    }

    #[instrument(name = "wait_for_transaction", skip(self))]
    async fn wait_for_transaction(&self, hash: TxHash) -> Result<MinedTransaction, Error> {
        let deadline = Instant::now() + self.confirmation.timeout;

        loop {
            let receipt = instrument_rpc!(
                "get_transaction_receipt",
                call_with_fallback!(self, [] |provider| provider.get_transaction_receipt(hash))
            )?;

            if let Some(receipt) = receipt {
                return Ok(MinedTransaction::from(receipt));
            }

            if Instant::now() >= deadline {
                return Err(Error::Timeout(hash));
            }

            tokio::time::sleep(self.confirmation.poll_interval).await;
        }
    }
}
