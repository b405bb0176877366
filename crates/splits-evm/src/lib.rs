use std::time::Duration;

use alloy::primitives::{Bytes, TxHash};
use alloy::rpc::json_rpc::{ErrorPayload, RpcError};
use alloy::sol_types::{decode_revert_reason, Revert, SolError};
use alloy::transports::{TransportError, TransportErrorKind};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use splits_common::service::fallback::{self, FallbackPolicy};
use thiserror::Error;

pub mod contract;
pub mod math;

mod client;
pub use client::RpcTransport;

mod network;
pub use network::ChainId;

mod signer;
pub use signer::{LocalSigner, Signer, SignerConfiguration};

mod transport;
pub use transport::{CallRequest, MinedTransaction, Transport};

#[cfg(feature = "testing")]
pub mod testing;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("execution reverted: {reason}")]
    Reverted { reason: String, data: Option<Bytes> },

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error {0}")]
    Transport(String),

    #[error("could not connect to endpoint")]
    Unavailable,

    #[error("transaction {0} was not mined in time")]
    Timeout(TxHash),

    #[error("a sender is required to fill a transaction")]
    MissingSender,

    #[error("signing error {0}")]
    Signing(String),

    #[error("invalid chain id {0}")]
    InvalidChainId(String),

    #[error("invalid configuration {0}")]
    Configuration(String),
}

impl Error {
    fn from_payload(payload: &ErrorPayload) -> Self {
        let data = payload.as_revert_data();
        let is_revert = data.is_some() || payload.message.contains("revert");
        if !is_revert {
            return Self::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
            };
        }

        let reason = data
            .as_ref()
            .and_then(|data| Revert::abi_decode(data).map(|revert| revert.reason).ok().or_else(|| decode_revert_reason(data)))
            .unwrap_or_else(|| payload.message.to_string());

        Self::Reverted { reason, data }
    }
}

impl From<TransportError> for Error {
    fn from(value: TransportError) -> Self {
        match value {
            RpcError::ErrorResp(payload) => Self::from_payload(&payload),
            RpcError::Transport(TransportErrorKind::HttpError(e)) => Self::Rpc {
                code: e.status as i64,
                message: e.body,
            },
            e => Self::Transport(e.to_string()),
        }
    }
}

impl From<fallback::Error<TransportError>> for Error {
    fn from(value: fallback::Error<TransportError>) -> Self {
        match value {
            fallback::Error::Rejected => Self::Unavailable,
            fallback::Error::Inner(e) => e.into(),
        }
    }
}

/// How a submitted transaction is awaited
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationConfiguration {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub poll_interval: Duration,

    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
}

impl Default for ConfirmationConfiguration {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1_000),
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout: u64,

    #[serde(default)]
    pub fallbacks: Vec<String>,

    #[serde(default)]
    pub fallback_policy: FallbackPolicy,

    #[serde(default)]
    pub confirmation: ConfirmationConfiguration,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::rpc::json_rpc::{ErrorPayload, RpcError};
    use alloy::primitives::U256;
    use alloy::sol_types::{Panic, Revert, SolError};
    use alloy::transports::TransportErrorKind;

    use crate::{Configuration, Error};

    #[test]
    fn revert_payload_is_decoded_into_a_reason() {
        let data = Revert::from("Swapper: paused").abi_encode();
        let payload: ErrorPayload = serde_json::from_value(serde_json::json!({
            "code": 3,
            "message": "execution reverted: Swapper: paused",
            "data": alloy::primitives::hex::encode_prefixed(&data),
        }))
        .unwrap();

        match Error::from(RpcError::<TransportErrorKind>::ErrorResp(payload)) {
            Error::Reverted { reason, data: Some(_) } => assert_eq!(reason, "Swapper: paused"),
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn panic_payload_keeps_the_decoded_description() {
        let data = Panic { code: U256::from(0x11) }.abi_encode();
        let payload: ErrorPayload = serde_json::from_value(serde_json::json!({
            "code": 3,
            "message": "execution reverted",
            "data": alloy::primitives::hex::encode_prefixed(&data),
        }))
        .unwrap();

        match Error::from(RpcError::<TransportErrorKind>::ErrorResp(payload)) {
            Error::Reverted { reason, data: Some(_) } => assert!(reason.starts_with("panic"), "{reason}"),
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn non_revert_payload_is_an_rpc_error() {
        let payload: ErrorPayload = serde_json::from_value(serde_json::json!({
            "code": -32000,
            "message": "nonce too low",
        }))
        .unwrap();

        assert!(matches!(
            Error::from(RpcError::<TransportErrorKind>::ErrorResp(payload)),
            Error::Rpc { code: -32000, .. }
        ));
    }

    #[test]
    fn configuration_defaults_optional_sections() {
        let configuration: Configuration = serde_json::from_str(r#"{"endpoint": "http://localhost:8545", "timeout": 10}"#).unwrap();

        assert!(configuration.fallbacks.is_empty());
        assert_eq!(configuration.fallback_policy.consecutive_failures, 3);
        assert_eq!(configuration.confirmation.poll_interval, Duration::from_secs(1));
    }
}
