use alloy::primitives::TxHash;
use splits_evm::ChainId;
use thiserror::Error;

fn display_chains(chains: &[ChainId]) -> String {
    if chains.is_empty() {
        return "none".to_string();
    }

    chains.iter().map(|chain| chain.to_string()).collect::<Vec<_>>().join(", ")
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument {0}")]
    InvalidArgument(String),

    #[error("invalid {field}: {constraint}")]
    Validation { field: String, constraint: String },

    #[error("chain {chain_id} is not supported, supported chains: {}", display_chains(.supported))]
    UnsupportedChain { chain_id: ChainId, supported: Vec<ChainId> },

    #[error("no provider configured")]
    MissingProvider,

    #[error("no signer configured")]
    MissingSigner,

    #[error("transaction {hash} failed: {reason}")]
    TransactionFailed { hash: TxHash, reason: String },

    #[error("invalid response {0}")]
    InvalidResponse(String),

    #[error("network error {0}")]
    Network(#[from] splits_evm::Error),

    #[error("invalid configuration {0}")]
    Configuration(String),
}

impl Error {
    pub fn validation(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
        }
    }
}
