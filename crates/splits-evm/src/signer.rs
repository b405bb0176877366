use std::fmt::{Debug, Formatter};

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Clone, Serialize, Deserialize)]
pub struct SignerConfiguration {
    pub private_key: B256,
}

impl Debug for SignerConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerConfiguration").field("private_key", &"<redacted>").finish()
    }
}

#[async_trait]
pub trait Signer: Send + Sync {
    fn address(&self) -> Address;

    /// Signs a filled transaction and returns its EIP-2718 encoding, ready to be broadcast
    async fn sign_transaction(&self, request: TransactionRequest) -> Result<Bytes, Error>;
}

/// Signs with a private key held in memory
#[derive(Clone)]
pub struct LocalSigner {
    address: Address,
    wallet: EthereumWallet,
}

impl LocalSigner {
    pub fn new(configuration: &SignerConfiguration) -> Result<Self, Error> {
        let signer = PrivateKeySigner::from_bytes(&configuration.private_key).map_err(|e| Error::Signing(e.to_string()))?;

        Ok(Self::from_signer(signer))
    }

    pub fn random() -> Self {
        Self::from_signer(PrivateKeySigner::random())
    }

    fn from_signer(signer: PrivateKeySigner) -> Self {
        Self {
            address: signer.address(),
            wallet: EthereumWallet::from(signer),
        }
    }
}

#[async_trait]
impl Signer for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_transaction(&self, request: TransactionRequest) -> Result<Bytes, Error> {
        let envelope = request
            .with_from(self.address)
            .build(&self.wallet)
            .await
            .map_err(|e| Error::Signing(e.to_string()))?;

        Ok(envelope.encoded_2718().into())
    }
}
