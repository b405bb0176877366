use std::sync::Arc;

use alloy::primitives::{address, Address};
use splits_evm::testing::InMemoryTransport;
use splits_evm::{ChainId, LocalSigner, Signer};

use crate::registry::{ChainRegistry, RegistryConfiguration};
use crate::Client;

/// Clients wired to an in-memory transport and a throwaway signer
pub struct TestEnvironment {
    pub transport: Arc<InMemoryTransport>,
    pub signer: Arc<LocalSigner>,
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnvironment {
    pub const CHAIN_ID: ChainId = ChainId::MAINNET;
    pub const UNSUPPORTED_CHAIN_ID: ChainId = ChainId::new(31337);

    pub const SWAPPER_FACTORY: Address = address!("a244bbe019cf1ba177ee5a532250be2663fb55ca");
    pub const RECOUP: Address = address!("7dc1f1c4d7e9a4a0c5ac7c21b4c0c4d8a6e5b0f1");

    pub fn new() -> Self {
        Self::with_transport(InMemoryTransport::new(Self::CHAIN_ID))
    }

    pub fn with_transport(transport: InMemoryTransport) -> Self {
        Self {
            transport: Arc::new(transport),
            signer: Arc::new(LocalSigner::random()),
        }
    }

    pub fn registry_configuration() -> RegistryConfiguration {
        RegistryConfiguration {
            swapper_factory: [(Self::CHAIN_ID, Self::SWAPPER_FACTORY)].into(),
            recoup: [(Self::CHAIN_ID, Self::RECOUP)].into(),
        }
    }

    pub fn registry() -> ChainRegistry {
        ChainRegistry::new(&Self::registry_configuration()).expect("test registry is valid")
    }

    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    /// Client with a transport and a signer
    pub fn client(&self) -> Client {
        self.client_without_signer().with_signer(self.signer.clone())
    }

    pub fn client_without_signer(&self) -> Client {
        self.client_without_transport().with_transport(self.transport.clone())
    }

    pub fn client_without_transport(&self) -> Client {
        Client::new(Self::CHAIN_ID, Self::registry())
    }
}
