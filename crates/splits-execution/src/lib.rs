use std::sync::Arc;

use serde::{Deserialize, Serialize};
use splits_evm::{ChainId, LocalSigner, RpcTransport, Signer, SignerConfiguration, Transport};

mod execution;
pub use execution::*;

pub mod events;
pub mod registry;

#[cfg(feature = "testing")]
pub mod testing;

mod error;
pub use error::Error;

use crate::registry::{ChainRegistry, RegistryConfiguration};

/// Execution client configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    /// Chain every operation of the client is sent to
    pub chain_id: ChainId,

    /// Node to talk to. Without it, every operation fails with [`Error::MissingProvider`].
    #[serde(default)]
    pub rpc: Option<splits_evm::Configuration>,

    /// Key used to sign transactions. Only needed to execute operations.
    #[serde(default)]
    pub signer: Option<SignerConfiguration>,

    #[serde(default)]
    pub registry: RegistryConfiguration,
}

/// Shared context of every operation: the chain, where the modules are deployed and the
/// handles used to reach the network.
#[derive(Clone)]
pub struct Client {
    chain_id: ChainId,
    registry: Arc<ChainRegistry>,

    transport: Option<Arc<dyn Transport>>,
    signer: Option<Arc<dyn Signer>>,
}

impl Client {
    pub fn new(chain_id: ChainId, registry: ChainRegistry) -> Self {
        Self {
            chain_id,
            registry: Arc::new(registry),
            transport: None,
            signer: None,
        }
    }

    /// Creates a client given a configuration. The RPC transport and the signer are only
    /// created when configured.
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, Error> {
        let mut client = Self::new(configuration.chain_id, ChainRegistry::new(&configuration.registry)?);

        if let Some(rpc) = &configuration.rpc {
            let transport = RpcTransport::new(configuration.chain_id, rpc).map_err(|e| Error::Configuration(e.to_string()))?;
            client = client.with_transport(Arc::new(transport));
        }

        if let Some(signer) = &configuration.signer {
            let signer = LocalSigner::new(signer).map_err(|e| Error::Configuration(e.to_string()))?;
            client = client.with_signer(Arc::new(signer));
        }

        Ok(client)
    }

    /// Rebinds the client to `chain_id`, keeping the registry and the network handles
    pub fn with_chain(mut self, chain_id: ChainId) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Returns the chain_id on which this client is bound
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use splits_evm::ChainId;

    use crate::{Client, Configuration, ContractKind};

    #[test]
    fn client_is_built_from_configuration() {
        let configuration: Configuration = serde_json::from_value(serde_json::json!({
            "chain_id": 10,
            "rpc": { "endpoint": "http://127.0.0.1:8545", "timeout": 5 },
            "registry": {
                "swapper_factory": { "10": "0xa244bbe019cf1ba177ee5a532250be2663fb55ca" },
            },
        }))
        .unwrap();

        let client = Client::from_configuration(&configuration).unwrap();

        assert_eq!(client.chain_id(), ChainId::OPTIMISM);
        assert!(client.has_transport());
        assert!(!client.has_signer());
        assert_eq!(client.registry().supported_chains(ContractKind::Swapper), vec![ChainId::OPTIMISM]);
        assert!(client.registry().resolve_address(ChainId::OPTIMISM, ContractKind::Recoup).is_err());
    }
}
