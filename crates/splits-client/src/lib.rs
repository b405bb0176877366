use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
pub use splits_common::service::monitoring::{Fmt, Verbosity};
pub use splits_evm::{ChainId, SignerConfiguration};
use splits_execution::registry::RegistryConfiguration;
pub use splits_execution::{CallData, Client, Error, ExecutionMode, Outcome};

pub mod format;
pub mod swapper;
pub mod templates;
pub mod types;
pub mod validation;

use crate::swapper::SwapperClient;
use crate::templates::TemplatesClient;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub verbosity: Verbosity,

    pub chain_id: ChainId,

    #[serde(default)]
    pub rpc: Option<splits_evm::Configuration>,

    #[serde(default)]
    pub signer: Option<SignerConfiguration>,

    #[serde(default)]
    pub registry: RegistryConfiguration,
}

impl Configuration {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let data = fs::read(path).map_err(|e| Error::Configuration(e.to_string()))?;

        serde_json::from_slice(&data).map_err(|e| Error::Configuration(e.to_string()))
    }

    pub fn execution(&self) -> splits_execution::Configuration {
        splits_execution::Configuration {
            chain_id: self.chain_id,
            rpc: self.rpc.clone(),
            signer: self.signer.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl FromStr for Configuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|e| Error::Configuration(e.to_string()))
    }
}

/// Entry point bundling every module client. All of them share the same chain, transport and
/// signer, and run in the same [`ExecutionMode`].
#[derive(Clone)]
pub struct SplitsClient {
    pub swapper: SwapperClient,
    pub templates: TemplatesClient,
}

impl SplitsClient {
    /// Builds the clients described by `configuration`. No subscriber is installed, use [`Fmt`]
    /// with the configured verbosity to get logs.
    pub fn new(configuration: &Configuration) -> Result<Self, Error> {
        Ok(Self::from_execution(Client::from_configuration(&configuration.execution())?))
    }

    pub fn from_execution(client: Client) -> Self {
        Self {
            swapper: SwapperClient::new(client.clone()),
            templates: TemplatesClient::new(client),
        }
    }

    pub fn with_mode(self, mode: ExecutionMode) -> Self {
        Self {
            swapper: self.swapper.with_mode(mode),
            templates: self.templates.with_mode(mode),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.swapper.mode()
    }

    /// Same clients, simulating operations instead of executing them
    pub fn estimate_gas(&self) -> Self {
        self.clone().with_mode(ExecutionMode::EstimateGas)
    }

    /// Same clients, returning unsigned payloads instead of executing operations
    pub fn call_data(&self) -> Self {
        self.clone().with_mode(ExecutionMode::BuildCallData)
    }
}
