use std::collections::{BTreeMap, HashMap};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use splits_evm::ChainId;

use crate::{ContractKind, Error};

/// Addresses of the deployed modules, per chain
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfiguration {
    #[serde(default)]
    pub swapper_factory: BTreeMap<ChainId, Address>,

    #[serde(default)]
    pub recoup: BTreeMap<ChainId, Address>,
}

/// Read-only lookup of deployments. Never touches the network.
#[derive(Clone, Debug, Default)]
pub struct ChainRegistry {
    deployments: HashMap<ContractKind, BTreeMap<ChainId, Address>>,
}

impl ChainRegistry {
    pub fn new(configuration: &RegistryConfiguration) -> Result<Self, Error> {
        let mut registry = Self::default();

        #[rustfmt::skip]
        let tables = [
            (ContractKind::SwapperFactory, &configuration.swapper_factory),
            (ContractKind::Recoup,         &configuration.recoup),
        ];

        for (kind, table) in tables {
            for (chain_id, address) in table {
                registry = registry.with_deployment(kind, *chain_id, *address)?;
            }
        }

        Ok(registry)
    }

    /// Registers `address` as the deployment of `kind` on `chain_id`
    pub fn with_deployment(mut self, kind: ContractKind, chain_id: ChainId, address: Address) -> Result<Self, Error> {
        if kind.deployment() != kind {
            return Err(Error::InvalidArgument(format!("{} instances are not registered deployments", kind)));
        }

        if address.is_zero() {
            return Err(Error::InvalidArgument(format!("{} deployment on chain {} cannot be the zero address", kind, chain_id)));
        }

        self.deployments.entry(kind).or_default().insert(chain_id, address);
        Ok(self)
    }

    /// Chains where operations on `kind` are supported, in ascending order
    pub fn supported_chains(&self, kind: ContractKind) -> Vec<ChainId> {
        self.deployments
            .get(&kind.deployment())
            .map(|table| table.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Fails with [`Error::UnsupportedChain`] when operations on `kind` are not available on `chain_id`
    pub fn assert_supported(&self, chain_id: ChainId, kind: ContractKind) -> Result<(), Error> {
        let supported = self
            .deployments
            .get(&kind.deployment())
            .is_some_and(|table| table.contains_key(&chain_id));

        match supported {
            true => Ok(()),
            false => Err(Error::UnsupportedChain {
                chain_id,
                supported: self.supported_chains(kind),
            }),
        }
    }

    /// Returns the address `kind` is deployed at on `chain_id`
    pub fn resolve_address(&self, chain_id: ChainId, kind: ContractKind) -> Result<Address, Error> {
        if kind.deployment() != kind {
            return Err(Error::InvalidArgument(format!("{} instances have no registered address", kind)));
        }

        self.assert_supported(chain_id, kind)?;

        self.deployments
            .get(&kind)
            .and_then(|table| table.get(&chain_id))
            .copied()
            .ok_or_else(|| Error::UnsupportedChain {
                chain_id,
                supported: self.supported_chains(kind),
            })
    }
}
