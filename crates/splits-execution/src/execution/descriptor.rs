use std::fmt::{Display, Formatter};

use alloy::primitives::B256;
use serde::{Deserialize, Serialize};

/// Kind of contract an operation is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    SwapperFactory,
    Swapper,
    Recoup,
}

impl ContractKind {
    /// Kind whose deployments decide where this kind is supported. Swapper instances live
    /// wherever their factory is deployed.
    pub fn deployment(&self) -> ContractKind {
        match self {
            Self::Swapper => Self::SwapperFactory,
            kind => *kind,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SwapperFactory => "swapper_factory",
            Self::Swapper => "swapper",
            Self::Recoup => "recoup",
        }
    }
}

impl Display for ContractKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static description of a callable operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Contract function name
    pub name: &'static str,
    pub contract: ContractKind,

    /// Argument names in declaration order
    pub parameters: &'static [&'static str],

    /// Topics of the events proving success, by priority. Empty for queries.
    pub events: &'static [B256],
}

impl OperationDescriptor {
    pub fn is_query(&self) -> bool {
        self.events.is_empty()
    }
}
