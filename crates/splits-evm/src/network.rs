use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// EVM chain identifier (EIP-155). Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ChainId(u64);

#[rustfmt::skip]
const NAMES: &[(ChainId, &str)] = &[
    (ChainId::MAINNET,   "mainnet"),
    (ChainId::OPTIMISM,  "optimism"),
    (ChainId::BSC,       "bsc"),
    (ChainId::GNOSIS,    "gnosis"),
    (ChainId::POLYGON,   "polygon"),
    (ChainId::FANTOM,    "fantom"),
    (ChainId::BASE,      "base"),
    (ChainId::HOLESKY,   "holesky"),
    (ChainId::ARBITRUM,  "arbitrum"),
    (ChainId::AVALANCHE, "avalanche"),
    (ChainId::ZORA,      "zora"),
    (ChainId::SEPOLIA,   "sepolia"),
];

impl ChainId {
    pub const MAINNET: Self = Self(1);
    pub const OPTIMISM: Self = Self(10);
    pub const BSC: Self = Self(56);
    pub const GNOSIS: Self = Self(100);
    pub const POLYGON: Self = Self(137);
    pub const FANTOM: Self = Self(250);
    pub const BASE: Self = Self(8453);
    pub const HOLESKY: Self = Self(17000);
    pub const ARBITRUM: Self = Self(42161);
    pub const AVALANCHE: Self = Self(43114);
    pub const ZORA: Self = Self(7777777);
    pub const SEPOLIA: Self = Self(11155111);

    /// Builds a chain id without validation. Intended for constants; prefer `TryFrom<u64>`.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the well-known name of the chain if any
    pub fn name(&self) -> Option<&'static str> {
        NAMES.iter().find(|(id, _)| id == self).map(|(_, name)| *name)
    }

    /// Convert a chain name (e.g. `mainnet`, case-insensitive) or a decimal id into a ChainId
    ///
    /// If the conversion fail, return an error
    pub fn from_string(s: &str) -> Result<Self, Error> {
        let name = s.trim().to_lowercase();
        if let Some((id, _)) = NAMES.iter().find(|(_, known)| *known == name) {
            return Ok(*id);
        }

        let id = name.parse::<u64>().map_err(|_| Error::InvalidChainId(s.to_string()))?;
        Self::try_from(id)
    }
}

impl TryFrom<u64> for ChainId {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Err(Error::InvalidChainId(value.to_string())),
            id => Ok(Self(id)),
        }
    }
}

impl From<ChainId> for u64 {
    fn from(value: ChainId) -> Self {
        value.0
    }
}

impl FromStr for ChainId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}
