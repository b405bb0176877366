use alloy::primitives::{Bytes, U256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Parameters of a new swapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSwapperConfig {
    pub owner: String,

    #[serde(default)]
    pub paused: bool,

    pub beneficiary: String,
    pub token_to_beneficiary: String,
    pub oracle: OracleConfig,

    /// Discount, in percent, applied to the oracle quote
    pub default_scaled_offer_factor_percent: BigDecimal,

    #[serde(default)]
    pub scaled_offer_factor_overrides: Vec<ScaledOfferFactorOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleConfig {
    /// Use an already deployed oracle
    Existing { address: String },

    /// Deploy an oracle through `factory`, `data` being the factory's initialization payload
    Create { factory: String, data: Bytes },
}

/// Discount overriding the default one for a given pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaledOfferFactorOverride {
    pub base_token: String,
    pub quote_token: String,
    pub scaled_offer_factor_percent: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePairConfig {
    pub base_token: String,
    pub quote_token: String,
}

/// Arbitrary call made by a swapper on behalf of its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapperCallConfig {
    pub to: String,

    #[serde(default)]
    pub value: U256,

    #[serde(default)]
    pub data: Bytes,
}

/// Parameters of a new recoup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRecoupConfig {
    pub token: String,
    pub tranches: Vec<RecoupTrancheConfig>,

    /// Receives the tokens which are not `token`. The zero address means no recipient.
    #[serde(default)]
    pub non_waterfall_recipient: Option<String>,

    /// Tranche whose recipient receives the tokens which are not `token`. Must be set exactly
    /// when `non_waterfall_recipient` is not.
    #[serde(default)]
    pub non_waterfall_tranche_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoupTrancheConfig {
    pub recipient: TrancheRecipientConfig,

    /// Amount of `token`, in base units, the tranche receives. Absent for the last tranche.
    #[serde(default)]
    pub size: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrancheRecipientConfig {
    Address(String),
    Split(SplitRecipientsConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRecipientsConfig {
    pub recipients: Vec<SplitRecipient>,

    #[serde(default)]
    pub distributor_fee_percent: BigDecimal,

    #[serde(default)]
    pub controller: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRecipient {
    pub address: String,
    pub percent_allocation: BigDecimal,
}
