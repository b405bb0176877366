//! Validation of domain parameters.
//!
//! Validators never touch the network. They return the parsed value so that formatting works
//! on values which are known to be valid.

use std::collections::HashSet;
use std::str::FromStr;

use alloy::primitives::{Address, Bytes, U256};
use bigdecimal::BigDecimal;
use splits_evm::math::{has_percentage_scale, percent_to_ppm, ppm_to_percent, PERCENTAGE_SCALE};
use splits_execution::Error;

use crate::types::{
    CreateRecoupConfig, CreateSwapperConfig, OracleConfig, QuotePairConfig, RecoupTrancheConfig, ScaledOfferFactorOverride, SplitRecipientsConfig,
    SwapperCallConfig, TrancheRecipientConfig,
};

const MAX_DISTRIBUTOR_FEE: u32 = PERCENTAGE_SCALE / 10;

/// Percentage in `[0, 100]` stored in parts per million
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(u32);

impl Percent {
    pub fn ppm(&self) -> u32 {
        self.0
    }

    pub fn as_decimal(&self) -> BigDecimal {
        ppm_to_percent(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Oracle {
    Existing(Address),
    Create { factory: Address, data: Bytes },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotePair {
    pub base: Address,
    pub quote: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairOverride {
    pub pair: QuotePair,
    pub discount: Percent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRecipients {
    pub recipients: Vec<(Address, Percent)>,
    pub distributor_fee: Percent,
    pub controller: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrancheRecipient {
    Single(Address),
    Split(SplitRecipients),
}

/// `size` is `None` for the last, open-ended, tranche only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tranche {
    pub recipient: TrancheRecipient,
    pub size: Option<U256>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonWaterfallRecipient {
    pub address: Address,
    pub tranche_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapperCall {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapperParameters {
    pub owner: Address,
    pub paused: bool,
    pub beneficiary: Address,
    pub token_to_beneficiary: Address,
    pub oracle: Oracle,
    pub default_discount: Percent,
    pub overrides: Vec<PairOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoupParameters {
    pub token: Address,
    pub tranches: Vec<Tranche>,
    pub non_waterfall_recipient: Option<NonWaterfallRecipient>,
}

/// Parses a 0x-prefixed 20-byte hexadecimal address. Mixed-case input must carry a valid
/// EIP-55 checksum.
pub fn validate_address(field: &str, value: &str) -> Result<Address, Error> {
    let Some(digits) = value.strip_prefix("0x") else {
        return Err(Error::validation(field, "address must start with 0x"));
    };

    let address = Address::from_str(value).map_err(|_| Error::validation(field, "address must be 20 bytes of hexadecimal"))?;

    let has_lowercase = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lowercase && has_uppercase && address.to_checksum(None) != value {
        return Err(Error::validation(field, "address checksum is invalid"));
    }

    Ok(address)
}

/// Same as [`validate_address`], the zero address meaning no recipient
pub fn validate_optional_recipient(field: &str, value: Option<&str>) -> Result<Option<Address>, Error> {
    match value {
        None => Ok(None),
        Some(value) => validate_address(field, value).map(|address| Some(address).filter(|address| !address.is_zero())),
    }
}

/// Percentage in `[0, 100]` with at most four fractional digits
pub fn validate_percentage(field: &str, value: &BigDecimal) -> Result<Percent, Error> {
    // Checked on the exponent first, comparing or scaling an extreme exponent is unbounded work
    if !has_percentage_scale(value) {
        return Err(Error::validation(field, "percentage must be between 0 and 100 with at most 4 decimals"));
    }

    if *value < BigDecimal::from(0) || *value > BigDecimal::from(100) {
        return Err(Error::validation(field, "percentage must be between 0 and 100"));
    }

    percent_to_ppm(value)
        .map(Percent)
        .ok_or_else(|| Error::validation(field, "percentage must have at most 4 decimals"))
}

/// Discount applied to the oracle quote, as a percentage
pub fn validate_scaled_offer_factor(field: &str, value: &BigDecimal) -> Result<Percent, Error> {
    validate_percentage(field, value)
}

pub fn validate_oracle(field: &str, oracle: &OracleConfig) -> Result<Oracle, Error> {
    match oracle {
        OracleConfig::Existing { address } => {
            let address = validate_address(&format!("{}.address", field), address)?;
            if address.is_zero() {
                return Err(Error::validation(format!("{}.address", field), "oracle cannot be the zero address"));
            }

            Ok(Oracle::Existing(address))
        },
        OracleConfig::Create { factory, data } => {
            let factory = validate_address(&format!("{}.factory", field), factory)?;
            if factory.is_zero() {
                return Err(Error::validation(format!("{}.factory", field), "oracle factory cannot be the zero address"));
            }

            Ok(Oracle::Create { factory, data: data.clone() })
        },
    }
}

pub fn validate_quote_pairs(field: &str, pairs: &[QuotePairConfig]) -> Result<Vec<QuotePair>, Error> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| validate_quote_pair(&format!("{}[{}]", field, i), &pair.base_token, &pair.quote_token))
        .collect()
}

fn validate_quote_pair(field: &str, base: &str, quote: &str) -> Result<QuotePair, Error> {
    let pair = QuotePair {
        base: validate_address(&format!("{}.base_token", field), base)?,
        quote: validate_address(&format!("{}.quote_token", field), quote)?,
    };

    if pair.base == pair.quote {
        return Err(Error::validation(field, "base and quote tokens must differ"));
    }

    Ok(pair)
}

/// Each pair may be overridden once
pub fn validate_scaled_offer_factor_overrides(field: &str, overrides: &[ScaledOfferFactorOverride]) -> Result<Vec<PairOverride>, Error> {
    let mut pairs = HashSet::new();
    let mut validated = Vec::with_capacity(overrides.len());

    for (i, value) in overrides.iter().enumerate() {
        let field = format!("{}[{}]", field, i);
        let pair = validate_quote_pair(&field, &value.base_token, &value.quote_token)?;
        let discount = validate_scaled_offer_factor(&format!("{}.scaled_offer_factor_percent", field), &value.scaled_offer_factor_percent)?;

        if !pairs.insert((pair.base, pair.quote)) {
            return Err(Error::validation(field, "pair is overridden more than once"));
        }

        validated.push(PairOverride { pair, discount });
    }

    Ok(validated)
}

/// At least two distinct recipients whose allocations add up to 100%, and a distributor fee of at
/// most 10%
pub fn validate_split_recipients(field: &str, split: &SplitRecipientsConfig) -> Result<SplitRecipients, Error> {
    if split.recipients.len() < 2 {
        return Err(Error::validation(format!("{}.recipients", field), "at least two recipients are required"));
    }

    let mut addresses = HashSet::new();
    let mut recipients = Vec::with_capacity(split.recipients.len());
    for (i, recipient) in split.recipients.iter().enumerate() {
        let field = format!("{}.recipients[{}]", field, i);
        let address = validate_address(&format!("{}.address", field), &recipient.address)?;
        let allocation = validate_percentage(&format!("{}.percent_allocation", field), &recipient.percent_allocation)?;

        if allocation.ppm() == 0 {
            return Err(Error::validation(format!("{}.percent_allocation", field), "allocation must be positive"));
        }

        if !addresses.insert(address) {
            return Err(Error::validation(format!("{}.address", field), "recipient is listed more than once"));
        }

        recipients.push((address, allocation));
    }

    let total: u64 = recipients.iter().map(|(_, allocation)| u64::from(allocation.ppm())).sum();
    if total != u64::from(PERCENTAGE_SCALE) {
        return Err(Error::validation(format!("{}.recipients", field), "allocations must add up to 100"));
    }

    let fee_field = format!("{}.distributor_fee_percent", field);
    let distributor_fee = validate_percentage(&fee_field, &split.distributor_fee_percent)?;
    if distributor_fee.ppm() > MAX_DISTRIBUTOR_FEE {
        return Err(Error::validation(fee_field, "distributor fee must be at most 10"));
    }

    Ok(SplitRecipients {
        recipients,
        distributor_fee,
        controller: validate_optional_recipient(&format!("{}.controller", field), split.controller.as_deref())?,
    })
}

/// At least two tranches. Every tranche but the last has a positive size, the last one receives
/// whatever remains.
pub fn validate_recoup_tranches(field: &str, tranches: &[RecoupTrancheConfig]) -> Result<Vec<Tranche>, Error> {
    if tranches.len() < 2 {
        return Err(Error::validation(field, "at least two tranches are required"));
    }

    let last = tranches.len() - 1;
    let mut threshold = U256::ZERO;
    let mut validated = Vec::with_capacity(tranches.len());

    for (i, tranche) in tranches.iter().enumerate() {
        let field = format!("{}[{}]", field, i);
        let recipient = match &tranche.recipient {
            TrancheRecipientConfig::Address(address) => {
                let address = validate_address(&format!("{}.recipient", field), address)?;
                if address.is_zero() {
                    return Err(Error::validation(format!("{}.recipient", field), "recipient cannot be the zero address"));
                }

                TrancheRecipient::Single(address)
            },
            TrancheRecipientConfig::Split(split) => TrancheRecipient::Split(validate_split_recipients(&format!("{}.recipient", field), split)?),
        };

        let size = match (i == last, tranche.size) {
            (true, None) => None,
            (true, Some(_)) => return Err(Error::validation(format!("{}.size", field), "last tranche cannot have a size")),
            (false, None) => return Err(Error::validation(format!("{}.size", field), "tranche size is required")),
            (false, Some(size)) if size.is_zero() => return Err(Error::validation(format!("{}.size", field), "tranche size must be positive")),
            (false, Some(size)) => {
                threshold = threshold
                    .checked_add(size)
                    .ok_or_else(|| Error::validation(format!("{}.size", field), "cumulative tranche size overflows"))?;

                Some(size)
            },
        };

        validated.push(Tranche { recipient, size });
    }

    Ok(validated)
}

/// The tranche index is given exactly when the recipient is, and must reference a tranche
pub fn check_non_waterfall_recipient(tranche_count: usize, recipient: Option<Address>, tranche_index: Option<usize>) -> Result<Option<NonWaterfallRecipient>, Error> {
    match (recipient, tranche_index) {
        (None, None) => Ok(None),
        (None, Some(_)) => Err(Error::InvalidArgument(
            "non-waterfall tranche index cannot be set without a non-waterfall recipient".to_string(),
        )),
        (Some(_), None) => Err(Error::InvalidArgument("non-waterfall recipient requires a tranche index".to_string())),
        (Some(_), Some(index)) if index >= tranche_count => Err(Error::InvalidArgument(format!(
            "non-waterfall tranche index {} is out of range, there are {} tranches",
            index, tranche_count
        ))),
        (Some(address), Some(tranche_index)) => Ok(Some(NonWaterfallRecipient { address, tranche_index })),
    }
}

/// Returns the calls and the total value they transfer
pub fn validate_swapper_calls(field: &str, calls: &[SwapperCallConfig]) -> Result<(Vec<SwapperCall>, U256), Error> {
    if calls.is_empty() {
        return Err(Error::validation(field, "at least one call is required"));
    }

    let mut value = U256::ZERO;
    let mut validated = Vec::with_capacity(calls.len());
    for (i, call) in calls.iter().enumerate() {
        let field = format!("{}[{}]", field, i);
        let to = validate_address(&format!("{}.to", field), &call.to)?;
        value = value
            .checked_add(call.value)
            .ok_or_else(|| Error::validation(format!("{}.value", field), "total value overflows"))?;

        validated.push(SwapperCall {
            to,
            value: call.value,
            data: call.data.clone(),
        });
    }

    Ok((validated, value))
}

pub fn validate_create_swapper(config: &CreateSwapperConfig) -> Result<SwapperParameters, Error> {
    Ok(SwapperParameters {
        owner: validate_address("owner", &config.owner)?,
        paused: config.paused,
        beneficiary: validate_address("beneficiary", &config.beneficiary)?,
        token_to_beneficiary: validate_address("token_to_beneficiary", &config.token_to_beneficiary)?,
        oracle: validate_oracle("oracle", &config.oracle)?,
        default_discount: validate_scaled_offer_factor("default_scaled_offer_factor_percent", &config.default_scaled_offer_factor_percent)?,
        overrides: validate_scaled_offer_factor_overrides("scaled_offer_factor_overrides", &config.scaled_offer_factor_overrides)?,
    })
}

pub fn validate_create_recoup(config: &CreateRecoupConfig) -> Result<RecoupParameters, Error> {
    let token = validate_address("token", &config.token)?;
    let tranches = validate_recoup_tranches("tranches", &config.tranches)?;
    let recipient = validate_optional_recipient("non_waterfall_recipient", config.non_waterfall_recipient.as_deref())?;

    Ok(RecoupParameters {
        non_waterfall_recipient: check_non_waterfall_recipient(tranches.len(), recipient, config.non_waterfall_tranche_index)?,
        token,
        tranches,
    })
}
