//! Conversion of validated parameters into the positional values the contracts expect.
//!
//! Every function here is infallible: the validators already rejected whatever cannot be encoded.

use alloy::primitives::{Address, U256};
use splits_evm::contract;
use splits_evm::math::{discount_to_scaled_offer_factor, PERCENTAGE_SCALE};

use crate::validation::{NonWaterfallRecipient, Oracle, PairOverride, Percent, QuotePair, SplitRecipients, SwapperCall, SwapperParameters, Tranche, TrancheRecipient};

pub fn format_scaled_offer_factor(discount: Percent) -> u32 {
    discount_to_scaled_offer_factor(discount.ppm())
}

pub fn format_oracle(oracle: &Oracle) -> contract::OracleParams {
    match oracle {
        Oracle::Existing(address) => contract::OracleParams {
            oracle: *address,
            createOracleParams: contract::CreateOracleParams {
                factory: Address::ZERO,
                data: Default::default(),
            },
        },
        Oracle::Create { factory, data } => contract::OracleParams {
            oracle: Address::ZERO,
            createOracleParams: contract::CreateOracleParams {
                factory: *factory,
                data: data.clone(),
            },
        },
    }
}

pub fn format_quote_pair(pair: &QuotePair) -> contract::QuotePair {
    contract::QuotePair {
        base: pair.base,
        quote: pair.quote,
    }
}

pub fn format_scaled_offer_factor_overrides(overrides: &[PairOverride]) -> Vec<contract::SetPairScaledOfferFactorParams> {
    overrides
        .iter()
        .map(|value| contract::SetPairScaledOfferFactorParams {
            quotePair: format_quote_pair(&value.pair),
            scaledOfferFactor: format_scaled_offer_factor(value.discount),
        })
        .collect()
}

pub fn format_create_swapper(parameters: &SwapperParameters) -> contract::CreateSwapperParams {
    contract::CreateSwapperParams {
        owner: parameters.owner,
        paused: parameters.paused,
        beneficiary: parameters.beneficiary,
        tokenToBeneficiary: parameters.token_to_beneficiary,
        oracleParams: format_oracle(&parameters.oracle),
        defaultScaledOfferFactor: format_scaled_offer_factor(parameters.default_discount),
        pairScaledOfferFactors: format_scaled_offer_factor_overrides(&parameters.overrides),
    }
}

pub fn format_swapper_calls(calls: &[SwapperCall]) -> Vec<contract::SwapperCall> {
    calls
        .iter()
        .map(|call| contract::SwapperCall {
            to: call.to,
            value: call.value,
            data: call.data.clone(),
        })
        .collect()
}

/// Recipients sorted by address, allocations following their recipient
pub fn format_split_recipients(split: &SplitRecipients) -> (Vec<Address>, Vec<u32>) {
    let mut recipients = split.recipients.clone();
    recipients.sort_by_key(|(address, _)| *address);

    recipients.into_iter().map(|(address, allocation)| (address, allocation.ppm())).unzip()
}

/// A single recipient receives the whole tranche. The open-ended last tranche has a size of zero.
pub fn format_tranche(tranche: &Tranche) -> contract::Tranche {
    let size = tranche.size.unwrap_or(U256::ZERO);

    match &tranche.recipient {
        TrancheRecipient::Single(address) => contract::Tranche {
            recipients: vec![*address],
            percentAllocations: vec![PERCENTAGE_SCALE],
            controller: Address::ZERO,
            distributorFee: 0,
            size,
        },
        TrancheRecipient::Split(split) => {
            let (recipients, allocations) = format_split_recipients(split);

            contract::Tranche {
                recipients,
                percentAllocations: allocations,
                controller: split.controller.unwrap_or(Address::ZERO),
                distributorFee: split.distributor_fee.ppm(),
                size,
            }
        },
    }
}

pub fn format_tranches(tranches: &[Tranche]) -> Vec<contract::Tranche> {
    tranches.iter().map(format_tranche).collect()
}

/// Without a recipient, the index points past the last tranche
pub fn format_non_waterfall_recipient(recipient: Option<&NonWaterfallRecipient>, tranche_count: usize) -> (Address, U256) {
    match recipient {
        Some(recipient) => (recipient.address, U256::from(recipient.tranche_index)),
        None => (Address::ZERO, U256::from(tranche_count)),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::primitives::{address, Address, Bytes, U256};
    use bigdecimal::BigDecimal;
    use splits_evm::math::scaled_offer_factor_to_discount;

    use super::*;
    use crate::validation::{validate_percentage, validate_scaled_offer_factor};

    const ALICE: Address = address!("00000000000000000000000000000000000000a1");
    const BOB: Address = address!("00000000000000000000000000000000000000b0");
    const CAROL: Address = address!("00000000000000000000000000000000000000c4");

    fn percent(value: &str) -> Percent {
        validate_percentage("p", &BigDecimal::from_str(value).unwrap()).unwrap()
    }

    #[test]
    fn discount_round_trips_through_the_scaled_offer_factor() {
        for value in ["0", "0.0001", "0.5", "1", "25.1234", "99.9999", "100"] {
            let discount = validate_scaled_offer_factor("p", &BigDecimal::from_str(value).unwrap()).unwrap();
            let factor = format_scaled_offer_factor(discount);

            assert!(factor <= PERCENTAGE_SCALE);
            assert_eq!(scaled_offer_factor_to_discount(factor), BigDecimal::from_str(value).unwrap());
        }
    }

    #[test]
    fn no_discount_is_the_full_scale() {
        assert_eq!(format_scaled_offer_factor(percent("0")), 1_000_000);
        assert_eq!(format_scaled_offer_factor(percent("1")), 990_000);
        assert_eq!(format_scaled_offer_factor(percent("100")), 0);
    }

    #[test]
    fn existing_oracle_leaves_the_creation_request_empty() {
        let params = format_oracle(&Oracle::Existing(ALICE));
        assert_eq!(params.oracle, ALICE);
        assert_eq!(params.createOracleParams.factory, Address::ZERO);
        assert!(params.createOracleParams.data.is_empty());

        let params = format_oracle(&Oracle::Create {
            factory: BOB,
            data: Bytes::from(vec![1u8, 2]),
        });
        assert_eq!(params.oracle, Address::ZERO);
        assert_eq!(params.createOracleParams.factory, BOB);
        assert_eq!(params.createOracleParams.data.as_ref(), &[1u8, 2]);
    }

    #[test]
    fn split_recipients_are_sorted_with_their_allocations() {
        let split = SplitRecipients {
            recipients: vec![(CAROL, percent("50")), (ALICE, percent("20")), (BOB, percent("30"))],
            distributor_fee: percent("1.5"),
            controller: None,
        };

        let (recipients, allocations) = format_split_recipients(&split);
        assert_eq!(recipients, vec![ALICE, BOB, CAROL]);
        assert_eq!(allocations, vec![200_000, 300_000, 500_000]);

        let tranche = format_tranche(&Tranche {
            recipient: TrancheRecipient::Split(split),
            size: Some(U256::from(10)),
        });
        assert_eq!(tranche.distributorFee, 15_000);
        assert_eq!(tranche.controller, Address::ZERO);
        assert_eq!(tranche.size, U256::from(10));
    }

    #[test]
    fn single_recipient_takes_the_whole_tranche() {
        let tranche = format_tranche(&Tranche {
            recipient: TrancheRecipient::Single(BOB),
            size: None,
        });

        assert_eq!(tranche.recipients, vec![BOB]);
        assert_eq!(tranche.percentAllocations, vec![PERCENTAGE_SCALE]);
        assert_eq!(tranche.size, U256::ZERO);
    }

    #[test]
    fn absent_non_waterfall_recipient_points_past_the_tranches() {
        assert_eq!(format_non_waterfall_recipient(None, 3), (Address::ZERO, U256::from(3)));

        let recipient = NonWaterfallRecipient { address: ALICE, tranche_index: 1 };
        assert_eq!(format_non_waterfall_recipient(Some(&recipient), 3), (ALICE, U256::from(1)));
    }
}
