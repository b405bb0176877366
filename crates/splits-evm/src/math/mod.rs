use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;

/// On-chain representation of 100%, percentages are stored in parts per million
pub const PERCENTAGE_SCALE: u32 = 1_000_000;

/// Number of fractional digits of a percentage that survive the on-chain encoding
pub const PERCENTAGE_DECIMALS: i64 = 4;

const PERCENT_TO_PPM: u32 = PERCENTAGE_SCALE / 100;

/// Converts a percentage in `[0, 100]` into parts per million.
///
/// Returns `None` when the value is out of range or carries more than [`PERCENTAGE_DECIMALS`]
/// fractional digits, i.e. when the conversion would lose precision.
pub fn percent_to_ppm(percent: &BigDecimal) -> Option<u32> {
    if !has_percentage_scale(percent) {
        return None;
    }

    let scaled = percent.clone() * BigDecimal::from(PERCENT_TO_PPM);
    if !scaled.is_integer() {
        return None;
    }

    scaled.to_u32().filter(|ppm| *ppm <= PERCENTAGE_SCALE)
}

/// Whether `value` could be a percentage: at most [`PERCENTAGE_DECIMALS`] fractional digits and
/// no more than three integer digits. Only looks at the exponent, so it is cheap for any input.
pub fn has_percentage_scale(value: &BigDecimal) -> bool {
    let (_, scale) = value.normalized().as_bigint_and_exponent();

    (-2..=PERCENTAGE_DECIMALS).contains(&scale)
}

pub fn ppm_to_percent(ppm: u32) -> BigDecimal {
    BigDecimal::new(BigInt::from(ppm), PERCENTAGE_DECIMALS).normalized()
}

/// Scaled offer factor for a discount of `ppm`. A factor of [`PERCENTAGE_SCALE`] means no discount.
pub fn discount_to_scaled_offer_factor(ppm: u32) -> u32 {
    PERCENTAGE_SCALE.saturating_sub(ppm)
}

/// Discount percentage of a scaled offer factor. Factors above [`PERCENTAGE_SCALE`] are premiums
/// and yield a negative discount.
pub fn scaled_offer_factor_to_discount(factor: u32) -> BigDecimal {
    let discount = i64::from(PERCENTAGE_SCALE) - i64::from(factor);
    BigDecimal::new(BigInt::from(discount), PERCENTAGE_DECIMALS).normalized()
}
