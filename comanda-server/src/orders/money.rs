//! Money helpers
//!
//! All monetary arithmetic happens in [`Decimal`] with 2-dp half-up
//! rounding; the storage layer holds integer cents and tariff
//! multipliers as integer hundredths.

use rust_decimal::prelude::*;

/// Currency scale (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

/// Round to currency precision, half away from zero
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Decimal currency amount → integer cents
pub fn to_cents(value: Decimal) -> i64 {
    (round2(value) * Decimal::ONE_HUNDRED)
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// Integer cents → decimal currency amount
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, DECIMAL_PLACES)
}

/// Integer hundredths → tariff multiplier (120 → 1.20)
pub fn multiplier_from_hundredths(hundredths: i64) -> Decimal {
    Decimal::new(hundredths, DECIMAL_PLACES)
}

/// Tariff multiplier → integer hundredths (1.20 → 120)
pub fn multiplier_to_hundredths(multiplier: Decimal) -> i64 {
    to_cents(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_round_trip() {
        let amount = Decimal::new(2904, 2); // 29.04
        assert_eq!(to_cents(amount), 2904);
        assert_eq!(from_cents(2904), amount);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round2(Decimal::new(10125, 3)), Decimal::new(1013, 2)); // 10.125 → 10.13
        assert_eq!(round2(Decimal::new(10124, 3)), Decimal::new(1012, 2)); // 10.124 → 10.12
    }

    #[test]
    fn multiplier_hundredths_round_trip() {
        assert_eq!(multiplier_from_hundredths(120), Decimal::new(12, 1).round_dp(2));
        assert_eq!(multiplier_to_hundredths(Decimal::new(120, 2)), 120);
        assert_eq!(multiplier_from_hundredths(100), Decimal::ONE.round_dp(2));
    }
}
