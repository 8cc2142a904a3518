//! Currency rounding

use bigdecimal::{BigDecimal, RoundingMode};

/// Decimal places kept on stored amounts
pub const CURRENCY_SCALE: i64 = 2;

/// Round a currency amount to two decimals, half-up
pub fn round_currency(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(CURRENCY_SCALE, RoundingMode::HalfUp)
}

/// Round to the nearest whole currency unit, half-up (display only)
pub fn round_whole(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(0, RoundingMode::HalfUp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_half_up() {
        assert_eq!(round_currency(&dec("0.125")), dec("0.13"));
        assert_eq!(round_currency(&dec("0.124999")), dec("0.12"));
        assert_eq!(round_currency(&dec("2.675")), dec("2.68"));
        assert_eq!(round_currency(&dec("10")), dec("10.00"));
    }

    #[test]
    fn test_whole() {
        assert_eq!(round_whole(&dec("235.50")), dec("236"));
        assert_eq!(round_whole(&dec("235.49")), dec("235"));
    }
}
