//! 金额换算：数据库存整数分，业务与接口层使用两位小数的 Decimal

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// 四舍六入五成双保留两位小数，并固定两位小数的显示精度
pub fn round(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub fn to_cents(amount: Decimal) -> i64 {
    (round(amount) * Decimal::ONE_HUNDRED)
        .trunc()
        .to_i64()
        .unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_is_bankers_and_keeps_two_places() {
        assert_eq!(round(Decimal::from_str("2.345").unwrap()).to_string(), "2.34");
        assert_eq!(round(Decimal::from_str("2.355").unwrap()).to_string(), "2.36");
        assert_eq!(round(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(round(Decimal::from(1500)).to_string(), "1500.00");
    }

    #[test]
    fn test_cents_conversion() {
        assert_eq!(to_cents(Decimal::from_str("1234.56").unwrap()), 123456);
        assert_eq!(to_cents(Decimal::from_str("0.015").unwrap()), 2);
        assert_eq!(from_cents(123456).to_string(), "1234.56");
        assert_eq!(from_cents(0).to_string(), "0.00");
    }
}
