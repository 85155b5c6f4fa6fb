use rust_decimal::RoundingStrategy;

use crate::core::GenericResult;
use crate::types::Decimal;

pub enum DecimalRestrictions {
    PositiveOrZero,
    StrictlyPositive,
}

pub fn validate_decimal(value: Decimal, restrictions: DecimalRestrictions) -> GenericResult<Decimal> {
    if !match restrictions {
        DecimalRestrictions::PositiveOrZero => !value.is_sign_negative(),
        DecimalRestrictions::StrictlyPositive => value.is_sign_positive() && !value.is_zero(),
    } {
        return Err!("The value doesn't comply to the specified restrictions");
    }

    Ok(value)
}

pub fn validate_named_decimal(name: &str, value: Decimal, restrictions: DecimalRestrictions) -> GenericResult<Decimal> {
    Ok(validate_decimal(value, restrictions).map_err(|e| format!(
        "Invalid {}: {}", name, e))?)
}

pub fn round_to(value: Decimal, points: u32) -> Decimal {
    value.round_dp_with_strategy(points, RoundingStrategy::MidpointAwayFromZero).normalize()
}

pub fn round(value: Decimal) -> Decimal {
    round_to(value, 2)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[rstest(value, points, expected,
        case("1",      2, "1"),
        case("1.004",  2, "1"),
        case("1.005",  2, "1.01"),
        case("1.2345", 2, "1.23"),
        case("1.2350", 2, "1.24"),
        case("1.30",   2, "1.3"),
        case("1.5",    0, "2"),
        case("-1.005", 2, "-1.01"),
    )]
    fn rounding(value: &str, points: u32, expected: &str) {
        let value: Decimal = value.parse().unwrap();
        let expected: Decimal = expected.parse().unwrap();
        assert_eq!(round_to(value, points), expected);
    }
}
