use std::collections::BTreeMap;
use std::ops::Bound;

use serde::Serialize;

use crate::core::GenericResult;
use crate::taxes;
use crate::types::Decimal;

/// One row of a progressive tax table. `max` is unset for the top bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaxBracket {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

/// Progressive tax scale: a contiguous set of brackets covering [0, ∞) with
/// increasing rates. Tax is calculated by marginal bracket accumulation: each
/// bracket's rate applies only to the portion of income within that bracket.
#[derive(Debug, Clone)]
pub struct ProgressiveTaxScale {
    rates: BTreeMap<Decimal, Decimal>,
    precision: u32,
}

impl ProgressiveTaxScale {
    /// Builds the scale from (lower bound, percent) rows sorted in ascending
    /// order by the caller.
    pub fn new(brackets: &[(Decimal, Decimal)], precision: u32) -> GenericResult<ProgressiveTaxScale> {
        let mut rates = BTreeMap::new();

        for &(threshold, percent) in brackets {
            if percent.is_sign_negative() || percent > dec!(100) {
                return Err!("Invalid tax rate: {}%", percent);
            }

            let rate = percent / dec!(100);

            if let Some((&last_threshold, &last_rate)) = rates.last_key_value() {
                if threshold <= last_threshold || rate <= last_rate {
                    return Err!(
                        "Invalid tax scale: brackets must have strictly increasing bounds and rates");
                }
            } else if !threshold.is_zero() {
                return Err!("Invalid tax scale: the first bracket must start from zero");
            }

            rates.insert(threshold, rate);
        }

        if rates.is_empty() {
            return Err!("An empty tax scale");
        }

        Ok(ProgressiveTaxScale {rates, precision})
    }

    /// Calculates tax liability for the specified taxable income, rounding
    /// the accumulated sum to the scale precision (whole currency units for
    /// jurisdictions with zero precision).
    pub fn tax(&self, taxable_income: Decimal) -> Decimal {
        let mut income = std::cmp::max(dec!(0), taxable_income);
        let mut tax_base = dec!(0);
        let mut tax = dec!(0);

        while !income.is_zero() && income.is_sign_positive() {
            let (_, &current_rate) = self.rates.range((Bound::Unbounded, Bound::Included(tax_base)))
                .last().unwrap();

            let current_income = match self.rates.range((Bound::Excluded(tax_base), Bound::Unbounded)).next() {
                Some((&next_threshold, _)) => std::cmp::min(next_threshold - tax_base, income),
                None => income,
            };

            income -= current_income;
            tax_base += current_income;
            tax += current_income * current_rate;
        }

        taxes::round_tax(tax, self.precision)
    }

    /// Returns the bracket the specified income falls into (for display
    /// purposes only - the tax itself is always accumulated marginally).
    pub fn bracket_containing(&self, income: Decimal) -> TaxBracket {
        let income = std::cmp::max(dec!(0), income);

        let (&min, &rate) = self.rates.range((Bound::Unbounded, Bound::Included(income)))
            .last().unwrap();

        let max = self.rates.range((Bound::Excluded(income), Bound::Unbounded)).next()
            .map(|(&threshold, _)| threshold);

        TaxBracket {min, max, rate}
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use crate::localities;
    use super::*;

    #[rstest(income, expected,
        case("0", "0"),
        case("-1000", "0"),
        case("8_000", "0"),
        case("8_040", "1"),
        case("30_000", "550"),
        case("45_000", "2_050"),

        // 8000 * 0 + 22000 * 0.025 + 15000 * 0.10 + 5000 * 0.15
        case("50_000", "2_800"),

        case("60_000", "4_300"),
        case("200_000", "32_300"),
        case("400_000", "77_300"),
        case("1_000_000", "227_300"),
    )]
    fn egyptian_tax(income: &str, expected: &str) {
        let scale = localities::egypt().scale;
        let tax = scale.tax(income.parse().unwrap());
        assert_eq!(tax, expected.parse().unwrap());
    }

    #[test]
    fn monotonicity() {
        // No bracket boundary may produce a lower tax at a higher income
        let scale = localities::egypt().scale;

        let mut previous = dec!(0);
        for income in (0..700_000).step_by(1_000) {
            let tax = scale.tax(Decimal::from(income));
            assert!(tax >= previous, "Tax decreased at income {}", income);
            previous = tax;
        }
    }

    #[rstest(income, min, max, rate,
        case("0", "0", Some("8_000"), "0"),
        case("7_999", "0", Some("8_000"), "0"),
        case("8_000", "8_000", Some("30_000"), "0.025"),
        case("50_000", "45_000", Some("60_000"), "0.15"),
        case("500_000", "400_000", None, "0.25"),
    )]
    fn brackets(income: &str, min: &str, max: Option<&str>, rate: &str) {
        let scale = localities::egypt().scale;
        let bracket = scale.bracket_containing(income.parse().unwrap());

        assert_eq!(bracket.min, min.parse().unwrap());
        assert_eq!(bracket.max, max.map(|max| max.parse().unwrap()));
        assert_eq!(bracket.rate, rate.parse().unwrap());
    }

    #[rstest(brackets,
        case(&[]),
        case(&[(dec!(1_000), dec!(10))]),
        case(&[(dec!(0), dec!(10)), (dec!(1_000), dec!(5))]),
        case(&[(dec!(0), dec!(10)), (dec!(0), dec!(15))]),
        case(&[(dec!(0), dec!(101))]),
    )]
    fn validation(brackets: &[(Decimal, Decimal)]) {
        assert!(ProgressiveTaxScale::new(brackets, 0).is_err());
    }
}
