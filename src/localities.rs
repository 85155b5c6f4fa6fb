use serde::Serialize;

use crate::taxes::ProgressiveTaxScale;
use crate::types::{Date, Decimal};

/// Statutory parameters of one tax jurisdiction. All rates are accepted as
/// percents and stored as fractions.
#[derive(Clone)]
pub struct TaxRegime {
    pub currency: &'static str,
    pub scale: ProgressiveTaxScale,

    pub standard_deduction: Decimal,
    pub business_expense_allowance: Decimal,
    pub typical_business_expense_rate: Decimal,
    pub platform_commission_rate: Decimal,

    pub business_tax_threshold: Decimal,
    pub tax_precision: u32,
}

impl TaxRegime {
    fn new(
        currency: &'static str, scale: ProgressiveTaxScale,
        standard_deduction: Decimal, business_expense_allowance: Decimal,
        typical_business_expense_rate: Decimal, platform_commission_rate: Decimal,
        business_tax_threshold: Decimal, tax_precision: u32,
    ) -> TaxRegime {
        TaxRegime {
            currency, scale,
            standard_deduction,
            business_expense_allowance: business_expense_allowance / dec!(100),
            typical_business_expense_rate: typical_business_expense_rate / dec!(100),
            platform_commission_rate: platform_commission_rate / dec!(100),
            business_tax_threshold, tax_precision,
        }
    }
}

pub fn egypt() -> TaxRegime {
    // Egyptian personal income tax brackets
    let scale = ProgressiveTaxScale::new(&[
        (dec!(0),       dec!(0)),
        (dec!(8_000),   dec!(2.5)),
        (dec!(30_000),  dec!(10)),
        (dec!(45_000),  dec!(15)),
        (dec!(60_000),  dec!(20)),
        (dec!(200_000), dec!(22.5)),
        (dec!(400_000), dec!(25)),
    ], 0).unwrap();

    TaxRegime::new("EGP", scale, dec!(9_000), dec!(20), dec!(10), dec!(10), dec!(50_000), 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub fn all() -> [Quarter; 4] {
        [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4]
    }

    pub fn name(self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }

    pub fn months(self) -> [u32; 3] {
        match self {
            Quarter::Q1 => [1, 2, 3],
            Quarter::Q2 => [4, 5, 6],
            Quarter::Q3 => [7, 8, 9],
            Quarter::Q4 => [10, 11, 12],
        }
    }

    /// Statutory deadline for the quarterly installment payment.
    pub fn payment_deadline(self, year: i32) -> Date {
        match self {
            Quarter::Q1 => date!(year, 4, 30),
            Quarter::Q2 => date!(year, 7, 31),
            Quarter::Q3 => date!(year, 10, 31),
            Quarter::Q4 => date!(year + 1, 1, 31),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxDeadlines {
    pub quarterly_payments: Vec<(Quarter, Date)>,
    pub annual_return: Date,
    pub final_payment: Date,
    pub amendment: Date,
}

impl TaxDeadlines {
    pub fn for_year(year: i32) -> TaxDeadlines {
        TaxDeadlines {
            quarterly_payments: Quarter::all().iter().map(|&quarter| {
                (quarter, quarter.payment_deadline(year))
            }).collect(),
            annual_return: date!(year + 1, 5, 31),
            final_payment: date!(year + 1, 7, 31),
            amendment: date!(year + 3, 12, 31),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn egypt_regime() {
        let regime = egypt();
        assert_eq!(regime.currency, "EGP");
        assert_eq!(regime.platform_commission_rate, dec!(0.1));
        assert_eq!(regime.business_expense_allowance, dec!(0.2));
    }

    #[test]
    fn deadlines() {
        let deadlines = TaxDeadlines::for_year(2024);
        assert_eq!(deadlines.quarterly_payments.first().unwrap().1, date!(2024, 4, 30));
        assert_eq!(deadlines.quarterly_payments.last().unwrap().1, date!(2025, 1, 31));
        assert_eq!(deadlines.annual_return, date!(2025, 5, 31));
        assert_eq!(deadlines.amendment, date!(2027, 12, 31));
    }
}
