mod calculator;
mod scale;

pub use self::calculator::{IncomeStatement, MonthlySummary, QuarterlyReport, TaxCalculator, TaxObligations};
pub use self::scale::{ProgressiveTaxScale, TaxBracket};

use crate::types::Decimal;
use crate::util;

pub fn round_tax(tax: Decimal, precision: u32) -> Decimal {
    util::round_to(tax, precision)
}
