use serde::Serialize;

use crate::core::{CalculationError, CalculationResult};
use crate::localities::{Quarter, TaxRegime};
use crate::taxes::{self, TaxBracket};
use crate::types::{Date, Decimal};

/// Annual income figures the tax liability is calculated from. Constructed
/// fresh per calculation and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct IncomeStatement {
    pub gross_income: Decimal,
    pub business_expenses: Decimal,
    pub platform_commission: Decimal,
    pub standard_deduction: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxObligations {
    pub taxable_income: Decimal,
    pub applicable_bracket: TaxBracket,
    pub estimated_tax: Decimal,
    pub quarterly_payment: Decimal,
    pub remaining_tax_due: Decimal,
    pub total_deductions: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuarterlyReport {
    pub quarter: Quarter,
    pub months: [u32; 3],
    pub deadline: Date,
    pub income: Decimal,
    pub expenses: Decimal,
    pub taxable_income: Decimal,
    pub estimated_tax: Decimal,
    pub payment_due: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net_income: Decimal,
    pub estimated_tax: Decimal,
}

pub struct TaxCalculator {
    regime: TaxRegime,
}

impl TaxCalculator {
    pub fn new(regime: TaxRegime) -> TaxCalculator {
        TaxCalculator {regime}
    }

    pub fn regime(&self) -> &TaxRegime {
        &self.regime
    }

    /// Estimates deductible business expenses from gross income: the typical
    /// share of income, capped by the statutory allowance.
    pub fn estimate_business_expenses(&self, gross_income: Decimal) -> Decimal {
        std::cmp::min(
            gross_income * self.regime.typical_business_expense_rate,
            gross_income * self.regime.business_expense_allowance,
        )
    }

    /// Builds an income statement from gross income alone, deriving platform
    /// commission and business expenses by the platform's conventions.
    pub fn statement_from_gross(&self, gross_income: Decimal) -> CalculationResult<IncomeStatement> {
        validate_figure("gross income", gross_income)?;

        Ok(IncomeStatement {
            gross_income,
            business_expenses: self.estimate_business_expenses(gross_income),
            platform_commission: gross_income * self.regime.platform_commission_rate,
            standard_deduction: self.regime.standard_deduction,
        })
    }

    pub fn calculate(&self, statement: &IncomeStatement) -> CalculationResult<TaxObligations> {
        validate_figure("gross income", statement.gross_income)?;
        validate_figure("business expenses", statement.business_expenses)?;
        validate_figure("platform commission", statement.platform_commission)?;
        validate_figure("standard deduction", statement.standard_deduction)?;

        let total_deductions = statement.business_expenses
            + statement.standard_deduction
            + statement.platform_commission;

        let taxable_income = std::cmp::max(dec!(0), statement.gross_income - total_deductions);

        let estimated_tax = self.regime.scale.tax(taxable_income);
        let quarterly_payment = taxes::round_tax(estimated_tax / dec!(4), self.regime.tax_precision);

        Ok(TaxObligations {
            taxable_income,
            applicable_bracket: self.regime.scale.bracket_containing(taxable_income),
            estimated_tax,
            quarterly_payment,
            // No installments are tracked yet, so the whole tax remains due
            remaining_tax_due: estimated_tax,
            total_deductions,
        })
    }

    /// Derives per-quarter figures by an even 1/4 split of the annual totals.
    ///
    /// True per-period transaction data is not available to the calculator,
    /// so this is a proportional estimate, not a precise periodization. The
    /// four quarters always reconcile with the annual figures within rounding
    /// tolerance.
    pub fn quarterly_breakdown(&self, statement: &IncomeStatement, year: i32) -> CalculationResult<Vec<QuarterlyReport>> {
        let annual = self.calculate(statement)?;
        let precision = self.regime.tax_precision;
        let quarterly_ratio = dec!(0.25);

        Ok(Quarter::all().iter().map(|&quarter| {
            QuarterlyReport {
                quarter,
                months: quarter.months(),
                deadline: quarter.payment_deadline(year),
                income: taxes::round_tax(statement.gross_income * quarterly_ratio, precision),
                expenses: taxes::round_tax(statement.business_expenses * quarterly_ratio, precision),
                taxable_income: taxes::round_tax(
                    (statement.gross_income - statement.business_expenses) * quarterly_ratio, precision),
                estimated_tax: taxes::round_tax(annual.estimated_tax * quarterly_ratio, precision),
                payment_due: taxes::round_tax(annual.estimated_tax * quarterly_ratio, precision),
            }
        }).collect())
    }

    /// Estimates tax for one month by annualizing its net income. Standard
    /// deduction applies to the annualized figure, so the result is a rough
    /// installment estimate rather than 1/12 of the real annual liability.
    pub fn monthly_summary(&self, year: i32, month: u32, income: Decimal) -> CalculationResult<MonthlySummary> {
        validate_figure("monthly income", income)?;

        let expenses = income * self.regime.typical_business_expense_rate;
        let net_income = income - expenses;

        let annualized = self.calculate(&IncomeStatement {
            gross_income: net_income * dec!(12),
            business_expenses: dec!(0),
            platform_commission: dec!(0),
            standard_deduction: self.regime.standard_deduction,
        })?;

        Ok(MonthlySummary {
            year, month, income, expenses, net_income,
            estimated_tax: taxes::round_tax(
                annualized.estimated_tax / dec!(12), self.regime.tax_precision),
        })
    }
}

fn validate_figure(name: &str, value: Decimal) -> CalculationResult<()> {
    if value.is_sign_negative() {
        return Err(CalculationError::InvalidFinancialData(format!(
            "{} is negative: {}", name, value)));
    }
    Ok(())
}
