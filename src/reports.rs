use std::collections::BTreeMap;

use log::debug;
use serde::{Serialize, Deserialize};

use crate::core::{CalculationError, CalculationResult};
use crate::localities::TaxDeadlines;
use crate::taxes::{IncomeStatement, QuarterlyReport, TaxCalculator, TaxObligations};
use crate::types::{DateTime, Decimal};
use crate::withdrawals::{self, MethodSummary, WithdrawalRecord, WithdrawalStatus};
use crate::fees::PaymentMethod;

/// Course sales figures for one month, supplied by the external sales system.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonthlySales {
    pub month: u32,
    pub revenue: Decimal,
    #[serde(default)]
    pub enrollments: u32,
}

/// Aggregated yearly figures derived from the externally supplied records.
/// Built fresh per report generation call and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct AnnualFinancialData {
    pub total_gross_income: Decimal,
    pub course_sales: Decimal,
    pub other_income: Decimal,
    pub monthly_income: BTreeMap<u32, Decimal>,

    pub platform_commission: Decimal,
    pub payment_fees: Decimal,
    pub business_expenses: Decimal,

    pub total_withdrawn: Decimal,
    pub pending_withdrawals: usize,
}

impl AnnualFinancialData {
    pub fn collect(
        calculator: &TaxCalculator, monthly_sales: &[MonthlySales],
        withdrawal_history: &[WithdrawalRecord],
    ) -> AnnualFinancialData {
        let mut monthly_income = BTreeMap::new();
        let mut total_gross_income = dec!(0);

        for sales in monthly_sales {
            *monthly_income.entry(sales.month).or_default() += sales.revenue;
            total_gross_income += sales.revenue;
        }

        let total_withdrawn = withdrawal_history.iter()
            .map(|withdrawal| withdrawal.amount)
            .sum();

        let payment_fees = withdrawal_history.iter()
            .map(|withdrawal| withdrawal.fee)
            .sum();

        let pending_withdrawals = withdrawal_history.iter()
            .filter(|withdrawal| withdrawal.status == WithdrawalStatus::Pending)
            .count();

        AnnualFinancialData {
            total_gross_income,
            course_sales: total_gross_income,
            // There are no other income sources yet
            other_income: dec!(0),
            monthly_income,

            platform_commission: total_gross_income * calculator.regime().platform_commission_rate,
            payment_fees,
            business_expenses: calculator.estimate_business_expenses(total_gross_income),

            total_withdrawn,
            pending_withdrawals,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IncomeSection {
    pub total_gross_income: Decimal,
    pub course_sales: Decimal,
    pub other_income: Decimal,
    pub monthly_breakdown: BTreeMap<u32, Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeductionsSection {
    pub platform_commission: Decimal,
    pub payment_fees: Decimal,
    pub business_expenses: Decimal,
    pub standard_deduction: Decimal,
    pub total_deductions: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalsSection {
    pub total_withdrawn: Decimal,
    pub total_fees: Decimal,
    pub by_method: BTreeMap<PaymentMethod, MethodSummary>,
    pub pending_requests: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TaxForm {
    /// No taxable income - no return is required
    NotRequired,
    /// Form 1 - personal income below the business activity threshold
    Individual,
    /// Form 2 - business activity income
    Business,
}

impl TaxForm {
    pub fn name(self) -> &'static str {
        match self {
            TaxForm::NotRequired => "No tax return required",
            TaxForm::Individual => "Form 1 (individuals)",
            TaxForm::Business => "Form 2 (business activity)",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceSection {
    pub tax_form: TaxForm,
    pub deadlines: TaxDeadlines,
    pub recommendations: Vec<&'static str>,
}

/// The annual tax report: a plain value object ready for rendering or
/// serialization. Identical inputs and clock always produce an identical
/// report.
#[derive(Debug, Clone, Serialize)]
pub struct AnnualTaxReport {
    pub instructor: String,
    pub year: i32,
    pub currency: &'static str,
    pub generated_at: DateTime,

    pub income: IncomeSection,
    pub deductions: DeductionsSection,
    pub tax: TaxObligations,
    pub quarterly: Vec<QuarterlyReport>,
    pub withdrawals: WithdrawalsSection,
    pub compliance: ComplianceSection,
}

pub struct ReportGenerator {
    calculator: TaxCalculator,
}

impl ReportGenerator {
    pub fn new(calculator: TaxCalculator) -> ReportGenerator {
        ReportGenerator {calculator}
    }

    pub fn calculator(&self) -> &TaxCalculator {
        &self.calculator
    }

    /// Assembles the annual tax report from externally fetched records. The
    /// generator performs no I/O of its own: all history is passed in and
    /// `now` is injected so tests can fix the report timestamp.
    pub fn generate_annual_tax_report(
        &self, instructor: &str, year: i32,
        monthly_sales: &[MonthlySales], withdrawal_history: &[WithdrawalRecord],
        now: DateTime,
    ) -> CalculationResult<AnnualTaxReport> {
        let regime = self.calculator.regime();
        let data = AnnualFinancialData::collect(&self.calculator, monthly_sales, withdrawal_history);

        let statement = IncomeStatement {
            gross_income: data.total_gross_income,
            business_expenses: data.business_expenses,
            platform_commission: data.platform_commission,
            standard_deduction: regime.standard_deduction,
        };

        let tax = self.calculator.calculate(&statement)
            .map_err(CalculationError::aggregation("tax calculations"))?;

        if monthly_sales.len() < 12 {
            debug!(concat!(
                "Sales records for {} cover {} months: ",
                "quarterly figures will be derived by an even split of the annual totals."),
                year, monthly_sales.len());
        }

        let quarterly = self.calculator.quarterly_breakdown(&statement, year)
            .map_err(CalculationError::aggregation("quarterly breakdown"))?;

        let compliance = ComplianceSection {
            tax_form: select_tax_form(regime.business_tax_threshold, tax.taxable_income),
            deadlines: TaxDeadlines::for_year(year),
            recommendations: recommendations(regime.business_tax_threshold, &data, &tax),
        };

        Ok(AnnualTaxReport {
            instructor: instructor.to_owned(),
            year,
            currency: regime.currency,
            generated_at: now,

            income: IncomeSection {
                total_gross_income: data.total_gross_income,
                course_sales: data.course_sales,
                other_income: data.other_income,
                monthly_breakdown: data.monthly_income.clone(),
            },

            deductions: DeductionsSection {
                platform_commission: data.platform_commission,
                payment_fees: data.payment_fees,
                business_expenses: data.business_expenses,
                standard_deduction: statement.standard_deduction,
                total_deductions: tax.total_deductions,
            },

            tax,
            quarterly,

            withdrawals: WithdrawalsSection {
                total_withdrawn: data.total_withdrawn,
                total_fees: data.payment_fees,
                by_method: withdrawals::summarize_by_method(withdrawal_history),
                pending_requests: data.pending_withdrawals,
            },

            compliance,
        })
    }
}

fn select_tax_form(business_threshold: Decimal, taxable_income: Decimal) -> TaxForm {
    if taxable_income.is_zero() {
        TaxForm::NotRequired
    } else if taxable_income < business_threshold {
        TaxForm::Individual
    } else {
        TaxForm::Business
    }
}

fn recommendations(
    business_threshold: Decimal, data: &AnnualFinancialData, tax: &TaxObligations,
) -> Vec<&'static str> {
    let mut recommendations = Vec::new();

    if tax.estimated_tax.is_sign_positive() && !tax.estimated_tax.is_zero() {
        recommendations.push("Pay the estimated tax in quarterly installments to avoid late payment penalties.");
    }

    if data.business_expenses < data.total_gross_income * dec!(0.15) {
        recommendations.push("Document work-related expenses to decrease the tax due.");
    }

    if data.total_gross_income > business_threshold {
        recommendations.push("Consider registering a business activity to benefit from tax incentives.");
    }

    recommendations.push("Keep all receipts and financial documents for at least 5 years.");
    recommendations.push("Have a qualified tax accountant review the return before filing.");

    recommendations
}

#[cfg(test)]
mod tests {
    use matches::assert_matches;
    use pretty_assertions::assert_eq;

    use crate::localities;
    use super::*;

    fn generator() -> ReportGenerator {
        ReportGenerator::new(TaxCalculator::new(localities::egypt()))
    }

    fn sales() -> Vec<MonthlySales> {
        (1..=12).map(|month| MonthlySales {
            month,
            revenue: dec!(10_000),
            enrollments: 100,
        }).collect()
    }

    fn history() -> Vec<WithdrawalRecord> {
        vec![
            WithdrawalRecord {
                date: date!(2024, 3, 15),
                amount: dec!(5_000),
                method: PaymentMethod::Stripe,
                fee: dec!(145.30),
                status: WithdrawalStatus::Completed,
            },
            WithdrawalRecord {
                date: date!(2024, 9, 1),
                amount: dec!(3_000),
                method: PaymentMethod::BankTransfer,
                fee: dec!(0),
                status: WithdrawalStatus::Pending,
            },
        ]
    }

    fn generate() -> AnnualTaxReport {
        generator().generate_annual_tax_report(
            "instructor@example.com", 2024, &sales(), &history(),
            date!(2025, 1, 5).and_hms_opt(12, 0, 0).unwrap(),
        ).unwrap()
    }

    #[test]
    fn annual_report() {
        let report = generate();

        assert_eq!(report.currency, "EGP");
        assert_eq!(report.income.total_gross_income, dec!(120_000));
        assert_eq!(report.income.monthly_breakdown.len(), 12);

        // 12_000 commission + 12_000 expenses + 9_000 standard deduction
        assert_eq!(report.deductions.total_deductions, dec!(33_000));
        assert_eq!(report.deductions.payment_fees, dec!(145.30));

        // 87_000 taxable: 550 + 1500 + 2250 + 27_000 * 0.20
        assert_eq!(report.tax.taxable_income, dec!(87_000));
        assert_eq!(report.tax.estimated_tax, dec!(9_700));
        assert_eq!(report.tax.quarterly_payment, dec!(2_425));

        assert_eq!(report.quarterly.len(), 4);
        assert_eq!(report.quarterly[0].income, dec!(30_000));

        assert_eq!(report.withdrawals.total_withdrawn, dec!(8_000));
        assert_eq!(report.withdrawals.pending_requests, 1);
        assert_eq!(report.withdrawals.by_method[&PaymentMethod::Stripe].fees, dec!(145.30));

        assert_eq!(report.compliance.tax_form, TaxForm::Business);
        assert!(!report.compliance.recommendations.is_empty());
    }

    #[test]
    fn determinism() {
        let first = serde_json::to_string(&generate()).unwrap();
        let second = serde_json::to_string(&generate()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tax_form_selection() {
        let threshold = dec!(50_000);
        assert_eq!(select_tax_form(threshold, dec!(0)), TaxForm::NotRequired);
        assert_eq!(select_tax_form(threshold, dec!(49_999)), TaxForm::Individual);
        assert_eq!(select_tax_form(threshold, dec!(50_000)), TaxForm::Business);
    }

    #[test]
    fn calculation_errors_name_the_section() {
        // Corrupted records slip past config validation when supplied
        // programmatically and must surface as a wrapped section error
        let sales = vec![MonthlySales {month: 1, revenue: dec!(-10_000), enrollments: 0}];

        let err = generator().generate_annual_tax_report(
            "instructor@example.com", 2024, &sales, &[],
            date!(2025, 1, 5).and_hms_opt(12, 0, 0).unwrap(),
        ).unwrap_err();

        match err {
            CalculationError::Aggregation {section, source} => {
                assert_eq!(section, "tax calculations");
                assert_matches!(*source, CalculationError::InvalidFinancialData(_));
            },
            _ => panic!("An unexpected error: {err}"),
        }
    }

    #[test]
    fn empty_records() {
        let report = generator().generate_annual_tax_report(
            "instructor@example.com", 2024, &[], &[],
            date!(2025, 1, 5).and_hms_opt(12, 0, 0).unwrap(),
        ).unwrap();

        assert_eq!(report.income.total_gross_income, dec!(0));
        assert_eq!(report.tax.estimated_tax, dec!(0));
        assert_eq!(report.compliance.tax_form, TaxForm::NotRequired);
        assert!(report.withdrawals.by_method.is_empty());
    }
}
