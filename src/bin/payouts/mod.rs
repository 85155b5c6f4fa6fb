mod action;
mod parser;

use std::io::{self, Write};
use std::process::ExitCode;

use ansi_term::Style;
use log::error;

use payouts::config::Config;
use payouts::core::EmptyResult;
use payouts::currency::Cash;
use payouts::fees::{FeeSchedule, PaymentMethod};
use payouts::formatting;
use payouts::formatting::table::{Table, Cell, Row, print_table};
use payouts::localities;
use payouts::reports::{AnnualTaxReport, ReportGenerator};
use payouts::taxes::TaxCalculator;
use payouts::time;
use payouts::types::Decimal;
use payouts::withdrawals::{self, WithdrawalEligibility};

use self::action::Action;
use self::parser::Parser;

fn main() -> ExitCode {
    let (global, parser) = match Parser::parse_global() {
        Ok(result) => result,
        Err(err) => {
            let _ = writeln!(io::stderr(), "{err}.");
            return ExitCode::FAILURE;
        },
    };

    if let Err(err) = easy_logging::init(module_path!(), global.log_level) {
        let _ = writeln!(io::stderr(), "Failed to initialize the logging: {err}.");
        return ExitCode::FAILURE;
    }

    if let Err(err) = run(parser, &global.records_path) {
        let message = err.to_string();

        if message.contains('\n') {
            error!("{err}");
        } else {
            error!("{err}.");
        }

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(parser: Parser, records_path: &str) -> EmptyResult {
    let action = parser.parse()?;

    match action {
        Action::Methods => methods(),
        Action::Fees {amount, currency, method} => fees(amount, &currency, method),

        Action::TaxReport {json} => tax_report(&Config::load(records_path)?, json),
        Action::Quarterly => quarterly(&Config::load(records_path)?),
        Action::Monthly {month} => monthly(&Config::load(records_path)?, month),

        Action::Check => check(&Config::load(records_path)?),
    }
}

fn generator() -> ReportGenerator {
    ReportGenerator::new(TaxCalculator::new(localities::egypt()))
}

fn methods() -> EmptyResult {
    let schedule = FeeSchedule::standard();
    let mut table = Table::new();

    for (method, tariff) in schedule.supported_methods("EGP") {
        table.add_row(Row::new(&[
            Cell::new(method.id()),
            Cell::new(method.name()),
            Cell::new(&tariff),
        ]));
    }

    print_table("Supported payment methods", &["ID", "Method", "Fee tariff"], table);
    Ok(())
}

fn fees(amount: Decimal, currency: &str, method: Option<PaymentMethod>) -> EmptyResult {
    let schedule = FeeSchedule::standard();
    let amount = Cash::new(payouts::currency::resolve(currency)?, amount);

    if !amount.is_positive() {
        return Err(format!("Invalid withdrawal amount: {}", amount.amount).into());
    }

    let comparison = method.is_none();
    let methods = match method {
        Some(method) => vec![method],
        None => schedule.supported_methods(currency).into_iter()
            .map(|(method, _)| method)
            .collect(),
    };

    let mut table = Table::new();

    for method in methods {
        match schedule.calculate(amount, method) {
            Ok(result) => table.add_row(Row::new(&[
                Cell::new(method.name()),
                Cell::new_cash(result.fee),
                Cell::new_cash(result.net_amount),
                Cell::new(&result.description),
            ])),
            // One gateway rejecting the amount shouldn't abort the comparison
            Err(_) if comparison => table.add_row(Row::new(&[
                Cell::new(method.name()),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("not available for this amount"),
            ])),
            Err(err) => return Err(err.into()),
        };
    }

    print_table(
        &format!("Withdrawal of {}", amount),
        &["Method", "Fee", "Net amount", "Description"], table);

    Ok(())
}

fn tax_report(config: &Config, json: bool) -> EmptyResult {
    let report = generator().generate_annual_tax_report(
        &config.instructor, config.year,
        &config.monthly_sales, &config.withdrawals, time::now())?;

    if json {
        serde_json::to_writer_pretty(io::stdout(), &report)?;
        println!();
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &AnnualTaxReport) {
    let currency = report.currency;
    let cash = |amount| Cash::new(currency, amount);

    println!("{}", Style::new().bold().paint(format!(
        "Annual tax report for {} - {} (generated at {})",
        report.instructor, report.year, formatting::format_date_time(report.generated_at))));

    let mut income = Table::new();
    income.add_row(Row::new(&[Cell::new("Total gross income"), Cell::new_cash(cash(report.income.total_gross_income))]));
    income.add_row(Row::new(&[Cell::new("Course sales"), Cell::new_cash(cash(report.income.course_sales))]));
    income.add_row(Row::new(&[Cell::new("Other income"), Cell::new_cash(cash(report.income.other_income))]));
    print_table("Income summary", &["", ""], income);

    let mut deductions = Table::new();
    deductions.add_row(Row::new(&[Cell::new("Platform commission"), Cell::new_cash(cash(report.deductions.platform_commission))]));
    deductions.add_row(Row::new(&[Cell::new("Payment fees"), Cell::new_cash(cash(report.deductions.payment_fees))]));
    deductions.add_row(Row::new(&[Cell::new("Business expenses"), Cell::new_cash(cash(report.deductions.business_expenses))]));
    deductions.add_row(Row::new(&[Cell::new("Standard deduction"), Cell::new_cash(cash(report.deductions.standard_deduction))]));
    deductions.add_row(Row::new(&[Cell::new("Total deductions"), Cell::new_cash(cash(report.deductions.total_deductions))]));
    print_table("Deductions", &["", ""], deductions);

    let bracket = report.tax.applicable_bracket;
    let bracket_range = match bracket.max {
        Some(max) => format!("{} - {}", cash(bracket.min), cash(max)),
        None => format!("{} and above", cash(bracket.min)),
    };

    let mut tax = Table::new();
    tax.add_row(Row::new(&[Cell::new("Taxable income"), Cell::new_cash(cash(report.tax.taxable_income))]));
    tax.add_row(Row::new(&[Cell::new("Tax bracket"), Cell::new(&bracket_range)]));
    tax.add_row(Row::new(&[Cell::new("Bracket rate"), Cell::new_ratio(bracket.rate)]));
    tax.add_row(Row::new(&[Cell::new("Estimated tax"), Cell::new_cash(cash(report.tax.estimated_tax))]));
    tax.add_row(Row::new(&[Cell::new("Quarterly payment"), Cell::new_cash(cash(report.tax.quarterly_payment))]));
    tax.add_row(Row::new(&[Cell::new("Remaining tax due"), Cell::new_cash(cash(report.tax.remaining_tax_due))]));
    print_table("Tax calculations", &["", ""], tax);

    print_quarterly(report);

    let mut methods = Table::new();
    for (method, summary) in &report.withdrawals.by_method {
        methods.add_row(Row::new(&[
            Cell::new(method.name()),
            Cell::new_integer(summary.count),
            Cell::new_cash(cash(summary.amount)),
            Cell::new_cash(cash(summary.fees)),
        ]));
    }
    methods.add_row(Row::new(&[
        Cell::new("Total"),
        Cell::new_integer(report.withdrawals.by_method.values().map(|summary| summary.count).sum()),
        Cell::new_cash(cash(report.withdrawals.total_withdrawn)),
        Cell::new_cash(cash(report.withdrawals.total_fees)),
    ]));
    print_table("Withdrawals", &["Method", "Count", "Amount", "Fees"], methods);

    println!();
    println!("Required tax form: {}", report.compliance.tax_form.name());
    println!("Annual return deadline: {}", formatting::format_date(report.compliance.deadlines.annual_return));
    println!("Final payment deadline: {}", formatting::format_date(report.compliance.deadlines.final_payment));

    println!();
    println!("{}", Style::new().bold().paint("Recommendations:"));
    for recommendation in &report.compliance.recommendations {
        println!("* {}", recommendation);
    }
}

fn quarterly(config: &Config) -> EmptyResult {
    let report = generator().generate_annual_tax_report(
        &config.instructor, config.year,
        &config.monthly_sales, &config.withdrawals, time::now())?;

    print_quarterly(&report);
    Ok(())
}

fn print_quarterly(report: &AnnualTaxReport) {
    let cash = |amount| Cash::new(report.currency, amount);
    let mut table = Table::new();

    for quarter in &report.quarterly {
        table.add_row(Row::new(&[
            Cell::new(quarter.quarter.name()),
            Cell::new(&formatting::format_months(quarter.months)),
            Cell::new_date(quarter.deadline),
            Cell::new_cash(cash(quarter.income)),
            Cell::new_cash(cash(quarter.expenses)),
            Cell::new_cash(cash(quarter.taxable_income)),
            Cell::new_cash(cash(quarter.payment_due)),
        ]));
    }

    print_table(
        &format!("Quarterly breakdown - {}", report.year),
        &["Quarter", "Months", "Deadline", "Income", "Expenses", "Taxable", "Payment due"], table);
}

fn monthly(config: &Config, month: u32) -> EmptyResult {
    let income = config.monthly_sales.iter()
        .find(|sales| sales.month == month)
        .map(|sales| sales.revenue)
        .ok_or_else(|| format!("There are no sales records for month {}", month))?;

    let calculator = TaxCalculator::new(localities::egypt());
    let summary = calculator.monthly_summary(config.year, month, income)?;
    let cash = |amount| Cash::new(calculator.regime().currency, amount);

    let mut table = Table::new();
    table.add_row(Row::new(&[Cell::new("Income"), Cell::new_cash(cash(summary.income))]));
    table.add_row(Row::new(&[Cell::new("Estimated expenses"), Cell::new_cash(cash(summary.expenses))]));
    table.add_row(Row::new(&[Cell::new("Net income"), Cell::new_cash(cash(summary.net_income))]));
    table.add_row(Row::new(&[Cell::new("Estimated tax"), Cell::new_cash(cash(summary.estimated_tax))]));

    print_table(&format!("Monthly summary - {}.{}", summary.month, summary.year), &["", ""], table);
    Ok(())
}

fn check(config: &Config) -> EmptyResult {
    match withdrawals::check_eligibility(config.available_balance()?, &config.withdrawals) {
        WithdrawalEligibility::Eligible {available_balance} => {
            println!("{}", ansi_term::Colour::Green.paint(format!(
                "A withdrawal may be requested: {} is available.", available_balance)));
        },
        WithdrawalEligibility::BelowMinimum {minimum} => {
            println!("{}", ansi_term::Colour::Yellow.paint(format!(
                "The available balance is below the {} withdrawal minimum.", minimum)));
        },
        WithdrawalEligibility::PendingRequest => {
            println!("{}", ansi_term::Colour::Yellow.paint(
                "There already is a pending withdrawal request."));
        },
    }

    Ok(())
}
