use std::str::FromStr;

use clap::ArgMatches;

use payouts::cli;
use payouts::core::GenericResult;
use payouts::fees::PaymentMethod;
use payouts::types::Decimal;

use super::action::Action;

pub struct GlobalOptions {
    pub log_level: log::Level,
    pub records_path: String,
}

pub struct Parser {
    matches: ArgMatches,
}

impl Parser {
    pub fn parse_global() -> GenericResult<(GlobalOptions, Parser)> {
        const DEFAULT_RECORDS_PATH: &str = "~/.payouts/records.yaml";

        let matches = cli::new_app("payouts", "Helps course instructors with payout fees and tax reporting")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg_required_else_help(true)
            .args([
                cli::new_arg("records", "Instructor records file path [default: ~/.payouts/records.yaml]")
                    .short('r').long("records")
                    .value_name("PATH"),

                cli::new_arg("verbose", "Set verbosity level")
                    .short('v').long("verbose")
                    .action(clap::ArgAction::Count),
            ])

            .subcommand(cli::new_subcommand(
                "methods", "List supported payment methods and their fee tariffs"))

            .subcommand(cli::new_subcommand(
                "fees", "Preview gateway fees for a withdrawal amount")
                .args([
                    cli::new_arg("currency", "Withdrawal currency [default: EGP]")
                        .short('c').long("currency")
                        .value_name("CURRENCY"),

                    cli::new_arg("AMOUNT", "Withdrawal amount").required(true),
                    cli::new_arg("METHOD", "Payment method (omit to compare all methods)"),
                ]))

            .subcommand(cli::new_subcommand(
                "tax-report", "Generate the annual tax report from the records file")
                .arg(cli::new_flag("json", "Print the report as JSON")
                    .short('j').long("json")))

            .subcommand(cli::new_subcommand(
                "quarterly", "Show the quarterly installment breakdown"))

            .subcommand(cli::new_subcommand(
                "monthly", "Show the tax summary for one month")
                .arg(cli::new_arg("MONTH", "Month number (1-12)").required(true)))

            .subcommand(cli::new_subcommand(
                "check", "Check whether a new withdrawal may be requested"))

            .get_matches();

        let log_level = match matches.get_count("verbose") {
            0 => log::Level::Info,
            1 => log::Level::Debug,
            2 => log::Level::Trace,
            _ => return Err("Invalid verbosity level".into()),
        };

        let records_path = matches.get_one::<String>("records")
            .map(String::as_str)
            .unwrap_or(DEFAULT_RECORDS_PATH)
            .to_owned();

        Ok((GlobalOptions {log_level, records_path}, Parser {matches}))
    }

    pub fn parse(self) -> GenericResult<Action> {
        let (command, matches) = self.matches.subcommand().unwrap();

        Ok(match command {
            "methods" => Action::Methods,

            "fees" => {
                let amount = matches.get_one::<String>("AMOUNT").unwrap();
                let amount = Decimal::from_str(amount).map_err(|_| format!(
                    "Invalid amount: {:?}", amount))?;

                let method = match matches.get_one::<String>("METHOD") {
                    Some(method) => Some(PaymentMethod::from_str(method)?),
                    None => None,
                };

                let currency = matches.get_one::<String>("currency")
                    .map(String::as_str)
                    .unwrap_or("EGP")
                    .to_owned();

                Action::Fees {amount, currency, method}
            },

            "tax-report" => Action::TaxReport {
                json: matches.get_flag("json"),
            },

            "quarterly" => Action::Quarterly,

            "monthly" => {
                let month = matches.get_one::<String>("MONTH").unwrap();
                let month = month.parse::<u32>().ok()
                    .filter(|month| (1..=12).contains(month))
                    .ok_or_else(|| format!("Invalid month: {:?}", month))?;

                Action::Monthly {month}
            },

            "check" => Action::Check,

            _ => unreachable!(),
        })
    }
}
