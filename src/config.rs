use std::fs::File;

use serde::Deserialize;

use crate::core::GenericResult;
use crate::currency::{self, Cash};
use crate::reports::MonthlySales;
use crate::types::Decimal;
use crate::util::{self, DecimalRestrictions};
use crate::withdrawals::WithdrawalRecord;

/// Instructor records file. In production these records live in the
/// platform's data store; the CLI reads them from a local YAML file instead.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub instructor: String,
    pub year: i32,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub available_balance: Decimal,

    #[serde(default)]
    pub monthly_sales: Vec<MonthlySales>,

    #[serde(default)]
    pub withdrawals: Vec<WithdrawalRecord>,
}

fn default_currency() -> String {
    "EGP".to_owned()
}

impl Config {
    pub fn load(path: &str) -> GenericResult<Config> {
        let path = shellexpand::tilde(path).to_string();

        let config: Config = serde_yaml::from_reader(File::open(&path).map_err(|e| format!(
            "Unable to open {:?}: {}", path, e))?)?;

        config.validate().map_err(|e| format!(
            "Error in {:?}: {}", path, e))?;

        Ok(config)
    }

    pub fn available_balance(&self) -> GenericResult<Cash> {
        Ok(Cash::new(currency::resolve(&self.currency)?, self.available_balance))
    }

    fn validate(&self) -> GenericResult<()> {
        currency::resolve(&self.currency)?;

        util::validate_named_decimal(
            "available balance", self.available_balance, DecimalRestrictions::PositiveOrZero)?;

        let mut months = std::collections::HashSet::new();

        for sales in &self.monthly_sales {
            if !(1..=12).contains(&sales.month) {
                return Err!("Invalid month: {}", sales.month);
            }

            if !months.insert(sales.month) {
                return Err!("Duplicated sales record for month {}", sales.month);
            }

            util::validate_named_decimal(
                "monthly revenue", sales.revenue, DecimalRestrictions::PositiveOrZero)?;
        }

        for withdrawal in &self.withdrawals {
            util::validate_named_decimal(
                "withdrawal amount", withdrawal.amount, DecimalRestrictions::StrictlyPositive)?;
            util::validate_named_decimal(
                "withdrawal fee", withdrawal.fee, DecimalRestrictions::PositiveOrZero)?;
        }

        Ok(())
    }
}
