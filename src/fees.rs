use std::collections::HashMap;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use serde::de::{Deserializer, Error};
use strum::{EnumIter, IntoEnumIterator};

use crate::core::{CalculationError, CalculationResult};
use crate::currency::Cash;
use crate::types::Decimal;
use crate::util;

/// The closed set of payout gateways the platform supports. Adding a method
/// requires a tariff in the fee schedule, which the compiler enforces through
/// exhaustive matches here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[serde(rename = "bank")]
    BankTransfer,
    Stripe,
    PayPal,
    Fawry,
    #[serde(rename = "vodafone")]
    VodafoneCash,
}

impl PaymentMethod {
    pub fn id(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank",
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::PayPal => "paypal",
            PaymentMethod::Fawry => "fawry",
            PaymentMethod::VodafoneCash => "vodafone",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "Bank transfer",
            PaymentMethod::Stripe => "Stripe",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::Fawry => "Fawry",
            PaymentMethod::VodafoneCash => "Vodafone Cash",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = CalculationError;

    fn from_str(method: &str) -> Result<PaymentMethod, CalculationError> {
        for candidate in PaymentMethod::iter() {
            if candidate.id() == method {
                return Ok(candidate);
            }
        }
        Err(CalculationError::UnsupportedPaymentMethod(method.to_owned()))
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(D::Error::custom)
    }
}

/// Gateway fee rule. Percents are accepted as percents (2.9 is 2.9%).
#[derive(Debug, Clone, Copy)]
pub enum FeeTariff {
    Free,
    PercentWithFixed {percent: Decimal, fixed: Decimal},
    PercentCapped {percent: Decimal, cap: Decimal},
}

impl FeeTariff {
    fn calculate(&self, amount: Decimal) -> Decimal {
        match *self {
            FeeTariff::Free => dec!(0),

            FeeTariff::PercentWithFixed {percent, fixed} => {
                amount * percent / dec!(100) + fixed
            },

            FeeTariff::PercentCapped {percent, cap} => {
                std::cmp::min(amount * percent / dec!(100), cap)
            },
        }
    }

    pub fn describe(&self, currency: &str) -> String {
        match *self {
            FeeTariff::Free => "free of charge".to_owned(),
            FeeTariff::PercentWithFixed {percent, fixed} => format!(
                "{}% + {} {}", percent, fixed, currency),
            FeeTariff::PercentCapped {percent, cap} => format!(
                "{}% ({} {} max)", percent, cap, currency),
        }
    }
}

#[derive(Debug)]
pub struct FeeResult {
    pub fee: Cash,
    pub net_amount: Cash,
    pub description: String,
}

/// Immutable fee schedule mapping payout methods to their tariffs. Injected
/// into calculations instead of being a mutable global, so tests can
/// substitute alternate tables.
#[derive(Clone)]
pub struct FeeSchedule {
    tariffs: HashMap<PaymentMethod, FeeTariff>,
}

impl FeeSchedule {
    pub fn new(tariffs: HashMap<PaymentMethod, FeeTariff>) -> FeeSchedule {
        FeeSchedule {tariffs}
    }

    /// The platform's production tariff table.
    pub fn standard() -> FeeSchedule {
        FeeSchedule::new(hashmap!{
            PaymentMethod::BankTransfer => FeeTariff::Free,
            PaymentMethod::Stripe => FeeTariff::PercentWithFixed {percent: dec!(2.9), fixed: dec!(0.30)},
            PaymentMethod::PayPal => FeeTariff::PercentWithFixed {percent: dec!(3.5), fixed: dec!(0.15)},
            PaymentMethod::Fawry => FeeTariff::PercentWithFixed {percent: dec!(2), fixed: dec!(1.00)},
            PaymentMethod::VodafoneCash => FeeTariff::PercentCapped {percent: dec!(1.5), cap: dec!(20.00)},
        })
    }

    pub fn tariff(&self, method: PaymentMethod) -> Option<FeeTariff> {
        self.tariffs.get(&method).copied()
    }

    /// Calculates the gateway fee and net payout amount for a withdrawal.
    ///
    /// The fee is rounded to two decimal places and the invariant
    /// `fee + net_amount == amount` holds at that precision.
    pub fn calculate(&self, amount: Cash, method: PaymentMethod) -> CalculationResult<FeeResult> {
        if !amount.is_positive() {
            return Err(CalculationError::InvalidAmount(amount.amount));
        }

        let tariff = self.tariff(method).ok_or_else(|| {
            CalculationError::UnsupportedPaymentMethod(method.id().to_owned())
        })?;

        let amount = amount.round();
        let fee = Cash::new(amount.currency, util::round(tariff.calculate(amount.amount)));

        if fee.amount >= amount.amount && !fee.is_zero() {
            // The requested amount doesn't even cover the gateway fee
            return Err(CalculationError::InvalidAmount(amount.amount));
        }

        Ok(FeeResult {
            fee,
            net_amount: Cash::new(amount.currency, amount.amount - fee.amount),
            description: format!("{}: {}", method.name(), tariff.describe(amount.currency)),
        })
    }

    /// Lists the supported methods with their tariff descriptions, in a
    /// stable order.
    pub fn supported_methods(&self, currency: &str) -> Vec<(PaymentMethod, String)> {
        PaymentMethod::iter()
            .filter_map(|method| {
                self.tariffs.get(&method).map(|tariff| (method, tariff.describe(currency)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use matches::assert_matches;
    use rstest::rstest;

    use super::*;

    fn calculate(amount: &str, method: PaymentMethod) -> FeeResult {
        FeeSchedule::standard()
            .calculate(Cash::new_from_string("EGP", amount).unwrap(), method)
            .unwrap()
    }

    #[rstest(amount, method, fee, net_amount,
        case("100", PaymentMethod::BankTransfer, "0", "100"),
        case("100", PaymentMethod::Stripe, "3.20", "96.80"),
        case("100", PaymentMethod::PayPal, "3.65", "96.35"),
        case("100", PaymentMethod::Fawry, "3", "97"),
        case("100", PaymentMethod::VodafoneCash, "1.5", "98.5"),

        // The cap must win over the raw 1.5% (which would be 30)
        case("2000", PaymentMethod::VodafoneCash, "20", "1980"),
        case("1333.33", PaymentMethod::VodafoneCash, "20", "1313.33"),

        case("0.01", PaymentMethod::BankTransfer, "0", "0.01"),
        case("123.45", PaymentMethod::Stripe, "3.88", "119.57"),
    )]
    fn fees(amount: &str, method: PaymentMethod, fee: &str, net_amount: &str) {
        let result = calculate(amount, method);
        assert_eq!(result.fee.amount, fee.parse().unwrap());
        assert_eq!(result.net_amount.amount, net_amount.parse().unwrap());
    }

    #[rstest(amount, case("10"), case("99.99"), case("1333.33"), case("50000"))]
    fn fee_conservation(amount: &str) {
        for method in PaymentMethod::iter() {
            let result = calculate(amount, method);
            assert_eq!(result.fee.amount + result.net_amount.amount, amount.parse().unwrap());
        }
    }

    #[test]
    fn bank_is_always_free() {
        for amount in ["1", "100", "1000000"] {
            assert_eq!(calculate(amount, PaymentMethod::BankTransfer).fee.amount, dec!(0));
        }
    }

    #[rstest(amount, case("0"), case("-100"))]
    fn invalid_amounts(amount: &str) {
        let schedule = FeeSchedule::standard();
        let amount = Cash::new_from_string("EGP", amount).unwrap();

        assert_matches!(
            schedule.calculate(amount, PaymentMethod::Stripe),
            Err(CalculationError::InvalidAmount(_)));
    }

    #[test]
    fn amount_below_fee() {
        // Stripe fee on 0.30 would be 0.31
        let schedule = FeeSchedule::standard();
        let amount = Cash::new_from_string("EGP", "0.30").unwrap();

        assert_matches!(
            schedule.calculate(amount, PaymentMethod::Stripe),
            Err(CalculationError::InvalidAmount(_)));
    }

    #[test]
    fn unknown_method() {
        assert_matches!(
            "unknown_method".parse::<PaymentMethod>(),
            Err(CalculationError::UnsupportedPaymentMethod(method)) if method == "unknown_method");
    }

    #[test]
    fn tariff_lookup() {
        let schedule = FeeSchedule::standard();
        assert_matches!(schedule.tariff(PaymentMethod::BankTransfer), Some(FeeTariff::Free));
        assert_matches!(FeeSchedule::new(hashmap!{}).tariff(PaymentMethod::Stripe), None);
    }

    #[test]
    fn method_missing_from_schedule() {
        // An alternate schedule may support only a subset of methods
        let schedule = FeeSchedule::new(hashmap!{
            PaymentMethod::BankTransfer => FeeTariff::Free,
        });

        assert_matches!(
            schedule.calculate(Cash::new("EGP", dec!(100)), PaymentMethod::Stripe),
            Err(CalculationError::UnsupportedPaymentMethod(method)) if method == "stripe");
    }

    #[test]
    fn supported_methods() {
        let methods = FeeSchedule::standard().supported_methods("EGP");
        let expected = ["bank", "stripe", "paypal", "fawry", "vodafone"];

        for ((method, description), expected_id) in methods.iter().zip_eq(expected) {
            assert_eq!(method.id(), expected_id);
            assert!(!description.is_empty());
        }
    }
}
