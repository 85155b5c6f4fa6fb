use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::currency::Cash;
use crate::fees::PaymentMethod;
use crate::types::{Date, Decimal};

pub const MIN_WITHDRAWAL_AMOUNT: Decimal = dec!(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Completed,
    Rejected,
}

/// One payout attempt from the withdrawal history. The history itself is
/// stored externally and passed in by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WithdrawalRecord {
    pub date: Date,
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default)]
    pub fee: Decimal,
    pub status: WithdrawalStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MethodSummary {
    pub count: usize,
    pub amount: Decimal,
    pub fees: Decimal,
}

/// Groups withdrawal history by payment method. BTreeMap keeps the grouping
/// deterministic for report serialization.
pub fn summarize_by_method(history: &[WithdrawalRecord]) -> BTreeMap<PaymentMethod, MethodSummary> {
    let mut summary: BTreeMap<PaymentMethod, MethodSummary> = BTreeMap::new();

    for withdrawal in history {
        let methods = summary.entry(withdrawal.method).or_default();
        methods.count += 1;
        methods.amount += withdrawal.amount;
        methods.fees += withdrawal.fee;
    }

    summary
}

#[derive(Debug, PartialEq)]
pub enum WithdrawalEligibility {
    Eligible {available_balance: Cash},
    BelowMinimum {minimum: Cash},
    PendingRequest,
}

/// Checks whether a new withdrawal may be requested: the balance must cover
/// the minimum amount and at most one request may be in flight.
pub fn check_eligibility(available_balance: Cash, history: &[WithdrawalRecord]) -> WithdrawalEligibility {
    let minimum = Cash::new(available_balance.currency, MIN_WITHDRAWAL_AMOUNT);

    if available_balance.amount < minimum.amount {
        return WithdrawalEligibility::BelowMinimum {minimum};
    }

    let has_pending = history.iter().any(|withdrawal| {
        withdrawal.status == WithdrawalStatus::Pending
    });

    if has_pending {
        WithdrawalEligibility::PendingRequest
    } else {
        WithdrawalEligibility::Eligible {available_balance}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: &str, method: PaymentMethod, fee: &str, status: WithdrawalStatus) -> WithdrawalRecord {
        WithdrawalRecord {
            date: date!(2024, 6, 1),
            amount: amount.parse().unwrap(),
            method,
            fee: fee.parse().unwrap(),
            status,
        }
    }

    #[test]
    fn method_grouping() {
        let history = [
            record("500", PaymentMethod::Stripe, "14.80", WithdrawalStatus::Completed),
            record("300", PaymentMethod::Stripe, "9", WithdrawalStatus::Completed),
            record("1000", PaymentMethod::BankTransfer, "0", WithdrawalStatus::Pending),
        ];

        let summary = summarize_by_method(&history);
        assert_eq!(summary.len(), 2);

        assert_eq!(summary[&PaymentMethod::Stripe], MethodSummary {
            count: 2,
            amount: dec!(800),
            fees: dec!(23.80),
        });

        assert_eq!(summary[&PaymentMethod::BankTransfer], MethodSummary {
            count: 1,
            amount: dec!(1000),
            fees: dec!(0),
        });
    }

    #[test]
    fn eligibility() {
        let completed = [record("500", PaymentMethod::Stripe, "14.80", WithdrawalStatus::Completed)];
        let pending = [record("500", PaymentMethod::Stripe, "14.80", WithdrawalStatus::Pending)];

        assert_eq!(
            check_eligibility(Cash::new("EGP", dec!(99.99)), &completed),
            WithdrawalEligibility::BelowMinimum {minimum: Cash::new("EGP", dec!(100))});

        assert_eq!(
            check_eligibility(Cash::new("EGP", dec!(100)), &pending),
            WithdrawalEligibility::PendingRequest);

        assert_eq!(
            check_eligibility(Cash::new("EGP", dec!(100)), &completed),
            WithdrawalEligibility::Eligible {available_balance: Cash::new("EGP", dec!(100))});
    }
}
