use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use num_traits::ToPrimitive;
use separator::Separatable;

use crate::core::GenericResult;
use crate::types::Decimal;
use crate::util;

/// All payouts happen in a small closed set of settlement currencies, so
/// currency names are interned as static strings.
pub fn resolve(code: &str) -> GenericResult<&'static str> {
    Ok(match code {
        "EGP" => "EGP",
        "USD" => "USD",
        "EUR" => "EUR",
        _ => return Err!("Unsupported currency: {:?}", code),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cash {
    pub currency: &'static str,
    pub amount: Decimal,
}

impl Cash {
    pub fn new(currency: &'static str, amount: Decimal) -> Cash {
        Cash {currency, amount}
    }

    pub fn new_from_string(currency: &str, amount: &str) -> GenericResult<Cash> {
        Ok(Cash::new(resolve(currency)?, Decimal::from_str(amount).map_err(|_| format!(
            "Invalid cash amount: {:?}", amount))?))
    }

    pub fn is_zero(self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(self) -> bool {
        !self.amount.is_zero() && self.amount.is_sign_positive()
    }

    pub fn round(mut self) -> Cash {
        self.amount = util::round(self.amount);
        self
    }

    pub fn add(self, other: Cash) -> GenericResult<Cash> {
        self.ensure_same_currency(other)?;
        Ok(Cash::new(self.currency, self.amount + other.amount))
    }

    pub fn format(self) -> String {
        let amount = util::round(self.amount);

        let formatted = if amount.fract().is_zero() {
            amount.to_i64().unwrap().separated_string()
        } else {
            amount.to_string()
        };

        format!("{} {}", formatted, self.currency)
    }

    fn ensure_same_currency(self, other: Cash) -> GenericResult<()> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err!("Currency mismatch: {} vs {}", self.currency, other.currency)
        }
    }
}

impl Mul<Decimal> for Cash {
    type Output = Cash;

    fn mul(mut self, multiplier: Decimal) -> Cash {
        self.amount *= multiplier;
        self
    }
}

impl fmt::Display for Cash {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", self.format())
    }
}
