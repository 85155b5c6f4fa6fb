use thiserror::Error;

use crate::types::Decimal;

pub type EmptyResult = GenericResult<()>;
pub type GenericResult<T> = Result<T, GenericError>;
pub type GenericError = Box<dyn ::std::error::Error + Send + Sync>;

#[cfg(test)]
macro_rules! s {
    ($e:expr) => ($e.to_owned())
}

macro_rules! dec {
    ($e:expr) => (::rust_decimal_macros::dec!($e))
}

macro_rules! Err {
    ($($arg:tt)*) => (::std::result::Result::Err(format!($($arg)*).into()))
}

/// Errors produced by the calculation core. The core never swallows them: an
/// invalid input always fails the same way, so there is nothing to retry.
#[derive(Debug, Clone, Error)]
pub enum CalculationError {
    #[error("Invalid withdrawal amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Unsupported payment method: {0:?}")]
    UnsupportedPaymentMethod(String),

    #[error("Invalid financial data: {0}")]
    InvalidFinancialData(String),

    #[error("Failed to assemble {section:?} report section: {source}")]
    Aggregation {
        section: &'static str,
        #[source]
        source: Box<CalculationError>,
    },
}

impl CalculationError {
    pub fn aggregation(section: &'static str) -> impl FnOnce(CalculationError) -> CalculationError {
        move |source| CalculationError::Aggregation {section, source: Box::new(source)}
    }
}

pub type CalculationResult<T> = Result<T, CalculationError>;
