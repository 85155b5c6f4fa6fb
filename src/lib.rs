#[macro_use] extern crate maplit;

#[macro_use] pub mod core;
#[macro_use] pub mod types;

pub mod cli;
pub mod config;
pub mod currency;
pub mod fees;
pub mod formatting;
pub mod localities;
pub mod reports;
pub mod taxes;
pub mod time;
pub mod util;
pub mod withdrawals;
