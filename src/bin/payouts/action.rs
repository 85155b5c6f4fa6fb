use payouts::fees::PaymentMethod;
use payouts::types::Decimal;

pub enum Action {
    Methods,
    Fees {
        amount: Decimal,
        currency: String,
        method: Option<PaymentMethod>,
    },

    TaxReport {
        json: bool,
    },
    Quarterly,
    Monthly {
        month: u32,
    },

    Check,
}
