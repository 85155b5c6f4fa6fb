use chrono::Local;

#[cfg(debug_assertions)]
use crate::core::GenericResult;
use crate::types::DateTime;

pub fn now() -> DateTime {
    local_now().naive_local()
}

fn local_now() -> chrono::DateTime<Local> {
    #[cfg(debug_assertions)]
    {
        use std::process;

        lazy_static::lazy_static! {
            static ref FAKE_NOW: Option<chrono::DateTime<Local>> = parse_fake_now().unwrap_or_else(|e| {
                eprintln!("{}.", e);
                process::exit(1);
            });
        }

        if let Some(&now) = FAKE_NOW.as_ref() {
            return now;
        }
    }

    Local::now()
}

#[cfg(debug_assertions)]
fn parse_fake_now() -> GenericResult<Option<chrono::DateTime<Local>>> {
    use std::env::{self, VarError};
    use chrono::TimeZone;

    let name = "PAYOUTS_NOW";

    match env::var(name) {
        Ok(value) => {
            if let Ok(fake_now) = chrono::NaiveDateTime::parse_from_str(&value, "%Y.%m.%d %H:%M:%S") {
                if let Some(fake_now) = Local.from_local_datetime(&fake_now).single() {
                    return Ok(Some(fake_now));
                }
            }
            Err!("Invalid {} value: {:?}", name, value)
        },
        Err(e) => match e {
            VarError::NotPresent => Ok(None),
            VarError::NotUnicode(_) => Err!("Invalid {} value", name),
        },
    }
}
