pub mod table;

use crate::types::{Date, DateTime};

pub fn format_date(date: Date) -> String {
    date.format("%d.%m.%Y").to_string()
}

pub fn format_date_time(time: DateTime) -> String {
    time.format("%d.%m.%Y %H:%M:%S").to_string()
}

pub fn format_months(months: [u32; 3]) -> String {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun",
        "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    format!("{} - {}",
        NAMES[months[0] as usize - 1],
        NAMES[months[2] as usize - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates() {
        assert_eq!(format_date(date!(2024, 4, 30)), s!("30.04.2024"));
        assert_eq!(format_months([1, 2, 3]), s!("Jan - Mar"));
        assert_eq!(format_months([10, 11, 12]), s!("Oct - Dec"));
    }
}
