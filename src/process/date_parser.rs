use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::process::utils::clean_str;

/// Parse one registration date, trying each chrono format in order.
///
/// Date-only formats are tried with `NaiveDate`, formats carrying a time component with
/// `NaiveDateTime` (the time is dropped). RFC 3339 timestamps are accepted as a last resort.
/// Anything else yields `None`: a bad value becomes a missing date, never an error.
pub fn parse_registration_date<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<NaiveDate> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }

    for fmt in formats {
        let fmt = fmt.as_ref();
        let parsed = if has_time_component(fmt) {
            NaiveDateTime::parse_from_str(&s, fmt).ok().map(|dt| dt.date())
        } else {
            NaiveDate::parse_from_str(&s, fmt).ok()
        };
        if parsed.is_some() {
            return parsed;
        }
    }

    DateTime::parse_from_rfc3339(&s)
        .ok()
        .map(|dt| dt.date_naive())
}

fn has_time_component(fmt: &str) -> bool {
    ["%H", "%M", "%S", "%T", "%R", "%I", "%p"]
        .iter()
        .any(|tok| fmt.contains(tok))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_date_formats;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_default_formats() {
        let f = default_date_formats();
        assert_eq!(parse_registration_date("2020-01-15", &f), ymd(2020, 1, 15));
        assert_eq!(parse_registration_date("2020/01/20", &f), ymd(2020, 1, 20));
        assert_eq!(parse_registration_date("01-03-2021", &f), ymd(2021, 3, 1));
        assert_eq!(parse_registration_date("31/12/2019", &f), ymd(2019, 12, 31));
        assert_eq!(
            parse_registration_date("2024/12/22 00:05:00", &f),
            ymd(2024, 12, 22)
        );
        assert_eq!(parse_registration_date("05-Jun-2018", &f), ymd(2018, 6, 5));
        assert_eq!(
            parse_registration_date("2022-07-04T10:00:00+05:30", &f),
            ymd(2022, 7, 4)
        );
    }

    #[test]
    fn test_unparseable_values_are_missing() {
        let f = default_date_formats();
        assert_eq!(parse_registration_date("", &f), None);
        assert_eq!(parse_registration_date("not a date", &f), None);
        assert_eq!(parse_registration_date("2020-13-01", &f), None);
        assert_eq!(parse_registration_date("2021-02-30", &f), None);
    }

    #[test]
    fn test_format_order_wins() {
        // day-first before month-first
        let f = ["%d/%m/%Y", "%m/%d/%Y"];
        assert_eq!(parse_registration_date("04/05/2020", &f), ymd(2020, 5, 4));
        let f = ["%m/%d/%Y", "%d/%m/%Y"];
        assert_eq!(parse_registration_date("04/05/2020", &f), ymd(2020, 4, 5));
    }
}
