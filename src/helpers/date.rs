//! Date helper functions

use chrono::NaiveDate;

/// Format a date the way structured data expects it (YYYY-MM-DD)
pub fn iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a YYYY-MM-DD string
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Format date in full format (like "January 1, 2024")
pub fn full_date(date: &NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Reformat a YYYY-MM-DD string for display, leaving unparsable input untouched
pub fn display_date(s: &str) -> String {
    parse_iso_date(s)
        .map(|d| full_date(&d))
        .unwrap_or_else(|| s.to_string())
}

/// Calendar year, for footers
pub fn year(date: &NaiveDate) -> String {
    date.format("%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(iso_date(&date), "2024-01-05");
        assert_eq!(parse_iso_date(" 2024-01-05 "), Some(date));
        assert_eq!(parse_iso_date("05/01/2024"), None);
    }

    #[test]
    fn test_full_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(full_date(&date), "January 15, 2024");
        assert_eq!(display_date("2023-05-03"), "May 3, 2023");
        assert_eq!(display_date("soon"), "soon");
    }

    #[test]
    fn test_year() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(year(&date), "2025");
    }
}
