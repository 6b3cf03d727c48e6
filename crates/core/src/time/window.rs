use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Inclusive calendar-date range sent to the provider as `from`/`to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// `days` before `today` up to and including `today`.
    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        Self {
            from: today - Duration::days(days),
            to: today,
        }
    }

    pub fn from_param(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Long-form date used in email subjects, e.g. `Sunday, October 18, 2026`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn format_timestamp(unix_secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(unix_secs, 0).map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_window_spans_five_days_back() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let w = DateWindow::trailing(today, 5);
        assert_eq!(w.from_param(), "2026-02-25");
        assert_eq!(w.to_param(), "2026-03-02");
    }

    #[test]
    fn long_date_has_no_zero_padding() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 4).unwrap();
        assert_eq!(format_long_date(d), "Sunday, October 4, 2026");
    }

    #[test]
    fn formats_unix_seconds() {
        assert_eq!(
            format_timestamp(1_767_225_600).as_deref(),
            Some("2026-01-01 00:00 UTC")
        );
    }
}
