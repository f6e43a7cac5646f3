use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Wall-clock time at the premises. Clock requests carry naive local
/// timestamps, so everything stored is naive local time as well.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Accepts `YYYY-MM-DDTHH:MM[:SS[.fff]]`, the same with a space instead of
/// `T`, or a full RFC 3339 timestamp (its offset is dropped).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    let normalized = raw.replacen(' ', "T", 1);
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// `HH:MM`, with seconds tolerated.
pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// `09:05 AM`
pub fn clock_face(ts: &NaiveDateTime) -> String {
    ts.format("%I:%M %p").to_string()
}

/// Start of a look-back window of `days` ending at `now`; `None` when the
/// window reaches outside the calendar chrono can represent.
pub fn days_before(now: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    Duration::try_days(days).and_then(|window| now.checked_sub_signed(window))
}

/// `8 hours and 30 minutes`
pub fn describe_duration(d: Duration) -> String {
    let minutes = d.num_minutes().max(0);
    format!("{} hours and {} minutes", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn parses_client_formats() {
        assert_eq!(parse_timestamp("2026-03-02T09:15:00"), Some(at(9, 15, 0)));
        assert_eq!(parse_timestamp("2026-03-02 09:15:00"), Some(at(9, 15, 0)));
        assert_eq!(parse_timestamp("2026-03-02T09:15"), Some(at(9, 15, 0)));
        assert_eq!(
            parse_timestamp("2026-03-02T09:15:00.250").map(|t| t.time().format("%H:%M:%S").to_string()),
            Some("09:15:00".to_string())
        );
        assert_eq!(parse_timestamp("2026-03-02T09:15:00+00:00"), Some(at(9, 15, 0)));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2026-13-02T09:15"), None);
    }

    #[test]
    fn parses_times_of_day() {
        assert_eq!(parse_hhmm("10:00"), NaiveTime::from_hms_opt(10, 0, 0));
        assert_eq!(parse_hhmm("07:30:15"), NaiveTime::from_hms_opt(7, 30, 15));
        assert_eq!(parse_hhmm("25:00"), None);
    }

    #[test]
    fn look_back_window_stays_in_range() {
        assert_eq!(days_before(at(9, 0, 0), 1), Some(at(9, 0, 0) - Duration::days(1)));
        assert_eq!(days_before(at(9, 0, 0), 0), Some(at(9, 0, 0)));
        assert_eq!(days_before(at(9, 0, 0), 100_000_000), None);
        assert_eq!(days_before(at(9, 0, 0), i64::MAX), None);
    }

    #[test]
    fn formats_for_humans() {
        assert_eq!(clock_face(&at(14, 5, 0)), "02:05 PM");
        assert_eq!(
            describe_duration(Duration::minutes(8 * 60 + 30)),
            "8 hours and 30 minutes"
        );
        assert_eq!(describe_duration(Duration::seconds(59)), "0 hours and 0 minutes");
    }
}
