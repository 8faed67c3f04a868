use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

// ---------------------------------------------------------------------------
// Best-effort timestamp parsing for text cells
// ---------------------------------------------------------------------------

/// Layouts with an explicit UTC offset.
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Zone-less date-time layouts.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts; these resolve to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"];

/// A single parsed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTime {
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

/// Try every known layout against `s`. Returns `None` for anything that is
/// not recognisably a date or timestamp.
pub fn parse_datetime(s: &str) -> Option<ParsedTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(ParsedTime::Zoned(dt));
    }
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(ParsedTime::Zoned(dt));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ParsedTime::Naive(dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(ParsedTime::Naive(d.and_time(NaiveTime::MIN)));
        }
    }
    None
}

/// Render a naive timestamp the way the tracker writes it back to CSV:
/// date only at midnight, seconds otherwise, fractional part only if present.
pub fn format_naive(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()
    }
}

/// Render a zoned timestamp as RFC 3339.
pub fn format_zoned(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_date_only_as_midnight() {
        let Some(ParsedTime::Naive(dt)) = parse_datetime("2024-03-05") else {
            panic!("expected naive timestamp");
        };
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(dt.time(), NaiveTime::MIN);
    }

    #[test]
    fn parses_pandas_style_timestamp_with_fraction() {
        let Some(ParsedTime::Naive(dt)) = parse_datetime("2023-10-20 14:03:11.026490") else {
            panic!("expected naive timestamp");
        };
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.nanosecond(), 26_490_000);
    }

    #[test]
    fn parses_offsets_as_zoned() {
        assert!(matches!(
            parse_datetime("2024-01-01T10:00:00+02:00"),
            Some(ParsedTime::Zoned(_))
        ));
        assert!(matches!(
            parse_datetime("2024-01-01 10:00:00+0200"),
            Some(ParsedTime::Zoned(_))
        ));
    }

    #[test]
    fn rejects_plain_text() {
        assert_eq!(parse_datetime("Backlog"), None);
        assert_eq!(parse_datetime("MDW-142"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn formatting_round_trips_through_parse() {
        for text in ["2024-03-05", "2024-03-05 08:15:00", "2023-10-20 14:03:11.026490"] {
            let Some(ParsedTime::Naive(dt)) = parse_datetime(text) else {
                panic!("{text} did not parse");
            };
            assert_eq!(parse_datetime(&format_naive(&dt)), Some(ParsedTime::Naive(dt)));
        }
    }
}
