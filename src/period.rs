use chrono::{Datelike, Days, NaiveDate};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An inclusive date window, unbounded on either side when a bound is `None`.
///
/// Built once per request from raw boundary input and passed immutably through
/// the calculators. A range whose start lies after its end matches no date at
/// all; it is kept as-is rather than normalized, so the calculators resolve it
/// to zero results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    pub fn bounded(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Builds a range from raw ISO `YYYY-MM-DD` boundary strings.
    ///
    /// A malformed bound is resolved to `None` (unbounded on that side) and
    /// logged at warning level, never propagated as an error.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: start.and_then(parse_iso_date),
            end: end.and_then(parse_iso_date),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }

    /// Whether a project's own date window overlaps this range. An absent
    /// bound on either side counts as open-ended.
    pub fn intersects_window(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        if let (Some(range_end), Some(window_start)) = (self.end, start) {
            if window_start > range_end {
                return false;
            }
        }
        if let (Some(range_start), Some(window_end)) = (self.start, end) {
            if window_end < range_start {
                return false;
            }
        }
        true
    }
}

fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            warn!("invalid date input '{}', treating bound as absent", input);
            None
        }
    }
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap_or_default())
}

/// Calendar-month windows covering `start..=end`, inclusive of both
/// endpoints' months. Each window spans the full month even when the range
/// begins or ends mid-month.
pub fn month_buckets(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let mut buckets = Vec::new();
    if start > end {
        return buckets;
    }

    let mut current = first_day_of_month(start);
    let final_month = first_day_of_month(end);

    while current <= final_month {
        buckets.push((current, last_day_of_month(current.year(), current.month())));
        current = if current.month() == 12 {
            NaiveDate::from_ymd_opt(current.year() + 1, 1, 1).unwrap_or(current)
        } else {
            NaiveDate::from_ymd_opt(current.year(), current.month() + 1, 1).unwrap_or(current)
        };
        if buckets.len() > 1200 {
            // runaway guard for degenerate inputs
            break;
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_valid_and_malformed() {
        let range = DateRange::parse(Some("2024-01-01"), Some("2024-03-31"));
        assert_eq!(range.start, Some(d(2024, 1, 1)));
        assert_eq!(range.end, Some(d(2024, 3, 31)));

        let range = DateRange::parse(Some("not-a-date"), Some("2024-03-31"));
        assert_eq!(range.start, None);
        assert_eq!(range.end, Some(d(2024, 3, 31)));

        let range = DateRange::parse(None, Some("2024-13-01"));
        assert!(range.is_unbounded());
    }

    #[test]
    fn test_contains_bounds() {
        let range = DateRange::bounded(d(2024, 1, 1), d(2024, 1, 31));
        assert!(range.contains(d(2024, 1, 1)));
        assert!(range.contains(d(2024, 1, 31)));
        assert!(!range.contains(d(2023, 12, 31)));
        assert!(!range.contains(d(2024, 2, 1)));

        let open = DateRange::unbounded();
        assert!(open.contains(d(1999, 6, 15)));
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let range = DateRange::bounded(d(2024, 6, 1), d(2024, 1, 1));
        assert!(!range.contains(d(2024, 3, 1)));
        assert!(!range.contains(d(2024, 6, 1)));
        assert!(!range.contains(d(2024, 1, 1)));
    }

    #[test]
    fn test_intersects_window() {
        let range = DateRange::bounded(d(2024, 1, 1), d(2024, 6, 30));
        assert!(range.intersects_window(Some(d(2024, 3, 1)), Some(d(2024, 9, 1))));
        assert!(range.intersects_window(None, None));
        assert!(!range.intersects_window(Some(d(2024, 7, 1)), None));
        assert!(!range.intersects_window(None, Some(d(2023, 12, 31))));
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2023, 2), d(2023, 2, 28));
        assert_eq!(last_day_of_month(2024, 2), d(2024, 2, 29));
        assert_eq!(last_day_of_month(2024, 12), d(2024, 12, 31));
    }

    #[test]
    fn test_month_buckets_inclusive_of_endpoint_months() {
        let buckets = month_buckets(d(2024, 1, 15), d(2024, 3, 10));
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0], (d(2024, 1, 1), d(2024, 1, 31)));
        assert_eq!(buckets[2], (d(2024, 3, 1), d(2024, 3, 31)));
    }

    #[test]
    fn test_month_buckets_single_month_and_inverted() {
        let buckets = month_buckets(d(2024, 5, 3), d(2024, 5, 20));
        assert_eq!(buckets.len(), 1);

        assert!(month_buckets(d(2024, 6, 1), d(2024, 1, 1)).is_empty());
    }
}
