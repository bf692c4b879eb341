//! # Date Filters
//!
//! The `last_update` sidebar filter of the product changelist.
//!
//! Every lookup resolves to a half-open UTC range `[since, until)` anchored
//! on the start of the current day:
//! ```text
//! today        [00:00 today,          00:00 tomorrow)
//! past_7_days  [00:00 today - 7 days, 00:00 tomorrow)
//! this_month   [1st of this month,    1st of next month)
//! this_year    [Jan 1st this year,    Jan 1st next year)
//! ```

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// A resolved `[since, until)` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.since <= at && at < self.until
    }
}

/// Lookups offered by the last-update filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastUpdateFilter {
    Today,
    PastSevenDays,
    ThisMonth,
    ThisYear,
}

impl LastUpdateFilter {
    /// Sidebar heading.
    pub const TITLE: &'static str = "last update";

    /// Query string parameter.
    pub const PARAMETER: &'static str = "last_update";

    pub const ALL: [LastUpdateFilter; 4] = [
        LastUpdateFilter::Today,
        LastUpdateFilter::PastSevenDays,
        LastUpdateFilter::ThisMonth,
        LastUpdateFilter::ThisYear,
    ];

    /// Query string value.
    pub const fn value(&self) -> &'static str {
        match self {
            LastUpdateFilter::Today => "today",
            LastUpdateFilter::PastSevenDays => "past_7_days",
            LastUpdateFilter::ThisMonth => "this_month",
            LastUpdateFilter::ThisYear => "this_year",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            LastUpdateFilter::Today => "Today",
            LastUpdateFilter::PastSevenDays => "Past 7 days",
            LastUpdateFilter::ThisMonth => "This month",
            LastUpdateFilter::ThisYear => "This year",
        }
    }

    /// Unknown or absent values mean "Any date".
    pub fn parse(value: Option<&str>) -> Option<Self> {
        let value = value?;
        Self::ALL.into_iter().find(|f| f.value() == value)
    }

    /// Resolves the lookup against `now`.
    pub fn range(&self, now: DateTime<Utc>) -> DateRange {
        let today = now.date_naive();
        let tomorrow = today + Duration::days(1);

        let (since, until) = match self {
            LastUpdateFilter::Today => (today, tomorrow),
            LastUpdateFilter::PastSevenDays => (today - Duration::days(7), tomorrow),
            LastUpdateFilter::ThisMonth => {
                let first = first_of_month(today.year(), today.month());
                let next = if today.month() == 12 {
                    first_of_month(today.year() + 1, 1)
                } else {
                    first_of_month(today.year(), today.month() + 1)
                };
                (first, next)
            }
            LastUpdateFilter::ThisYear => (
                first_of_month(today.year(), 1),
                first_of_month(today.year() + 1, 1),
            ),
        };

        DateRange {
            since: midnight(since),
            until: midnight(until),
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // Day 1 exists in every month
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

// =============================================================================
// Unit Tests
// =============================================================================
