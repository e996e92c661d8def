use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackerError};

use super::{time_interval::days_in_month, Transaction};

/// First day of the calendar week used by the `weekly` window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Validating constructor for user-supplied ranges.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(TrackerError::InvalidInput(format!(
                "range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Time window a transaction can be classified into. Named periods are relative to
/// the reference date passed at classification time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Period {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" | "today" => Some(Period::Daily),
            "weekly" | "week" => Some(Period::Weekly),
            "monthly" | "month" => Some(Period::Monthly),
            "quarterly" | "quarter" => Some(Period::Quarterly),
            "yearly" | "year" => Some(Period::Yearly),
            _ => None,
        }
    }

    /// Resolves the concrete window containing `today`. A custom range is used as
    /// given; an inverted range simply matches nothing.
    pub fn window(&self, today: NaiveDate, week_start: WeekStart) -> DateWindow {
        match *self {
            Period::Daily => DateWindow {
                start: today,
                end: today,
            },
            Period::Weekly => {
                let offset = match week_start {
                    WeekStart::Monday => today.weekday().num_days_from_monday(),
                    WeekStart::Sunday => today.weekday().num_days_from_sunday(),
                };
                let start = today - Duration::days(offset as i64);
                DateWindow {
                    start,
                    end: start + Duration::days(6),
                }
            }
            Period::Monthly => month_span(today.year(), today.month(), today.month()),
            Period::Quarterly => {
                let first = (today.month0() / 3) * 3 + 1;
                month_span(today.year(), first, first + 2)
            }
            Period::Yearly => month_span(today.year(), 1, 12),
            Period::Custom { start, end } => DateWindow { start, end },
        }
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate, week_start: WeekStart) -> bool {
        self.window(today, week_start).contains(date)
    }
}

fn month_span(year: i32, first_month: u32, last_month: u32) -> DateWindow {
    // Month numbers come from a valid date, so these constructions cannot fail.
    let start = NaiveDate::from_ymd_opt(year, first_month, 1).unwrap_or(NaiveDate::MIN);
    let end = NaiveDate::from_ymd_opt(year, last_month, days_in_month(year, last_month))
        .unwrap_or(NaiveDate::MAX);
    DateWindow { start, end }
}

/// Transactions whose date falls inside `window`.
pub fn filter_window<'a>(
    transactions: &'a [Transaction],
    window: DateWindow,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    transactions
        .iter()
        .filter(move |txn| window.contains(txn.date))
}
