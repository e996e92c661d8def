use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Billing cadence for a subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Some(Frequency::Daily),
            "weekly" | "week" => Some(Frequency::Weekly),
            "monthly" | "month" => Some(Frequency::Monthly),
            "yearly" | "year" | "annual" => Some(Frequency::Yearly),
            _ => None,
        }
    }

    /// Advances `from` by exactly one period. Month and year steps keep the
    /// day-of-month and clamp to the last day when the target month is shorter.
    /// At the end of the calendar range `from` is returned unchanged.
    pub fn next_date(&self, from: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => from.checked_add_signed(Duration::days(1)).unwrap_or(from),
            Frequency::Weekly => from.checked_add_signed(Duration::weeks(1)).unwrap_or(from),
            Frequency::Monthly => shift_month(from, 1),
            Frequency::Yearly => shift_year(from, 1),
        }
    }

    /// Like [`Frequency::next_date`], but month and year steps land on `anchor_day`
    /// whenever the target month has it, so a schedule that was clamped once
    /// returns to its original day of month.
    pub fn next_date_on(&self, from: NaiveDate, anchor_day: u32) -> NaiveDate {
        match self {
            Frequency::Daily | Frequency::Weekly => self.next_date(from),
            Frequency::Monthly | Frequency::Yearly => {
                let stepped = self.next_date(from);
                let last = days_in_month(stepped.year(), stepped.month());
                let day = anchor_day.clamp(1, 31).min(last);
                stepped.with_day(day).unwrap_or(stepped)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

fn shift_month(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

fn shift_year(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    let day = date.day().min(days_in_month(year, date.month()));
    NaiveDate::from_ymd_opt(year, date.month(), day).unwrap_or(date)
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}
