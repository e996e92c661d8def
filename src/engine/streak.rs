use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Consecutive-day activity counter. `longest_streak >= current_streak` holds after
/// every transition.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub last_entry_date: Option<NaiveDate>,
}

impl StreakRecord {
    /// Applies one "activity recorded today" transition and returns the new record.
    ///
    /// A `today` earlier than the last entry (clock skew) leaves the record unchanged,
    /// so the stored last-entry date never moves backwards.
    pub fn record_activity(&self, today: NaiveDate) -> StreakRecord {
        let Some(last) = self.last_entry_date else {
            return StreakRecord {
                current_streak: 1,
                longest_streak: self.longest_streak.max(1),
                last_entry_date: Some(today),
            };
        };
        match (today - last).num_days() {
            gap if gap <= 0 => *self,
            1 => {
                let current = self.current_streak.saturating_add(1);
                StreakRecord {
                    current_streak: current,
                    longest_streak: self.longest_streak.max(current),
                    last_entry_date: Some(today),
                }
            }
            _ => StreakRecord {
                current_streak: 1,
                longest_streak: self.longest_streak.max(1),
                last_entry_date: Some(today),
            },
        }
    }

    /// Streak as it should be displayed on `today`: a run whose last entry is older
    /// than yesterday is already broken even though the stored counter only resets on
    /// the next entry.
    pub fn effective_current(&self, today: NaiveDate) -> u32 {
        match self.last_entry_date {
            Some(last) if (today - last).num_days() <= 1 => self.current_streak,
            _ => 0,
        }
    }

    /// Recomputes the record from a full activity history, as after a bulk import.
    pub fn rebuild<I>(dates: I) -> StreakRecord
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut days: Vec<NaiveDate> = dates.into_iter().collect();
        days.sort_unstable();
        days.dedup();
        days.into_iter()
            .fold(StreakRecord::default(), |record, day| record.record_activity(day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_entry_starts_streak() {
        let record = StreakRecord::default().record_activity(date(2024, 1, 1));
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.longest_streak, 1);
        assert_eq!(record.last_entry_date, Some(date(2024, 1, 1)));
    }

    #[test]
    fn gap_resets_but_keeps_longest() {
        let record = [
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 2),
            date(2024, 1, 4),
        ]
        .into_iter()
        .fold(StreakRecord::default(), |r, d| r.record_activity(d));
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.longest_streak, 2);
        assert_eq!(record.last_entry_date, Some(date(2024, 1, 4)));
    }

    #[test]
    fn same_day_is_idempotent() {
        let once = StreakRecord::default().record_activity(date(2024, 2, 1));
        assert_eq!(once.record_activity(date(2024, 2, 1)), once);
    }

    #[test]
    fn consecutive_days_extend_longest() {
        let mut record = StreakRecord {
            current_streak: 4,
            longest_streak: 4,
            last_entry_date: Some(date(2024, 2, 28)),
        };
        record = record.record_activity(date(2024, 2, 29));
        record = record.record_activity(date(2024, 3, 1));
        assert_eq!(record.current_streak, 6);
        assert_eq!(record.longest_streak, 6);
    }

    #[test]
    fn clock_skew_leaves_record_untouched() {
        let record = StreakRecord {
            current_streak: 3,
            longest_streak: 5,
            last_entry_date: Some(date(2024, 5, 10)),
        };
        assert_eq!(record.record_activity(date(2024, 5, 8)), record);
    }

    #[test]
    fn effective_current_drops_to_zero_after_a_missed_day() {
        let record = StreakRecord {
            current_streak: 3,
            longest_streak: 3,
            last_entry_date: Some(date(2024, 5, 10)),
        };
        assert_eq!(record.effective_current(date(2024, 5, 11)), 3);
        assert_eq!(record.effective_current(date(2024, 5, 12)), 0);
        assert_eq!(StreakRecord::default().effective_current(date(2024, 5, 12)), 0);
    }

    #[test]
    fn rebuild_ignores_order_and_duplicates() {
        let record = StreakRecord::rebuild(vec![
            date(2024, 1, 5),
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 3),
            date(2024, 1, 2),
        ]);
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.longest_streak, 3);
        assert_eq!(record.last_entry_date, Some(date(2024, 1, 5)));
    }
}
