use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::errors::{Result, TrackerError};

use super::{Frequency, PaymentMode};

/// A recurring charge that the billing processor materializes into expenses.
///
/// `frequency` and `next_billing_date` decode leniently: a stored value that cannot
/// be understood becomes `None` so one damaged record never poisons the whole list.
/// The billing processor skips such subscriptions and reports them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient_frequency")]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub mode: PaymentMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub next_billing_date: Option<NaiveDate>,
    /// Day of month that monthly and yearly schedules return to after a clamped
    /// step. Records written without it adopt the day of their next due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_day: Option<u32>,
    #[serde(default = "Subscription::default_active")]
    pub is_active: bool,
}

impl Subscription {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        frequency: Frequency,
        mode: PaymentMode,
        next_billing_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            amount,
            frequency: Some(frequency),
            mode,
            category_id: None,
            next_billing_date: Some(next_billing_date),
            billing_day: Some(next_billing_date.day()),
            is_active: true,
        }
    }

    pub fn with_category(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn note(&self) -> String {
        format!("Subscription: {}", self.name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TrackerError::InvalidInput(
                "subscription name must not be empty".into(),
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(TrackerError::InvalidInput(format!(
                "subscription amount must be positive, got {}",
                self.amount
            )));
        }
        if self.frequency.is_none() {
            return Err(TrackerError::InvalidInput(
                "subscription frequency is required".into(),
            ));
        }
        if self.next_billing_date.is_none() {
            return Err(TrackerError::InvalidInput(
                "subscription next billing date is required".into(),
            ));
        }
        Ok(())
    }

    fn default_active() -> bool {
        true
    }
}

fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|value| value.as_str()).and_then(parse_date))
}

/// Strict variant for required dates: timestamps are accepted, anything else fails.
pub(crate) fn calendar_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date `{raw}`")))
}

fn lenient_frequency<'de, D>(deserializer: D) -> std::result::Result<Option<Frequency>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|value| value.as_str())
        .and_then(Frequency::parse))
}

/// Accepts plain calendar dates as well as full timestamps, truncated to the date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }
    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_timestamp_due_dates_at_day_granularity() {
        let value = json!({
            "id": Uuid::nil(),
            "name": "Music",
            "amount": 9.99,
            "frequency": "monthly",
            "mode": "upi",
            "next_billing_date": "2024-03-05T18:30:00.000Z",
            "is_active": true
        });
        let sub: Subscription = serde_json::from_value(value).unwrap();
        assert_eq!(sub.next_billing_date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(sub.frequency, Some(Frequency::Monthly));
    }

    #[test]
    fn damaged_fields_decode_as_missing() {
        let value = json!({
            "id": Uuid::nil(),
            "name": "Broken",
            "amount": 4.0,
            "frequency": "every other tuesday",
            "next_billing_date": "not a date"
        });
        let sub: Subscription = serde_json::from_value(value).unwrap();
        assert!(sub.frequency.is_none());
        assert!(sub.next_billing_date.is_none());
        assert!(sub.is_active);
        assert!(sub.validate().is_err());
    }

    #[test]
    fn note_names_the_subscription() {
        let sub = Subscription::new(
            "Gym",
            30.0,
            Frequency::Monthly,
            PaymentMode::Cash,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        assert_eq!(sub.note(), "Subscription: Gym");
        assert!(sub.validate().is_ok());
    }
}
