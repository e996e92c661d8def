//! Subscription catch-up billing.
//!
//! Processing is pure: it takes the stored subscriptions and "today" and returns the
//! charges to materialize together with the advanced schedules. Persisting both in
//! one write is the caller's job, so a crash can never leave a due date behind the
//! charges it produced.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::ledger::{Subscription, Transaction};

const PENDING_WINDOW_DAYS: i64 = 7;

/// Why a subscription was left untouched by a billing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BillingWarning {
    MissingDueDate { id: Uuid, name: String },
    MissingFrequency { id: Uuid, name: String },
    InvalidAmount { id: Uuid, name: String },
    /// The schedule could not move past a date (calendar range exhausted).
    ScheduleStalled { id: Uuid, name: String, at: NaiveDate },
}

impl std::fmt::Display for BillingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingWarning::MissingDueDate { id, name } => {
                write!(f, "subscription `{name}` ({id}) has no valid next billing date")
            }
            BillingWarning::MissingFrequency { id, name } => {
                write!(f, "subscription `{name}` ({id}) has no valid frequency")
            }
            BillingWarning::InvalidAmount { id, name } => {
                write!(f, "subscription `{name}` ({id}) has a non-positive amount")
            }
            BillingWarning::ScheduleStalled { id, name, at } => {
                write!(f, "subscription `{name}` ({id}) cannot advance past {at}")
            }
        }
    }
}

/// Outcome of one catch-up pass over all subscriptions.
#[derive(Debug, Clone, Default)]
pub struct BillingRun {
    /// Materialized charges, grouped per subscription in strictly increasing date order.
    pub transactions: Vec<Transaction>,
    /// Every input subscription, with due dates advanced where billing happened.
    pub subscriptions: Vec<Subscription>,
    pub warnings: Vec<BillingWarning>,
}

impl BillingRun {
    pub fn changed(&self) -> bool {
        !self.transactions.is_empty()
    }
}

/// Catches every active subscription up to `today`: one expense per elapsed period,
/// dated on the period's due date, and the due date moved to the first date strictly
/// after `today`.
pub fn process_due_subscriptions(subscriptions: &[Subscription], today: NaiveDate) -> BillingRun {
    let mut run = BillingRun {
        subscriptions: subscriptions.to_vec(),
        ..BillingRun::default()
    };

    for subscription in run.subscriptions.iter_mut() {
        if !subscription.is_active {
            continue;
        }
        let Some(mut due) = subscription.next_billing_date else {
            run.warnings.push(BillingWarning::MissingDueDate {
                id: subscription.id,
                name: subscription.name.clone(),
            });
            continue;
        };
        if due > today {
            continue;
        }
        let Some(frequency) = subscription.frequency else {
            run.warnings.push(BillingWarning::MissingFrequency {
                id: subscription.id,
                name: subscription.name.clone(),
            });
            continue;
        };
        if !subscription.amount.is_finite() || subscription.amount <= 0.0 {
            run.warnings.push(BillingWarning::InvalidAmount {
                id: subscription.id,
                name: subscription.name.clone(),
            });
            continue;
        }

        let anchor = subscription.billing_day.unwrap_or(due.day());
        let mut charges = Vec::new();
        let mut stalled = false;
        while due <= today {
            charges.push(materialize_charge(subscription, due));
            let next = frequency.next_date_on(due, anchor);
            if next <= due {
                stalled = true;
                break;
            }
            due = next;
        }
        if stalled {
            run.warnings.push(BillingWarning::ScheduleStalled {
                id: subscription.id,
                name: subscription.name.clone(),
                at: due,
            });
            continue;
        }

        tracing::debug!(
            subscription = %subscription.id,
            charges = charges.len(),
            next_billing_date = %due,
            "subscription caught up"
        );
        subscription.next_billing_date = Some(due);
        subscription.billing_day = Some(anchor);
        run.transactions.extend(charges);
    }

    run
}

fn materialize_charge(subscription: &Subscription, due: NaiveDate) -> Transaction {
    Transaction::expense(subscription.amount, due, subscription.mode)
        .with_category(subscription.category_id)
        .with_note(subscription.note())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    DueToday,
    Upcoming,
}

/// A subscription due soon, for reminder lists.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingCharge {
    pub subscription_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub due: NaiveDate,
    pub days_until: i64,
    pub status: ReminderStatus,
}

/// Active subscriptions due between `today` and `today + within_days`, soonest first.
pub fn upcoming_charges(
    subscriptions: &[Subscription],
    today: NaiveDate,
    within_days: Option<i64>,
) -> Vec<UpcomingCharge> {
    let window = Duration::try_days(within_days.unwrap_or(PENDING_WINDOW_DAYS).max(0));
    let horizon = window
        .and_then(|window| today.checked_add_signed(window))
        .unwrap_or(NaiveDate::MAX);
    let mut upcoming: Vec<UpcomingCharge> = subscriptions
        .iter()
        .filter(|sub| sub.is_active)
        .filter_map(|sub| {
            let due = sub.next_billing_date?;
            if due < today || due > horizon {
                return None;
            }
            Some(UpcomingCharge {
                subscription_id: sub.id,
                name: sub.name.clone(),
                amount: sub.amount,
                due,
                days_until: (due - today).num_days(),
                status: if due == today {
                    ReminderStatus::DueToday
                } else {
                    ReminderStatus::Upcoming
                },
            })
        })
        .collect();
    upcoming.sort_by_key(|charge| (charge.due, charge.subscription_id));
    upcoming
}
