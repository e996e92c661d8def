use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, TrackerError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
    BalanceAdjustment,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    #[default]
    Upi,
    Cash,
}

impl PaymentMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "upi" => Some(PaymentMode::Upi),
            "cash" => Some(PaymentMode::Cash),
            _ => None,
        }
    }
}

/// Direction of a manual balance correction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Add,
    Subtract,
}

/// A single ledger entry. Identifiers are time-ordered (UUIDv7), so sorting by id
/// yields creation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    #[serde(deserialize_with = "super::subscription::calendar_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub mode: PaymentMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment_type: Option<AdjustmentKind>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: f64, date: NaiveDate, mode: PaymentMode) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            amount,
            date,
            mode,
            category_id: None,
            note: None,
            adjustment_type: None,
        }
    }

    pub fn expense(amount: f64, date: NaiveDate, mode: PaymentMode) -> Self {
        Self::new(TransactionKind::Expense, amount, date, mode)
    }

    pub fn income(amount: f64, date: NaiveDate, mode: PaymentMode) -> Self {
        Self::new(TransactionKind::Income, amount, date, mode)
    }

    pub fn balance_adjustment(
        adjustment: AdjustmentKind,
        amount: f64,
        date: NaiveDate,
        mode: PaymentMode,
    ) -> Self {
        let mut txn = Self::new(TransactionKind::BalanceAdjustment, amount, date, mode);
        txn.adjustment_type = Some(adjustment);
        txn
    }

    pub fn with_category(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_adjustment(&self) -> bool {
        self.kind == TransactionKind::BalanceAdjustment
    }

    /// Balance adjustments correct an account balance and are not user activity.
    pub fn counts_toward_streak(&self) -> bool {
        !self.is_adjustment()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(TrackerError::InvalidInput(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }
        match (self.kind, self.adjustment_type) {
            (TransactionKind::BalanceAdjustment, None) => Err(TrackerError::InvalidInput(
                "balance adjustment requires an adjustment type".into(),
            )),
            (TransactionKind::Expense | TransactionKind::Income, Some(_)) => {
                Err(TrackerError::InvalidInput(
                    "adjustment type is only valid for balance adjustments".into(),
                ))
            }
            _ => Ok(()),
        }
    }
}
