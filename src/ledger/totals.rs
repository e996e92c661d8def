use serde::{Deserialize, Serialize};

use super::{PaymentMode, Transaction, TransactionKind};

/// Expense and income sums split by payment channel.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub expense: f64,
    pub income: f64,
    pub balance: f64,
    pub expense_upi: f64,
    pub expense_cash: f64,
    pub income_upi: f64,
    pub income_cash: f64,
}

impl Totals {
    /// Only expenses and income contribute; balance adjustments are tracked against
    /// the account balance and never enter these sums.
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut totals = Totals::default();
        for txn in transactions {
            match (txn.kind, txn.mode) {
                (TransactionKind::Expense, PaymentMode::Upi) => totals.expense_upi += txn.amount,
                (TransactionKind::Expense, PaymentMode::Cash) => totals.expense_cash += txn.amount,
                (TransactionKind::Income, PaymentMode::Upi) => totals.income_upi += txn.amount,
                (TransactionKind::Income, PaymentMode::Cash) => totals.income_cash += txn.amount,
                (TransactionKind::BalanceAdjustment, _) => {}
            }
        }
        totals.expense = totals.expense_upi + totals.expense_cash;
        totals.income = totals.income_upi + totals.income_cash;
        totals.balance = totals.income - totals.expense;
        totals
    }
}
