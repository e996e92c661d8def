//! Persisted ledger records and the pure helpers that classify and total them.

pub mod period;
pub mod subscription;
pub mod time_interval;
pub mod totals;
pub mod transaction;

pub use period::{filter_window, DateWindow, Period, WeekStart};
pub use subscription::Subscription;
pub use time_interval::Frequency;
pub use totals::Totals;
pub use transaction::{AdjustmentKind, PaymentMode, Transaction, TransactionKind};
