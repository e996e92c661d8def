#![doc(test(attr(deny(warnings))))]

//! Finance Tracker Core keeps a local ledger of expenses and income and drives the
//! engagement features built on it: subscription catch-up billing, daily activity
//! streaks, savings and spending goals, achievements, and motivational messages.

pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

pub use crate::core::Tracker;
pub use errors::{Result, TrackerError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finance Tracker Core tracing initialized.");
    });
}
