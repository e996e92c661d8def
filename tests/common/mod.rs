#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use finance_tracker_core::{
    config::Config,
    engine::FixedClock,
    storage::{JsonStorage, MemoryStorage},
    Tracker,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Returns a fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn memory_tracker(today: NaiveDate) -> Tracker {
    Tracker::new(Box::new(MemoryStorage::new()))
        .with_clock(Box::new(FixedClock::new(today)))
        .with_config(Config::default())
}

/// Tracker over JSON files in `dir`; open it again on the same dir to simulate a restart.
pub fn json_tracker(dir: &PathBuf, today: NaiveDate) -> Tracker {
    let storage = JsonStorage::new(Some(dir.clone())).expect("create json storage backend");
    Tracker::new(Box::new(storage)).with_clock(Box::new(FixedClock::new(today)))
}
