pub mod tracker;

pub use tracker::{AchievementCheck, RefreshReport, Tracker};
