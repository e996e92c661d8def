//! The recurring-transaction and engagement engine. Every function here is pure:
//! state comes in as values and leaves as values; the tracker facade owns I/O.

pub mod achievements;
pub mod goals;
pub mod messages;
pub mod recurring;
pub mod streak;
pub mod time;

pub use achievements::{
    evaluate_achievements, Achievement, AchievementOutcome, AchievementRegistry,
    EngagementSnapshot,
};
pub use goals::{
    calculate_goal_progress, CompletedGoalsFlags, CustomGoal, GoalCategory, GoalConfig,
    GoalProgress, GoalScope, GoalTargets,
};
pub use messages::{
    select_message, MessageSignals, MessageTemplate, Picker, ThreadRngPicker,
};
pub use recurring::{
    process_due_subscriptions, upcoming_charges, BillingRun, BillingWarning, ReminderStatus,
    UpcomingCharge,
};
pub use streak::StreakRecord;
pub use time::{Clock, FixedClock, SystemClock};
