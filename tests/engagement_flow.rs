mod common;

use common::{day, memory_tracker};
use finance_tracker_core::{
    engine::{Achievement, FixedClock, GoalCategory, GoalScope, Picker},
    ledger::{AdjustmentKind, PaymentMode, Period, Transaction},
    TrackerError,
};

struct First;

impl Picker for First {
    fn pick(&mut self, _len: usize) -> usize {
        0
    }
}

#[test]
fn streak_follows_consecutive_entry_days() {
    let mut tracker = memory_tracker(day(2024, 1, 1));
    for date in [day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 2), day(2024, 1, 4)] {
        tracker.set_clock(Box::new(FixedClock::new(date)));
        tracker
            .add_transaction(Transaction::expense(5.0, date, PaymentMode::Cash))
            .unwrap();
    }

    let streak = tracker.streak().unwrap();
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.longest_streak, 2);
    assert_eq!(streak.last_entry_date, Some(day(2024, 1, 4)));
}

#[test]
fn adjustments_neither_extend_streaks_nor_move_totals() {
    let tracker = memory_tracker(day(2024, 5, 10));
    tracker
        .add_transaction(Transaction::balance_adjustment(
            AdjustmentKind::Add,
            1000.0,
            day(2024, 5, 10),
            PaymentMode::Upi,
        ))
        .unwrap();
    assert_eq!(tracker.streak().unwrap().current_streak, 0);

    tracker
        .add_transaction(Transaction::expense(100.0, day(2024, 5, 10), PaymentMode::Upi))
        .unwrap();
    tracker
        .add_transaction(Transaction::income(50.0, day(2024, 5, 10), PaymentMode::Cash))
        .unwrap();

    let totals = tracker.summary(Period::Monthly).unwrap();
    assert_eq!(totals.balance, -50.0);
    assert_eq!(totals.expense_upi, 100.0);
    assert_eq!(totals.income_cash, 50.0);
    assert_eq!(tracker.lifetime_totals().unwrap().balance, -50.0);
    assert_eq!(tracker.streak().unwrap().current_streak, 1);
}

#[test]
fn expense_limit_reports_completion_and_overrun() {
    let tracker = memory_tracker(day(2024, 7, 20));
    tracker
        .set_goal_target(GoalScope::Monthly, GoalCategory::Expense, 1000.0)
        .unwrap();
    tracker
        .add_transaction(Transaction::expense(800.0, day(2024, 7, 3), PaymentMode::Upi))
        .unwrap();
    // Outside the month; ignored.
    tracker
        .add_transaction(Transaction::expense(900.0, day(2024, 6, 30), PaymentMode::Upi))
        .unwrap();

    let goal = tracker
        .calculate_goal_progress(GoalScope::Monthly, GoalCategory::Expense)
        .unwrap();
    assert!(goal.is_completed);
    assert!(!goal.is_over_limit);
    assert!((goal.progress - 80.0).abs() < 1e-9);
    assert!((goal.remaining - 200.0).abs() < 1e-9);

    tracker
        .add_transaction(Transaction::expense(400.0, day(2024, 7, 19), PaymentMode::Cash))
        .unwrap();
    let goal = tracker
        .calculate_goal_progress(GoalScope::Monthly, GoalCategory::Expense)
        .unwrap();
    assert!(!goal.is_completed);
    assert!(goal.is_over_limit);
    assert_eq!(goal.progress, 100.0);
    assert_eq!(goal.remaining, 0.0);
}

#[test]
fn savings_goal_needs_a_target() {
    let tracker = memory_tracker(day(2024, 7, 20));
    tracker
        .add_transaction(Transaction::income(500.0, day(2024, 7, 1), PaymentMode::Upi))
        .unwrap();

    let unset = tracker
        .calculate_goal_progress(GoalScope::Monthly, GoalCategory::Savings)
        .unwrap();
    assert!(!unset.is_completed);
    assert!(tracker.visible_goals().unwrap().is_empty());

    tracker
        .set_goal_target(GoalScope::Monthly, GoalCategory::Savings, 500.0)
        .unwrap();
    let set = tracker
        .calculate_goal_progress(GoalScope::Monthly, GoalCategory::Savings)
        .unwrap();
    assert!(set.is_completed);
    assert_eq!(tracker.visible_goals().unwrap().len(), 1);

    assert!(tracker
        .set_goal_target(GoalScope::Monthly, GoalCategory::Savings, -1.0)
        .is_err());
}

#[test]
fn custom_goal_uses_its_own_range() {
    let tracker = memory_tracker(day(2024, 8, 15));
    tracker
        .set_goal_target(GoalScope::Custom, GoalCategory::Savings, 300.0)
        .unwrap();
    tracker
        .add_transaction(Transaction::income(300.0, day(2024, 8, 2), PaymentMode::Upi))
        .unwrap();

    // No range yet, so the goal is not configured.
    let before = tracker
        .calculate_goal_progress(GoalScope::Custom, GoalCategory::Savings)
        .unwrap();
    assert_eq!(before.target_goal, 0.0);

    tracker
        .set_custom_goal("Vacation", day(2024, 8, 1), day(2024, 8, 31))
        .unwrap();
    let after = tracker
        .calculate_goal_progress(GoalScope::Custom, GoalCategory::Savings)
        .unwrap();
    assert!(after.is_completed);
    assert_eq!(tracker.goal_config().unwrap().custom.label, "Vacation");

    assert!(tracker
        .set_custom_goal("Backwards", day(2024, 9, 1), day(2024, 8, 1))
        .is_err());
}

#[test]
fn achievements_fire_once() {
    let tracker = memory_tracker(day(2024, 2, 1));
    tracker
        .add_transaction(Transaction::income(20.0, day(2024, 2, 1), PaymentMode::Upi))
        .unwrap();

    let first = tracker.check_achievements().unwrap();
    assert_eq!(
        first.new_achievements,
        vec![Achievement::FirstEntry, Achievement::PositiveBalance]
    );

    let second = tracker.check_achievements().unwrap();
    assert!(second.new_achievements.is_empty());
    assert_eq!(second.all_achievements, vec!["first_entry", "balance_positive"]);
}

#[test]
fn savings_goal_achievement_rearms_after_target_change() {
    let tracker = memory_tracker(day(2024, 2, 10));
    tracker
        .set_goal_target(GoalScope::Monthly, GoalCategory::Savings, 100.0)
        .unwrap();
    tracker
        .add_transaction(Transaction::income(200.0, day(2024, 2, 10), PaymentMode::Upi))
        .unwrap();

    let first = tracker.check_achievements().unwrap();
    assert!(first.new_achievements.contains(&Achievement::MonthlySavingsGoal));
    assert!(tracker
        .check_achievements()
        .unwrap()
        .new_achievements
        .is_empty());

    tracker
        .set_goal_target(GoalScope::Monthly, GoalCategory::Savings, 150.0)
        .unwrap();
    let again = tracker.check_achievements().unwrap();
    assert_eq!(again.new_achievements, vec![Achievement::MonthlySavingsGoal]);
    let occurrences = again
        .all_achievements
        .iter()
        .filter(|id| id.as_str() == "goal_monthly")
        .count();
    assert_eq!(occurrences, 1);
}

#[test]
fn message_reflects_the_current_state() {
    let mut tracker = memory_tracker(day(2024, 4, 1));
    let empty = tracker.motivational_message_with(&mut First).unwrap();
    assert_eq!(empty.key, "first_entry");

    tracker
        .add_transaction(Transaction::income(10.0, day(2024, 4, 1), PaymentMode::Upi))
        .unwrap();
    let today = tracker.motivational_message_with(&mut First).unwrap();
    assert_eq!(today.key, "streak_started");

    // A week later the stored streak is stale and no longer shown.
    tracker.set_clock(Box::new(FixedClock::new(day(2024, 4, 8))));
    let later = tracker.motivational_message_with(&mut First).unwrap();
    assert_eq!(later.key, "balance_positive");
}

#[test]
fn refresh_bills_then_evaluates() {
    use finance_tracker_core::ledger::{Frequency, Subscription};

    let tracker = memory_tracker(day(2024, 3, 5));
    tracker
        .add_subscription(Subscription::new(
            "Music",
            9.0,
            Frequency::Monthly,
            PaymentMode::Upi,
            day(2024, 3, 1),
        ))
        .unwrap();

    let report = tracker.refresh().unwrap();
    assert!(report.billed);
    assert_eq!(report.new_achievements, vec![Achievement::FirstEntry]);
    assert!(!report.message.text.is_empty());

    let again = tracker.refresh().unwrap();
    assert!(!again.billed);
    assert!(again.new_achievements.is_empty());
}

#[test]
fn replacing_history_rebuilds_the_streak() {
    let tracker = memory_tracker(day(2024, 1, 10));
    let history = vec![
        Transaction::expense(1.0, day(2024, 1, 7), PaymentMode::Cash),
        Transaction::expense(1.0, day(2024, 1, 8), PaymentMode::Cash),
        Transaction::expense(1.0, day(2024, 1, 9), PaymentMode::Cash),
    ];
    let record = tracker.replace_transactions(history).unwrap();
    assert_eq!(record.current_streak, 3);
    assert_eq!(tracker.streak().unwrap(), record);
    assert_eq!(tracker.transactions().unwrap().len(), 3);
}

#[test]
fn editing_an_entry_keeps_the_streak() {
    let mut tracker = memory_tracker(day(2024, 6, 1));
    let first = tracker
        .add_transaction(Transaction::expense(10.0, day(2024, 6, 1), PaymentMode::Cash))
        .unwrap();
    tracker.set_clock(Box::new(FixedClock::new(day(2024, 6, 2))));
    tracker
        .add_transaction(Transaction::expense(4.0, day(2024, 6, 2), PaymentMode::Cash))
        .unwrap();
    let before = tracker.streak().unwrap();
    assert_eq!(before.current_streak, 2);

    let mut edited = first.clone();
    edited.amount = 12.0;
    edited.date = day(2024, 5, 20);
    tracker.edit_transaction(edited.clone()).unwrap();

    let stored = tracker.transactions().unwrap();
    assert_eq!(stored[0], edited);
    assert_eq!(tracker.streak().unwrap(), before);

    tracker.delete_transaction(first.id).unwrap();
    assert_eq!(tracker.transactions().unwrap().len(), 1);
    assert_eq!(tracker.streak().unwrap(), before);
}

#[test]
fn editing_or_deleting_unknown_entries_fails() {
    let tracker = memory_tracker(day(2024, 6, 1));
    let ghost = Transaction::income(5.0, day(2024, 6, 1), PaymentMode::Upi);

    assert!(matches!(
        tracker.edit_transaction(ghost.clone()),
        Err(TrackerError::NotFound(_))
    ));
    assert!(matches!(
        tracker.delete_transaction(ghost.id),
        Err(TrackerError::NotFound(_))
    ));

    let saved = tracker.add_transaction(ghost).unwrap();
    let mut invalid = saved.clone();
    invalid.amount = -1.0;
    assert!(matches!(
        tracker.edit_transaction(invalid),
        Err(TrackerError::InvalidInput(_))
    ));
    assert_eq!(tracker.transactions().unwrap(), vec![saved]);
}
