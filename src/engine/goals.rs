//! Goal targets and progress under savings (reach-or-exceed) and expense-limit
//! (stay-under) semantics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::{filter_window, DateWindow, Period, Totals, Transaction, WeekStart};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GoalScope {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl GoalScope {
    pub const ALL: [GoalScope; 5] = [
        GoalScope::Daily,
        GoalScope::Weekly,
        GoalScope::Monthly,
        GoalScope::Yearly,
        GoalScope::Custom,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(GoalScope::Daily),
            "weekly" => Some(GoalScope::Weekly),
            "monthly" => Some(GoalScope::Monthly),
            "yearly" => Some(GoalScope::Yearly),
            "custom" => Some(GoalScope::Custom),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GoalScope::Daily => "Daily",
            GoalScope::Weekly => "Weekly",
            GoalScope::Monthly => "Monthly",
            GoalScope::Yearly => "Yearly",
            GoalScope::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Savings,
    Expense,
}

impl GoalCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "savings" | "saving" => Some(GoalCategory::Savings),
            "expense" | "expenses" | "limit" => Some(GoalCategory::Expense),
            _ => None,
        }
    }
}

/// Target amounts for one scope. Zero means "not set".
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GoalTargets {
    #[serde(default)]
    pub savings: f64,
    #[serde(default)]
    pub expense: f64,
}

impl GoalTargets {
    pub fn get(&self, category: GoalCategory) -> f64 {
        match category {
            GoalCategory::Savings => self.savings,
            GoalCategory::Expense => self.expense,
        }
    }

    fn set(&mut self, category: GoalCategory, amount: f64) {
        match category {
            GoalCategory::Savings => self.savings = amount,
            GoalCategory::Expense => self.expense = amount,
        }
    }
}

/// The user-defined goal window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomGoal {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub range: Option<DateWindow>,
    #[serde(default)]
    pub targets: GoalTargets,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoalConfig {
    #[serde(default)]
    pub daily: GoalTargets,
    #[serde(default)]
    pub weekly: GoalTargets,
    #[serde(default)]
    pub monthly: GoalTargets,
    #[serde(default)]
    pub yearly: GoalTargets,
    #[serde(default)]
    pub custom: CustomGoal,
}

impl GoalConfig {
    fn targets(&self, scope: GoalScope) -> &GoalTargets {
        match scope {
            GoalScope::Daily => &self.daily,
            GoalScope::Weekly => &self.weekly,
            GoalScope::Monthly => &self.monthly,
            GoalScope::Yearly => &self.yearly,
            GoalScope::Custom => &self.custom.targets,
        }
    }

    fn targets_mut(&mut self, scope: GoalScope) -> &mut GoalTargets {
        match scope {
            GoalScope::Daily => &mut self.daily,
            GoalScope::Weekly => &mut self.weekly,
            GoalScope::Monthly => &mut self.monthly,
            GoalScope::Yearly => &mut self.yearly,
            GoalScope::Custom => &mut self.custom.targets,
        }
    }

    /// Configured target, or 0 when the goal is not set. A custom goal without a
    /// date range is treated as not set.
    pub fn target(&self, scope: GoalScope, category: GoalCategory) -> f64 {
        if scope == GoalScope::Custom && self.custom.range.is_none() {
            return 0.0;
        }
        self.targets(scope).get(category)
    }

    /// Stores a new target and reports whether it differs from the previous one.
    /// Amounts are validated by the caller.
    pub fn set_target(&mut self, scope: GoalScope, category: GoalCategory, amount: f64) -> bool {
        let targets = self.targets_mut(scope);
        let changed = targets.get(category) != amount;
        targets.set(category, amount);
        changed
    }

    /// Classifier window for the scope; `None` for a custom goal without a range.
    pub fn period(&self, scope: GoalScope) -> Option<Period> {
        match scope {
            GoalScope::Daily => Some(Period::Daily),
            GoalScope::Weekly => Some(Period::Weekly),
            GoalScope::Monthly => Some(Period::Monthly),
            GoalScope::Yearly => Some(Period::Yearly),
            GoalScope::Custom => self.custom.range.map(|range| Period::Custom {
                start: range.start,
                end: range.end,
            }),
        }
    }
}

/// Per-scope markers recording that the savings-goal achievement already fired for
/// the current target. Daily and weekly goals never grant achievements.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletedGoalsFlags {
    #[serde(default)]
    pub monthly: bool,
    #[serde(default)]
    pub yearly: bool,
    #[serde(default)]
    pub custom: bool,
}

impl CompletedGoalsFlags {
    pub fn is_set(&self, scope: GoalScope) -> bool {
        match scope {
            GoalScope::Monthly => self.monthly,
            GoalScope::Yearly => self.yearly,
            GoalScope::Custom => self.custom,
            GoalScope::Daily | GoalScope::Weekly => false,
        }
    }

    pub fn mark(&mut self, scope: GoalScope) {
        self.assign(scope, true);
    }

    pub fn reset(&mut self, scope: GoalScope) {
        self.assign(scope, false);
    }

    fn assign(&mut self, scope: GoalScope, value: bool) {
        match scope {
            GoalScope::Monthly => self.monthly = value,
            GoalScope::Yearly => self.yearly = value,
            GoalScope::Custom => self.custom = value,
            GoalScope::Daily | GoalScope::Weekly => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub scope: GoalScope,
    pub category: GoalCategory,
    pub current_value: f64,
    pub target_goal: f64,
    pub progress: f64,
    pub remaining: f64,
    pub is_completed: bool,
    pub is_over_limit: bool,
}

impl GoalProgress {
    /// Goals without a target are hidden and never count as completed.
    pub fn is_configured(&self) -> bool {
        self.target_goal > 0.0
    }
}

pub fn calculate_goal_progress(
    scope: GoalScope,
    category: GoalCategory,
    transactions: &[Transaction],
    config: &GoalConfig,
    today: NaiveDate,
    week_start: WeekStart,
) -> GoalProgress {
    let totals = match config.period(scope) {
        Some(period) => {
            Totals::from_transactions(filter_window(transactions, period.window(today, week_start)))
        }
        None => Totals::default(),
    };
    let current_value = match category {
        GoalCategory::Savings => totals.balance,
        GoalCategory::Expense => totals.expense,
    };
    evaluate(scope, category, current_value, config.target(scope, category))
}

fn evaluate(
    scope: GoalScope,
    category: GoalCategory,
    current_value: f64,
    target_goal: f64,
) -> GoalProgress {
    let configured = target_goal > 0.0;
    let progress = if configured {
        (current_value / target_goal * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    let remaining = (target_goal - current_value).max(0.0);
    let (is_completed, is_over_limit) = match category {
        GoalCategory::Savings => (configured && current_value >= target_goal, false),
        GoalCategory::Expense => (
            configured && current_value <= target_goal,
            configured && current_value > target_goal,
        ),
    };
    GoalProgress {
        scope,
        category,
        current_value,
        target_goal,
        progress,
        remaining,
        is_completed,
        is_over_limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::PaymentMode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config_with(scope: GoalScope, category: GoalCategory, amount: f64) -> GoalConfig {
        let mut config = GoalConfig::default();
        config.set_target(scope, category, amount);
        config
    }

    #[test]
    fn expense_limit_under_budget_is_completed() {
        let today = date(2024, 6, 15);
        let txns = vec![Transaction::expense(800.0, date(2024, 6, 3), PaymentMode::Upi)];
        let config = config_with(GoalScope::Monthly, GoalCategory::Expense, 1000.0);
        let progress = calculate_goal_progress(
            GoalScope::Monthly,
            GoalCategory::Expense,
            &txns,
            &config,
            today,
            WeekStart::Monday,
        );
        assert!(progress.is_completed);
        assert!(!progress.is_over_limit);
        assert_eq!(progress.progress, 80.0);
        assert_eq!(progress.remaining, 200.0);
    }

    #[test]
    fn expense_limit_over_budget_clamps_progress() {
        let today = date(2024, 6, 15);
        let txns = vec![Transaction::expense(1200.0, date(2024, 6, 3), PaymentMode::Cash)];
        let config = config_with(GoalScope::Monthly, GoalCategory::Expense, 1000.0);
        let progress = calculate_goal_progress(
            GoalScope::Monthly,
            GoalCategory::Expense,
            &txns,
            &config,
            today,
            WeekStart::Monday,
        );
        assert!(!progress.is_completed);
        assert!(progress.is_over_limit);
        assert_eq!(progress.progress, 100.0);
        assert_eq!(progress.remaining, 0.0);
    }

    #[test]
    fn savings_goal_reached_exactly_is_completed() {
        let today = date(2024, 6, 15);
        let txns = vec![
            Transaction::income(700.0, date(2024, 6, 1), PaymentMode::Upi),
            Transaction::expense(200.0, date(2024, 6, 2), PaymentMode::Upi),
        ];
        let config = config_with(GoalScope::Monthly, GoalCategory::Savings, 500.0);
        let progress = calculate_goal_progress(
            GoalScope::Monthly,
            GoalCategory::Savings,
            &txns,
            &config,
            today,
            WeekStart::Monday,
        );
        assert_eq!(progress.current_value, 500.0);
        assert!(progress.is_completed);
        assert!(!progress.is_over_limit);
    }

    #[test]
    fn unset_target_is_never_completed() {
        let today = date(2024, 6, 15);
        let txns = vec![Transaction::income(5000.0, date(2024, 6, 1), PaymentMode::Upi)];
        let config = GoalConfig::default();
        for category in [GoalCategory::Savings, GoalCategory::Expense] {
            let progress = calculate_goal_progress(
                GoalScope::Monthly,
                category,
                &txns,
                &config,
                today,
                WeekStart::Monday,
            );
            assert!(!progress.is_completed);
            assert!(!progress.is_over_limit);
            assert_eq!(progress.progress, 0.0);
            assert!(!progress.is_configured());
        }
    }

    #[test]
    fn negative_savings_progress_floors_at_zero() {
        let today = date(2024, 6, 15);
        let txns = vec![Transaction::expense(50.0, date(2024, 6, 15), PaymentMode::Upi)];
        let config = config_with(GoalScope::Daily, GoalCategory::Savings, 100.0);
        let progress = calculate_goal_progress(
            GoalScope::Daily,
            GoalCategory::Savings,
            &txns,
            &config,
            today,
            WeekStart::Monday,
        );
        assert_eq!(progress.current_value, -50.0);
        assert_eq!(progress.progress, 0.0);
        assert_eq!(progress.remaining, 150.0);
    }

    #[test]
    fn scope_window_excludes_other_periods() {
        let today = date(2024, 6, 15);
        let txns = vec![
            Transaction::expense(300.0, date(2024, 5, 31), PaymentMode::Upi),
            Transaction::expense(100.0, date(2024, 6, 1), PaymentMode::Upi),
        ];
        let config = config_with(GoalScope::Monthly, GoalCategory::Expense, 250.0);
        let monthly = calculate_goal_progress(
            GoalScope::Monthly,
            GoalCategory::Expense,
            &txns,
            &config,
            today,
            WeekStart::Monday,
        );
        assert_eq!(monthly.current_value, 100.0);
    }

    #[test]
    fn custom_goal_requires_a_range() {
        let today = date(2024, 6, 15);
        let txns = vec![Transaction::income(900.0, date(2024, 2, 10), PaymentMode::Upi)];
        let mut config = config_with(GoalScope::Custom, GoalCategory::Savings, 500.0);
        let unset = calculate_goal_progress(
            GoalScope::Custom,
            GoalCategory::Savings,
            &txns,
            &config,
            today,
            WeekStart::Monday,
        );
        assert_eq!(unset.target_goal, 0.0);
        assert!(!unset.is_completed);

        config.custom.range = Some(DateWindow::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap());
        let set = calculate_goal_progress(
            GoalScope::Custom,
            GoalCategory::Savings,
            &txns,
            &config,
            today,
            WeekStart::Monday,
        );
        assert_eq!(set.current_value, 900.0);
        assert!(set.is_completed);
    }

    #[test]
    fn completed_flags_ignore_daily_and_weekly() {
        let mut flags = CompletedGoalsFlags::default();
        flags.mark(GoalScope::Daily);
        flags.mark(GoalScope::Yearly);
        assert!(!flags.is_set(GoalScope::Daily));
        assert!(flags.is_set(GoalScope::Yearly));
        flags.reset(GoalScope::Yearly);
        assert!(!flags.is_set(GoalScope::Yearly));
    }

    #[test]
    fn set_target_reports_changes() {
        let mut config = GoalConfig::default();
        assert!(config.set_target(GoalScope::Weekly, GoalCategory::Expense, 70.0));
        assert!(!config.set_target(GoalScope::Weekly, GoalCategory::Expense, 70.0));
        assert_eq!(config.target(GoalScope::Weekly, GoalCategory::Expense), 70.0);
    }
}
