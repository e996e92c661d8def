//! One-shot achievements evaluated against a snapshot of engagement state.

use serde::{Deserialize, Serialize};

use super::goals::{CompletedGoalsFlags, GoalScope};

/// Every achievement the engine knows, in evaluation order. Identifiers are stable and
/// persisted; never rename one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Achievement {
    FirstEntry,
    TenEntries,
    FiftyEntries,
    HundredEntries,
    FiveHundredEntries,
    ThreeDayStreak,
    WeekStreak,
    MonthStreak,
    HundredDayStreak,
    PositiveBalance,
    Balance1k,
    Balance10k,
    Balance100k,
    MonthlySavingsGoal,
    YearlySavingsGoal,
    CustomSavingsGoal,
}

impl From<Achievement> for &'static str {
    fn from(achievement: Achievement) -> Self {
        achievement.id()
    }
}

/// Inputs every predicate is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngagementSnapshot {
    pub entry_count: usize,
    pub current_streak: u32,
    pub lifetime_balance: f64,
    pub monthly_savings_completed: bool,
    pub yearly_savings_completed: bool,
    pub custom_savings_completed: bool,
}

impl Achievement {
    pub const ALL: [Achievement; 16] = [
        Achievement::FirstEntry,
        Achievement::TenEntries,
        Achievement::FiftyEntries,
        Achievement::HundredEntries,
        Achievement::FiveHundredEntries,
        Achievement::ThreeDayStreak,
        Achievement::WeekStreak,
        Achievement::MonthStreak,
        Achievement::HundredDayStreak,
        Achievement::PositiveBalance,
        Achievement::Balance1k,
        Achievement::Balance10k,
        Achievement::Balance100k,
        Achievement::MonthlySavingsGoal,
        Achievement::YearlySavingsGoal,
        Achievement::CustomSavingsGoal,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Achievement::FirstEntry => "first_entry",
            Achievement::TenEntries => "entries_10",
            Achievement::FiftyEntries => "entries_50",
            Achievement::HundredEntries => "entries_100",
            Achievement::FiveHundredEntries => "entries_500",
            Achievement::ThreeDayStreak => "streak_3",
            Achievement::WeekStreak => "streak_7",
            Achievement::MonthStreak => "streak_30",
            Achievement::HundredDayStreak => "streak_100",
            Achievement::PositiveBalance => "balance_positive",
            Achievement::Balance1k => "balance_1000",
            Achievement::Balance10k => "balance_10000",
            Achievement::Balance100k => "balance_100000",
            Achievement::MonthlySavingsGoal => "goal_monthly",
            Achievement::YearlySavingsGoal => "goal_yearly",
            Achievement::CustomSavingsGoal => "goal_custom",
        }
    }

    pub fn from_id(id: &str) -> Option<Achievement> {
        Achievement::ALL.into_iter().find(|a| a.id() == id)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstEntry => "First Step",
            Achievement::TenEntries => "Getting Started",
            Achievement::FiftyEntries => "Habit Forming",
            Achievement::HundredEntries => "Centurion",
            Achievement::FiveHundredEntries => "Bookkeeper",
            Achievement::ThreeDayStreak => "On a Roll",
            Achievement::WeekStreak => "Week Warrior",
            Achievement::MonthStreak => "Monthly Master",
            Achievement::HundredDayStreak => "Unstoppable",
            Achievement::PositiveBalance => "In the Green",
            Achievement::Balance1k => "Four Figures",
            Achievement::Balance10k => "Five Figures",
            Achievement::Balance100k => "Six Figures",
            Achievement::MonthlySavingsGoal => "Monthly Saver",
            Achievement::YearlySavingsGoal => "Yearly Saver",
            Achievement::CustomSavingsGoal => "Goal Getter",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstEntry => "Recorded your first transaction",
            Achievement::TenEntries => "Recorded 10 transactions",
            Achievement::FiftyEntries => "Recorded 50 transactions",
            Achievement::HundredEntries => "Recorded 100 transactions",
            Achievement::FiveHundredEntries => "Recorded 500 transactions",
            Achievement::ThreeDayStreak => "Tracked spending 3 days in a row",
            Achievement::WeekStreak => "Tracked spending 7 days in a row",
            Achievement::MonthStreak => "Tracked spending 30 days in a row",
            Achievement::HundredDayStreak => "Tracked spending 100 days in a row",
            Achievement::PositiveBalance => "Earned more than you spent",
            Achievement::Balance1k => "Lifetime balance reached 1,000",
            Achievement::Balance10k => "Lifetime balance reached 10,000",
            Achievement::Balance100k => "Lifetime balance reached 100,000",
            Achievement::MonthlySavingsGoal => "Completed a monthly savings goal",
            Achievement::YearlySavingsGoal => "Completed a yearly savings goal",
            Achievement::CustomSavingsGoal => "Completed a custom savings goal",
        }
    }

    /// Scope whose completed-goal flag gates this achievement, if it is a goal one.
    pub fn goal_scope(&self) -> Option<GoalScope> {
        match self {
            Achievement::MonthlySavingsGoal => Some(GoalScope::Monthly),
            Achievement::YearlySavingsGoal => Some(GoalScope::Yearly),
            Achievement::CustomSavingsGoal => Some(GoalScope::Custom),
            _ => None,
        }
    }

    pub fn is_met(&self, snapshot: &EngagementSnapshot) -> bool {
        match self {
            Achievement::FirstEntry => snapshot.entry_count >= 1,
            Achievement::TenEntries => snapshot.entry_count >= 10,
            Achievement::FiftyEntries => snapshot.entry_count >= 50,
            Achievement::HundredEntries => snapshot.entry_count >= 100,
            Achievement::FiveHundredEntries => snapshot.entry_count >= 500,
            Achievement::ThreeDayStreak => snapshot.current_streak >= 3,
            Achievement::WeekStreak => snapshot.current_streak >= 7,
            Achievement::MonthStreak => snapshot.current_streak >= 30,
            Achievement::HundredDayStreak => snapshot.current_streak >= 100,
            Achievement::PositiveBalance => snapshot.lifetime_balance > 0.0,
            Achievement::Balance1k => snapshot.lifetime_balance >= 1_000.0,
            Achievement::Balance10k => snapshot.lifetime_balance >= 10_000.0,
            Achievement::Balance100k => snapshot.lifetime_balance >= 100_000.0,
            Achievement::MonthlySavingsGoal => snapshot.monthly_savings_completed,
            Achievement::YearlySavingsGoal => snapshot.yearly_savings_completed,
            Achievement::CustomSavingsGoal => snapshot.custom_savings_completed,
        }
    }
}

/// Append-only set of unlocked identifiers. Unknown identifiers written by other
/// versions are preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AchievementRegistry {
    unlocked: Vec<String>,
}

impl AchievementRegistry {
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = AchievementRegistry::default();
        for id in ids {
            registry.insert_id(id.into());
        }
        registry
    }

    pub fn contains(&self, achievement: Achievement) -> bool {
        self.unlocked.iter().any(|id| id == achievement.id())
    }

    /// Returns `true` when the identifier was not present before.
    pub fn insert(&mut self, achievement: Achievement) -> bool {
        self.insert_id(achievement.id().to_string())
    }

    fn insert_id(&mut self, id: String) -> bool {
        if self.unlocked.contains(&id) {
            return false;
        }
        self.unlocked.push(id);
        true
    }

    pub fn ids(&self) -> &[String] {
        &self.unlocked
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }
}

/// Result of one engine run: the updated state slices plus what fired this time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AchievementOutcome {
    pub registry: AchievementRegistry,
    pub flags: CompletedGoalsFlags,
    pub newly_unlocked: Vec<Achievement>,
}

impl AchievementOutcome {
    pub fn changed(&self) -> bool {
        !self.newly_unlocked.is_empty()
    }
}

/// Evaluates the battery. Ordinary achievements fire once, when first absent from the
/// registry. Goal achievements are gated by their completed-goal flag instead, so
/// they fire again after the flag is reset for a new target; the registry still
/// holds each identifier at most once.
pub fn evaluate_achievements(
    snapshot: &EngagementSnapshot,
    registry: &AchievementRegistry,
    flags: &CompletedGoalsFlags,
) -> AchievementOutcome {
    let mut outcome = AchievementOutcome {
        registry: registry.clone(),
        flags: *flags,
        newly_unlocked: Vec::new(),
    };

    for achievement in Achievement::ALL {
        let eligible = match achievement.goal_scope() {
            Some(scope) => !outcome.flags.is_set(scope),
            None => !outcome.registry.contains(achievement),
        };
        if !eligible || !achievement.is_met(snapshot) {
            continue;
        }
        if let Some(scope) = achievement.goal_scope() {
            outcome.flags.mark(scope);
        }
        outcome.registry.insert(achievement);
        outcome.newly_unlocked.push(achievement);
    }

    outcome
}
