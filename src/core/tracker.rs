use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::Config,
    engine::{
        calculate_goal_progress, evaluate_achievements, messages, process_due_subscriptions,
        upcoming_charges, Achievement, BillingRun, Clock, EngagementSnapshot, GoalCategory,
        GoalConfig, GoalProgress, GoalScope, MessageSignals, MessageTemplate, Picker,
        StreakRecord, SystemClock, ThreadRngPicker, UpcomingCharge,
    },
    errors::{Result, TrackerError},
    ledger::{DateWindow, Period, Subscription, Totals, Transaction},
    storage::StorageBackend,
};

/// Result of an achievement check: what fired now plus everything unlocked so far.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AchievementCheck {
    pub new_achievements: Vec<Achievement>,
    pub all_achievements: Vec<String>,
}

/// Outcome of the screen-focus pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub billed: bool,
    pub new_achievements: Vec<Achievement>,
    pub message: MessageTemplate,
}

/// Facade over the engine. Every operation loads the slices it needs, runs the pure
/// computation, and writes back what changed.
pub struct Tracker {
    storage: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
    config: Config,
}

impl Tracker {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            storage,
            clock: Box::new(SystemClock),
            config: Config::default(),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // --- transactions -------------------------------------------------------

    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        self.storage.load_transactions()
    }

    /// Persists a user entry. Entries other than balance adjustments also advance the
    /// activity streak.
    pub fn add_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        transaction.validate()?;
        let saved = self.storage.append_transaction(transaction)?;
        if saved.counts_toward_streak() {
            self.update_streak()?;
        }
        Ok(saved)
    }

    /// Replaces the stored transaction with the same id. The streak is not revisited.
    pub fn edit_transaction(&self, transaction: Transaction) -> Result<()> {
        transaction.validate()?;
        let mut transactions = self.storage.load_transactions()?;
        let slot = transactions
            .iter_mut()
            .find(|txn| txn.id == transaction.id)
            .ok_or_else(|| TrackerError::NotFound(format!("transaction {}", transaction.id)))?;
        *slot = transaction;
        self.storage.save_transactions(&transactions)
    }

    pub fn delete_transaction(&self, id: Uuid) -> Result<Transaction> {
        let mut transactions = self.storage.load_transactions()?;
        let index = transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or_else(|| TrackerError::NotFound(format!("transaction {id}")))?;
        let removed = transactions.remove(index);
        self.storage.save_transactions(&transactions)?;
        Ok(removed)
    }

    /// Bulk replace, as done by an import. The streak is rebuilt from the new history.
    pub fn replace_transactions(&self, transactions: Vec<Transaction>) -> Result<StreakRecord> {
        for txn in &transactions {
            txn.validate()?;
        }
        self.storage.save_transactions(&transactions)?;
        let record = StreakRecord::rebuild(
            transactions
                .iter()
                .filter(|txn| txn.counts_toward_streak())
                .map(|txn| txn.date),
        );
        self.storage.save_streak(&record)?;
        tracing::info!(
            count = transactions.len(),
            current_streak = record.current_streak,
            "transactions replaced"
        );
        Ok(record)
    }

    // --- subscriptions ------------------------------------------------------

    pub fn subscriptions(&self) -> Result<Vec<Subscription>> {
        self.storage.load_subscriptions()
    }

    pub fn add_subscription(&self, subscription: Subscription) -> Result<Subscription> {
        subscription.validate()?;
        let mut subscriptions = self.storage.load_subscriptions()?;
        subscriptions.push(subscription.clone());
        self.storage.save_subscriptions(&subscriptions)?;
        Ok(subscription)
    }

    pub fn update_subscription(&self, subscription: Subscription) -> Result<()> {
        subscription.validate()?;
        self.modify_subscription(subscription.id, |slot| *slot = subscription.clone())
    }

    pub fn set_subscription_active(&self, id: Uuid, active: bool) -> Result<()> {
        self.modify_subscription(id, |slot| slot.is_active = active)
    }

    pub fn delete_subscription(&self, id: Uuid) -> Result<Subscription> {
        let mut subscriptions = self.storage.load_subscriptions()?;
        let index = subscriptions
            .iter()
            .position(|sub| sub.id == id)
            .ok_or_else(|| TrackerError::NotFound(format!("subscription {id}")))?;
        let removed = subscriptions.remove(index);
        self.storage.save_subscriptions(&subscriptions)?;
        Ok(removed)
    }

    fn modify_subscription<F>(&self, id: Uuid, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut Subscription),
    {
        let mut subscriptions = self.storage.load_subscriptions()?;
        let slot = subscriptions
            .iter_mut()
            .find(|sub| sub.id == id)
            .ok_or_else(|| TrackerError::NotFound(format!("subscription {id}")))?;
        mutator(slot);
        self.storage.save_subscriptions(&subscriptions)
    }

    /// Catches subscriptions up to today. Returns whether any charge was created.
    pub fn process_recurring_expenses(&self) -> Result<bool> {
        Ok(self.process_recurring_report()?.changed())
    }

    /// Same as [`Tracker::process_recurring_expenses`] but returns the full run,
    /// including the warnings for skipped subscriptions.
    pub fn process_recurring_report(&self) -> Result<BillingRun> {
        let subscriptions = self.storage.load_subscriptions()?;
        let run = process_due_subscriptions(&subscriptions, self.today());
        for warning in &run.warnings {
            tracing::warn!(%warning, "subscription skipped during catch-up");
        }
        if run.changed() {
            self.storage
                .commit_billing(&run.transactions, &run.subscriptions)?;
            tracing::info!(charges = run.transactions.len(), "recurring expenses caught up");
        }
        Ok(run)
    }

    pub fn upcoming_subscriptions(&self, within_days: Option<i64>) -> Result<Vec<UpcomingCharge>> {
        let subscriptions = self.storage.load_subscriptions()?;
        let window = within_days.unwrap_or(self.config.reminder_window_days);
        Ok(upcoming_charges(&subscriptions, self.today(), Some(window)))
    }

    // --- streak -------------------------------------------------------------

    pub fn streak(&self) -> Result<StreakRecord> {
        self.storage.load_streak()
    }

    /// Records activity for today. Repeated calls on the same day are no-ops.
    pub fn update_streak(&self) -> Result<StreakRecord> {
        let current = self.storage.load_streak()?;
        let next = current.record_activity(self.today());
        if next != current {
            self.storage.save_streak(&next)?;
        }
        Ok(next)
    }

    // --- goals --------------------------------------------------------------

    pub fn goal_config(&self) -> Result<GoalConfig> {
        self.storage.load_goal_config()
    }

    pub fn calculate_goal_progress(
        &self,
        scope: GoalScope,
        category: GoalCategory,
    ) -> Result<GoalProgress> {
        let transactions = self.storage.load_transactions()?;
        let config = self.storage.load_goal_config()?;
        Ok(self.progress_for(scope, category, &transactions, &config))
    }

    /// Progress for every configured goal; goals without a target are omitted.
    pub fn visible_goals(&self) -> Result<Vec<GoalProgress>> {
        let transactions = self.storage.load_transactions()?;
        let config = self.storage.load_goal_config()?;
        let mut goals = Vec::new();
        for scope in GoalScope::ALL {
            for category in [GoalCategory::Savings, GoalCategory::Expense] {
                let progress = self.progress_for(scope, category, &transactions, &config);
                if progress.is_configured() {
                    goals.push(progress);
                }
            }
        }
        Ok(goals)
    }

    /// Stores a target (0 clears it). Changing a savings target re-arms that scope's
    /// goal achievement.
    pub fn set_goal_target(
        &self,
        scope: GoalScope,
        category: GoalCategory,
        amount: f64,
    ) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(TrackerError::InvalidInput(format!(
                "goal amount must be zero or positive, got {amount}"
            )));
        }
        let mut config = self.storage.load_goal_config()?;
        let changed = config.set_target(scope, category, amount);
        if !changed {
            return Ok(());
        }
        self.storage.save_goal_config(&config)?;
        if category == GoalCategory::Savings {
            self.reset_completed_goal(scope)?;
        }
        Ok(())
    }

    /// Sets the custom goal's label and inclusive date range.
    pub fn set_custom_goal(
        &self,
        label: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<()> {
        let range = DateWindow::new(start, end)?;
        let mut config = self.storage.load_goal_config()?;
        config.custom.label = label.into();
        let range_changed = config.custom.range != Some(range);
        config.custom.range = Some(range);
        self.storage.save_goal_config(&config)?;
        if range_changed {
            self.reset_completed_goal(GoalScope::Custom)?;
        }
        Ok(())
    }

    fn reset_completed_goal(&self, scope: GoalScope) -> Result<()> {
        let mut flags = self.storage.load_completed_goals()?;
        if flags.is_set(scope) {
            flags.reset(scope);
            self.storage.save_completed_goals(&flags)?;
        }
        Ok(())
    }

    fn progress_for(
        &self,
        scope: GoalScope,
        category: GoalCategory,
        transactions: &[Transaction],
        config: &GoalConfig,
    ) -> GoalProgress {
        calculate_goal_progress(
            scope,
            category,
            transactions,
            config,
            self.today(),
            self.config.week_start,
        )
    }

    // --- summaries ----------------------------------------------------------

    pub fn summary(&self, period: Period) -> Result<Totals> {
        let transactions = self.storage.load_transactions()?;
        let window = period.window(self.today(), self.config.week_start);
        Ok(Totals::from_transactions(
            transactions.iter().filter(|txn| window.contains(txn.date)),
        ))
    }

    pub fn lifetime_totals(&self) -> Result<Totals> {
        Ok(Totals::from_transactions(&self.storage.load_transactions()?))
    }

    // --- achievements and messages -----------------------------------------

    pub fn check_achievements(&self) -> Result<AchievementCheck> {
        let transactions = self.storage.load_transactions()?;
        let goals = self.storage.load_goal_config()?;
        let streak = self.storage.load_streak()?;
        let registry = self.storage.load_achievements()?;
        let flags = self.storage.load_completed_goals()?;

        let savings_done = |scope| {
            self.progress_for(scope, GoalCategory::Savings, &transactions, &goals)
                .is_completed
        };
        let snapshot = EngagementSnapshot {
            entry_count: entry_count(&transactions),
            current_streak: streak.current_streak,
            lifetime_balance: Totals::from_transactions(&transactions).balance,
            monthly_savings_completed: savings_done(GoalScope::Monthly),
            yearly_savings_completed: savings_done(GoalScope::Yearly),
            custom_savings_completed: savings_done(GoalScope::Custom),
        };

        let outcome = evaluate_achievements(&snapshot, &registry, &flags);
        if outcome.changed() {
            // Registry first: a crash before the flag write re-fires instead of losing.
            self.storage.save_achievements(&outcome.registry)?;
            if outcome.flags != flags {
                self.storage.save_completed_goals(&outcome.flags)?;
            }
            for achievement in &outcome.newly_unlocked {
                tracing::info!(id = achievement.id(), "achievement unlocked");
            }
        }

        Ok(AchievementCheck {
            new_achievements: outcome.newly_unlocked,
            all_achievements: outcome.registry.ids().to_vec(),
        })
    }

    pub fn motivational_message(&self) -> Result<MessageTemplate> {
        self.motivational_message_with(&mut ThreadRngPicker)
    }

    pub fn motivational_message_with(&self, picker: &mut dyn Picker) -> Result<MessageTemplate> {
        let transactions = self.storage.load_transactions()?;
        let goals = self.storage.load_goal_config()?;
        let streak = self.storage.load_streak()?;
        let monthly = self.progress_for(
            GoalScope::Monthly,
            GoalCategory::Savings,
            &transactions,
            &goals,
        );
        let signals = MessageSignals {
            current_streak: streak.effective_current(self.today()),
            monthly_goal_progress: monthly.is_configured().then_some(monthly.progress),
            lifetime_balance: Totals::from_transactions(&transactions).balance,
            entry_count: entry_count(&transactions),
        };
        Ok(messages::select_message(&signals, picker))
    }

    /// Screen-focus pipeline: catch-up billing, achievements, then a message.
    pub fn refresh(&self) -> Result<RefreshReport> {
        let billed = self.process_recurring_expenses()?;
        let check = self.check_achievements()?;
        let message = self.motivational_message()?;
        Ok(RefreshReport {
            billed,
            new_achievements: check.new_achievements,
            message,
        })
    }
}

/// User entries; balance adjustments are bookkeeping, not entries.
fn entry_count(transactions: &[Transaction]) -> usize {
    transactions
        .iter()
        .filter(|txn| txn.counts_toward_streak())
        .count()
}
