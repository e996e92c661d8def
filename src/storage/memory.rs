use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::{
    engine::{AchievementRegistry, CompletedGoalsFlags, GoalConfig, StreakRecord},
    errors::{Result, TrackerError},
    ledger::{Subscription, Transaction},
};

use super::StorageBackend;

#[derive(Debug, Default, Clone)]
struct Slots {
    transactions: Vec<Transaction>,
    subscriptions: Vec<Subscription>,
    streak: StreakRecord,
    achievements: AchievementRegistry,
    goals: GoalConfig,
    completed_goals: CompletedGoalsFlags,
}

/// Volatile store for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<Slots>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> Result<MutexGuard<'_, Slots>> {
        self.slots
            .lock()
            .map_err(|_| TrackerError::Storage("memory store lock poisoned".into()))
    }
}

impl StorageBackend for MemoryStorage {
    fn load_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.slots()?.transactions.clone())
    }

    fn append_transaction(&self, mut transaction: Transaction) -> Result<Transaction> {
        if transaction.id.is_nil() {
            transaction.id = Uuid::now_v7();
        }
        self.slots()?.transactions.push(transaction.clone());
        Ok(transaction)
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        self.slots()?.transactions = transactions.to_vec();
        Ok(())
    }

    fn load_subscriptions(&self) -> Result<Vec<Subscription>> {
        Ok(self.slots()?.subscriptions.clone())
    }

    fn save_subscriptions(&self, subscriptions: &[Subscription]) -> Result<()> {
        self.slots()?.subscriptions = subscriptions.to_vec();
        Ok(())
    }

    fn commit_billing(&self, charges: &[Transaction], subscriptions: &[Subscription]) -> Result<()> {
        let mut slots = self.slots()?;
        slots.transactions.extend_from_slice(charges);
        slots.subscriptions = subscriptions.to_vec();
        Ok(())
    }

    fn load_streak(&self) -> Result<StreakRecord> {
        Ok(self.slots()?.streak)
    }

    fn save_streak(&self, record: &StreakRecord) -> Result<()> {
        self.slots()?.streak = *record;
        Ok(())
    }

    fn load_achievements(&self) -> Result<AchievementRegistry> {
        Ok(self.slots()?.achievements.clone())
    }

    fn save_achievements(&self, registry: &AchievementRegistry) -> Result<()> {
        self.slots()?.achievements = registry.clone();
        Ok(())
    }

    fn load_goal_config(&self) -> Result<GoalConfig> {
        Ok(self.slots()?.goals.clone())
    }

    fn save_goal_config(&self, config: &GoalConfig) -> Result<()> {
        self.slots()?.goals = config.clone();
        Ok(())
    }

    fn load_completed_goals(&self) -> Result<CompletedGoalsFlags> {
        Ok(self.slots()?.completed_goals)
    }

    fn save_completed_goals(&self, flags: &CompletedGoalsFlags) -> Result<()> {
        self.slots()?.completed_goals = *flags;
        Ok(())
    }
}
