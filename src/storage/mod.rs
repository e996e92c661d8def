//! Persistence slots. Each entity has its own typed accessor pair; there are no
//! caller-visible string keys.

pub mod json_backend;
pub mod memory;

use crate::{
    engine::{AchievementRegistry, CompletedGoalsFlags, GoalConfig, StreakRecord},
    errors::Result,
    ledger::{Subscription, Transaction},
};

/// Abstraction over durable key-value backends. Writes to different slots are
/// independent; only `commit_billing` spans transactions and subscriptions.
pub trait StorageBackend: Send + Sync {
    fn load_transactions(&self) -> Result<Vec<Transaction>>;
    /// Persists one transaction, assigning an id when it has none.
    fn append_transaction(&self, transaction: Transaction) -> Result<Transaction>;
    fn save_transactions(&self, transactions: &[Transaction]) -> Result<()>;

    fn load_subscriptions(&self) -> Result<Vec<Subscription>>;
    fn save_subscriptions(&self, subscriptions: &[Subscription]) -> Result<()>;

    /// Appends catch-up charges and replaces the subscription list in one atomic
    /// write.
    fn commit_billing(&self, charges: &[Transaction], subscriptions: &[Subscription])
        -> Result<()>;

    fn load_streak(&self) -> Result<StreakRecord>;
    fn save_streak(&self, record: &StreakRecord) -> Result<()>;

    fn load_achievements(&self) -> Result<AchievementRegistry>;
    fn save_achievements(&self, registry: &AchievementRegistry) -> Result<()>;

    fn load_goal_config(&self) -> Result<GoalConfig>;
    fn save_goal_config(&self, config: &GoalConfig) -> Result<()>;

    fn load_completed_goals(&self) -> Result<CompletedGoalsFlags>;
    fn save_completed_goals(&self, flags: &CompletedGoalsFlags) -> Result<()>;
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
