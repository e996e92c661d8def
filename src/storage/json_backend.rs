use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use uuid::Uuid;

use crate::{
    engine::{AchievementRegistry, CompletedGoalsFlags, GoalConfig, StreakRecord},
    errors::{Result, TrackerError},
    ledger::{Subscription, Transaction},
    utils::paths::{app_data_dir, ensure_dir},
};

use super::StorageBackend;

const TMP_SUFFIX: &str = "tmp";
pub const LEDGER_SCHEMA_VERSION: u8 = 1;

/// Files backing each slot. Transactions and subscriptions share one file so a
/// billing catch-up lands in a single rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Ledger,
    Streak,
    Achievements,
    Goals,
    CompletedGoals,
}

impl Slot {
    fn file_name(&self) -> &'static str {
        match self {
            Slot::Ledger => "ledger.json",
            Slot::Streak => "streak.json",
            Slot::Achievements => "achievements.json",
            Slot::Goals => "goals.json",
            Slot::CompletedGoals => "completed_goals.json",
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    schema_version: u8,
    #[serde(default)]
    transactions: Vec<Value>,
    #[serde(default)]
    subscriptions: Vec<Value>,
}

/// Stored records that failed to decode. They are kept verbatim and written back
/// on every ledger write, so a skipped record is never lost.
#[derive(Debug, Default)]
struct Unreadable {
    transactions: Vec<Value>,
    subscriptions: Vec<Value>,
}

struct LedgerContents {
    transactions: Vec<Transaction>,
    subscriptions: Vec<Subscription>,
    unreadable: Unreadable,
}

/// File-per-slot JSON store rooted at the application data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(app_data_dir);
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: Slot) -> PathBuf {
        self.root.join(slot.file_name())
    }

    fn read_slot<T: DeserializeOwned + Default>(&self, slot: Slot) -> Result<T> {
        let path = self.slot_path(slot);
        if !path.exists() {
            return Ok(T::default());
        }
        let data = fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&data)?)
    }

    fn write_slot<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        write_atomic(&self.slot_path(slot), &json)
    }

    fn read_ledger(&self) -> Result<LedgerContents> {
        let file: LedgerFile = self.read_slot(Slot::Ledger)?;
        if file.schema_version > LEDGER_SCHEMA_VERSION {
            return Err(TrackerError::Storage(format!(
                "ledger file is from a newer schema version ({})",
                file.schema_version
            )));
        }
        let (transactions, unreadable_transactions) =
            decode_records(file.transactions, "transaction");
        let (subscriptions, unreadable_subscriptions) =
            decode_records(file.subscriptions, "subscription");
        Ok(LedgerContents {
            transactions,
            subscriptions,
            unreadable: Unreadable {
                transactions: unreadable_transactions,
                subscriptions: unreadable_subscriptions,
            },
        })
    }

    fn write_ledger(
        &self,
        transactions: &[Transaction],
        subscriptions: &[Subscription],
        unreadable: Unreadable,
    ) -> Result<()> {
        let file = LedgerFile {
            schema_version: LEDGER_SCHEMA_VERSION,
            transactions: encode_records(transactions, unreadable.transactions)?,
            subscriptions: encode_records(subscriptions, unreadable.subscriptions)?,
        };
        self.write_slot(Slot::Ledger, &file)
    }
}

impl StorageBackend for JsonStorage {
    fn load_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.read_ledger()?.transactions)
    }

    fn append_transaction(&self, mut transaction: Transaction) -> Result<Transaction> {
        if transaction.id.is_nil() {
            transaction.id = Uuid::now_v7();
        }
        let mut ledger = self.read_ledger()?;
        ledger.transactions.push(transaction.clone());
        self.write_ledger(&ledger.transactions, &ledger.subscriptions, ledger.unreadable)?;
        Ok(transaction)
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        let ledger = self.read_ledger()?;
        self.write_ledger(transactions, &ledger.subscriptions, ledger.unreadable)
    }

    fn load_subscriptions(&self) -> Result<Vec<Subscription>> {
        Ok(self.read_ledger()?.subscriptions)
    }

    fn save_subscriptions(&self, subscriptions: &[Subscription]) -> Result<()> {
        let ledger = self.read_ledger()?;
        self.write_ledger(&ledger.transactions, subscriptions, ledger.unreadable)
    }

    fn commit_billing(&self, charges: &[Transaction], subscriptions: &[Subscription]) -> Result<()> {
        let mut ledger = self.read_ledger()?;
        ledger.transactions.extend_from_slice(charges);
        self.write_ledger(&ledger.transactions, subscriptions, ledger.unreadable)
    }

    fn load_streak(&self) -> Result<StreakRecord> {
        self.read_slot(Slot::Streak)
    }

    fn save_streak(&self, record: &StreakRecord) -> Result<()> {
        self.write_slot(Slot::Streak, record)
    }

    fn load_achievements(&self) -> Result<AchievementRegistry> {
        self.read_slot(Slot::Achievements)
    }

    fn save_achievements(&self, registry: &AchievementRegistry) -> Result<()> {
        self.write_slot(Slot::Achievements, registry)
    }

    fn load_goal_config(&self) -> Result<GoalConfig> {
        self.read_slot(Slot::Goals)
    }

    fn save_goal_config(&self, config: &GoalConfig) -> Result<()> {
        self.write_slot(Slot::Goals, config)
    }

    fn load_completed_goals(&self) -> Result<CompletedGoalsFlags> {
        self.read_slot(Slot::CompletedGoals)
    }

    fn save_completed_goals(&self, flags: &CompletedGoalsFlags) -> Result<()> {
        self.write_slot(Slot::CompletedGoals, flags)
    }
}

/// Decodes a stored list record by record. Unreadable records are returned
/// separately, untouched.
fn decode_records<T: DeserializeOwned>(raw: Vec<Value>, kind: &str) -> (Vec<T>, Vec<Value>) {
    let mut records = Vec::with_capacity(raw.len());
    let mut unreadable = Vec::new();
    for (index, value) in raw.into_iter().enumerate() {
        match T::deserialize(&value) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping malformed {kind} record");
                unreadable.push(value);
            }
        }
    }
    (records, unreadable)
}

fn encode_records<T: Serialize>(records: &[T], unreadable: Vec<Value>) -> Result<Vec<Value>> {
    let mut encoded = records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    encoded.extend(unreadable);
    Ok(encoded)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Stages `data` next to `path` and renames it into place.
fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
