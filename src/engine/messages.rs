use rand::Rng;
use serde::Serialize;

/// A message ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub key: &'static str,
    pub text: String,
}

impl MessageTemplate {
    fn new(key: &'static str, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
        }
    }
}

/// Signals the selector reads. `monthly_goal_progress` is `None` when no monthly
/// savings goal is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MessageSignals {
    pub current_streak: u32,
    pub monthly_goal_progress: Option<f64>,
    pub lifetime_balance: f64,
    pub entry_count: usize,
}

/// Source of the uniform choice among eligible messages.
pub trait Picker {
    /// Returns an index in `0..len`; `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform choice from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngPicker;

impl Picker for ThreadRngPicker {
    fn pick(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len.max(1))
    }
}

pub fn default_message() -> MessageTemplate {
    MessageTemplate::new(
        "keep_tracking",
        "Every entry counts. Keep tracking to see where your money goes.",
    )
}

pub fn eligible_messages(signals: &MessageSignals) -> Vec<MessageTemplate> {
    let mut candidates = Vec::new();

    match signals.current_streak {
        0 => {}
        1..=2 => candidates.push(MessageTemplate::new(
            "streak_started",
            "You've started a streak. Log something tomorrow to keep it going!",
        )),
        3..=6 => candidates.push(MessageTemplate::new(
            "streak_building",
            format!("{} days in a row. You're building a habit!", signals.current_streak),
        )),
        streak => candidates.push(MessageTemplate::new(
            "streak_on_fire",
            format!("{streak}-day streak! You're on fire."),
        )),
    }

    if let Some(progress) = signals.monthly_goal_progress {
        if progress >= 100.0 {
            candidates.push(MessageTemplate::new(
                "goal_reached",
                "You hit this month's savings goal. Amazing work!",
            ));
        } else if progress >= 75.0 {
            candidates.push(MessageTemplate::new(
                "goal_almost",
                format!("{progress:.0}% of your monthly savings goal. Almost there!"),
            ));
        } else if progress >= 50.0 {
            candidates.push(MessageTemplate::new(
                "goal_halfway",
                "Halfway to your monthly savings goal. Keep it up!",
            ));
        }
    }

    if signals.lifetime_balance > 0.0 {
        candidates.push(MessageTemplate::new(
            "balance_positive",
            "You're earning more than you spend. Nice!",
        ));
    } else if signals.lifetime_balance < 0.0 {
        candidates.push(MessageTemplate::new(
            "balance_negative",
            "Spending is ahead of income. A small cut this week can turn it around.",
        ));
    }

    match signals.entry_count {
        0 => candidates.push(MessageTemplate::new(
            "first_entry",
            "Add your first transaction to get started.",
        )),
        count if count >= 100 => candidates.push(MessageTemplate::new(
            "entries_veteran",
            format!("{count} entries tracked. You know your money!"),
        )),
        _ => {}
    }

    candidates
}

/// Picks one eligible message uniformly, falling back to the default message.
pub fn select_message(signals: &MessageSignals, picker: &mut dyn Picker) -> MessageTemplate {
    let mut candidates = eligible_messages(signals);
    if candidates.is_empty() {
        return default_message();
    }
    let index = picker.pick(candidates.len()).min(candidates.len() - 1);
    candidates.swap_remove(index)
}
