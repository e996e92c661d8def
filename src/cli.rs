//! Argument-driven command line front end over [`Tracker`] and [`JsonStorage`].

use std::env;

use chrono::NaiveDate;
use colored::Colorize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::ConfigManager,
    engine::{Achievement, FixedClock, GoalCategory, GoalProgress, GoalScope, SystemClock},
    errors::TrackerError,
    ledger::{
        subscription::parse_date, AdjustmentKind, Frequency, PaymentMode, Period, Subscription,
        Totals, Transaction, TransactionKind,
    },
    storage::JsonStorage,
    utils::build_info,
    Tracker,
};

/// Overrides "today" for scripted runs.
pub const TODAY_ENV: &str = "FINANCE_TRACKER_TODAY";

const USAGE: &str = "Usage: finance_tracker_cli <command>\n\
Commands:\n  \
add <expense|income> <amount> [--mode upi|cash] [--date YYYY-MM-DD] [--note text]\n  \
adjust <add|subtract> <amount> [--mode upi|cash] [--date YYYY-MM-DD]\n  \
list\n  \
delete <transaction-id>\n  \
subscribe <name> <amount> <daily|weekly|monthly|yearly> <next-date> [--mode upi|cash]\n  \
subscriptions\n  \
pause <subscription-id> | resume <subscription-id>\n  \
process\n  \
upcoming [days]\n  \
streak\n  \
goals\n  \
goal <scope> <savings|expense>\n  \
set-goal <scope> <savings|expense> <amount>\n  \
custom-goal <label> <start> <end>\n  \
summary [daily|weekly|monthly|quarterly|yearly]\n  \
achievements\n  \
message\n  \
refresh\n  \
version";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] TrackerError),
    #[error("Invalid input: {0}")]
    Usage(String),
}

type CliResult<T> = Result<T, CliError>;

pub fn print_usage() {
    println!("{USAGE}");
}

/// Runs the command named by the process arguments.
pub fn run_cli() -> CliResult<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    run(&args)
}

pub fn run(args: &[String]) -> CliResult<()> {
    let Some((command, rest)) = args.split_first() else {
        return Err(usage("missing command"));
    };
    if command == "help" || command == "--help" {
        print_usage();
        return Ok(());
    }
    if command == "version" {
        println!("finance_tracker_cli {}", build_info::current());
        return Ok(());
    }
    let tracker = open_tracker()?;

    match command.as_str() {
        "add" => add_entry(&tracker, rest),
        "adjust" => add_adjustment(&tracker, rest),
        "list" => {
            for txn in tracker.transactions()? {
                println!("{}", describe_transaction(&txn));
            }
            Ok(())
        }
        "delete" => {
            let id = parse_id(rest.first())?;
            let removed = tracker.delete_transaction(id)?;
            println!("Deleted {}", describe_transaction(&removed));
            Ok(())
        }
        "subscribe" => subscribe(&tracker, rest),
        "subscriptions" => {
            for sub in tracker.subscriptions()? {
                println!("{}", describe_subscription(&sub));
            }
            Ok(())
        }
        "pause" | "resume" => {
            let id = parse_id(rest.first())?;
            tracker.set_subscription_active(id, command == "resume")?;
            println!("Subscription {id} {}d", command);
            Ok(())
        }
        "process" => {
            let run = tracker.process_recurring_report()?;
            for warning in &run.warnings {
                println!("{} {warning}", "warning:".yellow());
            }
            println!("Materialized {} subscription charge(s)", run.transactions.len());
            Ok(())
        }
        "upcoming" => {
            let days = rest
                .first()
                .map(|raw| raw.parse::<i64>())
                .transpose()
                .map_err(|_| usage("days must be a whole number"))?;
            let upcoming = tracker.upcoming_subscriptions(days)?;
            if upcoming.is_empty() {
                println!("No subscriptions due soon");
            }
            for charge in upcoming {
                println!(
                    "{} {} {:.2} (in {} day(s))",
                    charge.due, charge.name, charge.amount, charge.days_until
                );
            }
            Ok(())
        }
        "streak" => {
            let record = tracker.streak()?;
            println!(
                "Current streak: {} day(s), longest: {} day(s)",
                record.effective_current(tracker.today()),
                record.longest_streak
            );
            Ok(())
        }
        "goals" => {
            let goals = tracker.visible_goals()?;
            if goals.is_empty() {
                println!("No goals configured");
            }
            for goal in goals {
                println!("{}", describe_goal(&goal));
            }
            Ok(())
        }
        "goal" => {
            let (scope, category) = parse_goal_key(rest)?;
            let goal = tracker.calculate_goal_progress(scope, category)?;
            println!("{}", describe_goal(&goal));
            Ok(())
        }
        "set-goal" => {
            let (scope, category) = parse_goal_key(rest)?;
            let amount = parse_amount(rest.get(2))?;
            tracker.set_goal_target(scope, category, amount)?;
            println!("{} {:?} goal set to {amount:.2}", scope.label(), category);
            Ok(())
        }
        "custom-goal" => {
            let label = rest.first().ok_or_else(|| usage("missing label"))?;
            let start = parse_day(rest.get(1))?;
            let end = parse_day(rest.get(2))?;
            tracker.set_custom_goal(label.clone(), start, end)?;
            println!("Custom goal `{label}` runs {start} to {end}");
            Ok(())
        }
        "summary" => {
            let period = match rest.first() {
                Some(raw) => Period::parse(raw).ok_or_else(|| usage("unknown period"))?,
                None => Period::Monthly,
            };
            print_totals(&tracker.summary(period)?);
            Ok(())
        }
        "achievements" => {
            let check = tracker.check_achievements()?;
            for achievement in &check.new_achievements {
                println!("{} {}", "Unlocked:".green().bold(), describe_achievement(*achievement));
            }
            println!("{} achievement(s) unlocked in total", check.all_achievements.len());
            Ok(())
        }
        "message" => {
            println!("{}", tracker.motivational_message()?.text);
            Ok(())
        }
        "refresh" => {
            let report = tracker.refresh()?;
            if report.billed {
                println!("Subscriptions caught up");
            }
            for achievement in &report.new_achievements {
                println!("{} {}", "Unlocked:".green().bold(), describe_achievement(*achievement));
            }
            println!("{}", report.message.text);
            Ok(())
        }
        other => Err(usage(&format!("unknown command `{other}`"))),
    }
}

fn open_tracker() -> CliResult<Tracker> {
    let storage = JsonStorage::new_default()?;
    let config = ConfigManager::new()?.load()?;
    let tracker = Tracker::new(Box::new(storage)).with_config(config);
    match env::var(TODAY_ENV) {
        Ok(raw) => {
            let today = parse_date(&raw).ok_or_else(|| usage("FINANCE_TRACKER_TODAY is not a date"))?;
            Ok(tracker.with_clock(Box::new(FixedClock::new(today))))
        }
        Err(_) => Ok(tracker.with_clock(Box::new(SystemClock))),
    }
}

fn add_entry(tracker: &Tracker, args: &[String]) -> CliResult<()> {
    let kind = match args.first().map(String::as_str) {
        Some("expense") => TransactionKind::Expense,
        Some("income") => TransactionKind::Income,
        _ => return Err(usage("expected `expense` or `income`")),
    };
    let amount = parse_amount(args.get(1))?;
    let options = Options::parse(&args[2..])?;
    let date = options.date.unwrap_or_else(|| tracker.today());
    let mut txn = Transaction::new(kind, amount, date, options.mode);
    txn.note = options.note;
    let saved = tracker.add_transaction(txn)?;
    println!("Added {}", describe_transaction(&saved));
    Ok(())
}

fn add_adjustment(tracker: &Tracker, args: &[String]) -> CliResult<()> {
    let adjustment = match args.first().map(String::as_str) {
        Some("add") => AdjustmentKind::Add,
        Some("subtract") => AdjustmentKind::Subtract,
        _ => return Err(usage("expected `add` or `subtract`")),
    };
    let amount = parse_amount(args.get(1))?;
    let options = Options::parse(&args[2..])?;
    let date = options.date.unwrap_or_else(|| tracker.today());
    let saved =
        tracker.add_transaction(Transaction::balance_adjustment(adjustment, amount, date, options.mode))?;
    println!("Added {}", describe_transaction(&saved));
    Ok(())
}

fn subscribe(tracker: &Tracker, args: &[String]) -> CliResult<()> {
    let name = args.first().ok_or_else(|| usage("missing subscription name"))?;
    let amount = parse_amount(args.get(1))?;
    let frequency = args
        .get(2)
        .and_then(|raw| Frequency::parse(raw))
        .ok_or_else(|| usage("frequency must be daily, weekly, monthly or yearly"))?;
    let next = parse_day(args.get(3))?;
    let options = Options::parse(args.get(4..).unwrap_or_default())?;
    let sub = tracker.add_subscription(Subscription::new(
        name.clone(),
        amount,
        frequency,
        options.mode,
        next,
    ))?;
    println!("Added {}", describe_subscription(&sub));
    Ok(())
}

#[derive(Debug, Default)]
struct Options {
    mode: PaymentMode,
    date: Option<NaiveDate>,
    note: Option<String>,
}

impl Options {
    fn parse(args: &[String]) -> CliResult<Self> {
        let mut options = Options::default();
        let mut iter = args.iter();
        while let Some(flag) = iter.next() {
            let value = iter
                .next()
                .ok_or_else(|| usage(&format!("flag `{flag}` needs a value")))?;
            match flag.as_str() {
                "--mode" => {
                    options.mode = PaymentMode::parse(value)
                        .ok_or_else(|| usage("mode must be `upi` or `cash`"))?
                }
                "--date" => options.date = Some(parse_day(Some(value))?),
                "--note" => options.note = Some(value.clone()),
                other => return Err(usage(&format!("unknown flag `{other}`"))),
            }
        }
        Ok(options)
    }
}

fn usage(message: &str) -> CliError {
    CliError::Usage(message.to_string())
}

fn parse_amount(raw: Option<&String>) -> CliResult<f64> {
    raw.and_then(|value| value.parse::<f64>().ok())
        .ok_or_else(|| usage("amount must be a number"))
}

fn parse_day(raw: Option<&String>) -> CliResult<NaiveDate> {
    raw.and_then(|value| parse_date(value))
        .ok_or_else(|| usage("dates use the YYYY-MM-DD format"))
}

fn parse_id(raw: Option<&String>) -> CliResult<Uuid> {
    raw.and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(|| usage("expected an id"))
}

fn parse_goal_key(args: &[String]) -> CliResult<(GoalScope, GoalCategory)> {
    let scope = args
        .first()
        .and_then(|raw| GoalScope::parse(raw))
        .ok_or_else(|| usage("scope must be daily, weekly, monthly, yearly or custom"))?;
    let category = args
        .get(1)
        .and_then(|raw| GoalCategory::parse(raw))
        .ok_or_else(|| usage("category must be `savings` or `expense`"))?;
    Ok((scope, category))
}

fn describe_transaction(txn: &Transaction) -> String {
    let kind = match (txn.kind, txn.adjustment_type) {
        (TransactionKind::Expense, _) => "expense".red().to_string(),
        (TransactionKind::Income, _) => "income".green().to_string(),
        (TransactionKind::BalanceAdjustment, Some(AdjustmentKind::Subtract)) => {
            "adjustment (-)".to_string()
        }
        (TransactionKind::BalanceAdjustment, _) => "adjustment (+)".to_string(),
    };
    let mut line = format!("{} {} {} {:.2} {:?}", txn.id, txn.date, kind, txn.amount, txn.mode);
    if let Some(note) = &txn.note {
        line.push_str(&format!(" - {note}"));
    }
    line
}

fn describe_subscription(sub: &Subscription) -> String {
    let next = sub
        .next_billing_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "unscheduled".into());
    let frequency = sub.frequency.map(|f| f.label()).unwrap_or("unknown");
    let state = if sub.is_active { "" } else { " (paused)" };
    format!(
        "{} {} {:.2} {} next {}{}",
        sub.id, sub.name, sub.amount, frequency, next, state
    )
}

fn describe_goal(goal: &GoalProgress) -> String {
    let status = if !goal.is_configured() {
        "not set".dimmed().to_string()
    } else if goal.is_over_limit {
        "over limit".red().bold().to_string()
    } else if goal.is_completed {
        "completed".green().bold().to_string()
    } else {
        "in progress".yellow().to_string()
    };
    format!(
        "{} {:?}: {:.2} / {:.2} ({:.0}%) {}",
        goal.scope.label(),
        goal.category,
        goal.current_value,
        goal.target_goal,
        goal.progress,
        status
    )
}

fn describe_achievement(achievement: Achievement) -> String {
    format!("{} - {}", achievement.title(), achievement.description())
}

fn print_totals(totals: &Totals) {
    println!(
        "Income:  {:.2} (upi {:.2}, cash {:.2})",
        totals.income, totals.income_upi, totals.income_cash
    );
    println!(
        "Expense: {:.2} (upi {:.2}, cash {:.2})",
        totals.expense, totals.expense_upi, totals.expense_cash
    );
    println!("Balance: {:.2}", totals.balance);
}
