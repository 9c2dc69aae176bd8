use std::{collections::HashMap, error::Error, path::PathBuf};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use engine::{
    Currency, EngineError, GroupExpense, Member, MemberId, MoneyCents, PercentShare, ShareEntry,
    SplitMethod, compute_balances, compute_settlements, import::parse_statement,
};
use serde::Deserialize;
use uuid::Uuid;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "spendwise")]
#[command(about = "Offline utilities for Spendwise (settle a group, preview a statement)")]
struct Cli {
    /// Log filter, e.g. `debug` or `engine=trace`.
    #[arg(long, env = "SPENDWISE_LOG", default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print balances and the transfers that settle a group.
    Settle(SettleArgs),
    /// Preview the expenses found in a bank statement CSV.
    Import(ImportArgs),
}

#[derive(Args, Debug)]
struct SettleArgs {
    /// JSON file describing members and expenses.
    #[arg(long)]
    file: PathBuf,
}

#[derive(Args, Debug)]
struct ImportArgs {
    #[arg(long)]
    file: PathBuf,
}

/// Group file read by `settle`. Members are referenced by name.
#[derive(Debug, Deserialize)]
struct GroupFile {
    #[serde(default)]
    currency: Option<String>,
    members: Vec<String>,
    #[serde(default)]
    expenses: Vec<ExpenseEntry>,
}

#[derive(Debug, Deserialize)]
struct ExpenseEntry {
    description: String,
    amount_minor: i64,
    paid_by: String,
    #[serde(default)]
    split: SplitEntry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SplitEntry {
    /// Between the named members, or everyone when empty.
    Equal {
        #[serde(default)]
        members: Vec<String>,
    },
    Exact {
        shares: HashMap<String, i64>,
    },
    Percentage {
        parts: HashMap<String, f64>,
    },
    #[default]
    All,
}

#[derive(Debug)]
struct Roster {
    members: Vec<Member>,
}

impl Roster {
    /// Names are matched case-insensitively, so they must be unique that way.
    fn new(names: &[String]) -> Result<Self, EngineError> {
        let mut members: Vec<Member> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                return Err(EngineError::InvalidName("member name is empty".to_string()));
            }
            if members.iter().any(|m| m.name.eq_ignore_ascii_case(name)) {
                return Err(EngineError::ExistingKey(format!("member {name}")));
            }
            members.push(Member::new(name));
        }
        Ok(Self { members })
    }

    fn id(&self, name: &str) -> Result<MemberId, EngineError> {
        let name = name.trim();
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .map(|m| m.id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("member {name}")))
    }

    fn name(&self, id: MemberId) -> &str {
        self.members
            .iter()
            .find(|m| m.id == id)
            .map_or("?", |m| m.name.as_str())
    }

    fn split(&self, split: &SplitEntry) -> Result<SplitMethod, EngineError> {
        Ok(match split {
            SplitEntry::All => SplitMethod::Equal {
                member_ids: self.members.iter().map(|m| m.id).collect(),
            },
            SplitEntry::Equal { members } if members.is_empty() => SplitMethod::Equal {
                member_ids: self.members.iter().map(|m| m.id).collect(),
            },
            SplitEntry::Equal { members } => SplitMethod::Equal {
                member_ids: members
                    .iter()
                    .map(|n| self.id(n))
                    .collect::<Result<_, _>>()?,
            },
            SplitEntry::Exact { shares } => SplitMethod::Exact {
                shares: self
                    .ordered(shares)?
                    .into_iter()
                    .map(|(member_id, cents)| ShareEntry {
                        member_id,
                        share: MoneyCents::new(cents),
                    })
                    .collect(),
            },
            SplitEntry::Percentage { parts } => SplitMethod::Percentage {
                parts: self
                    .ordered(parts)?
                    .into_iter()
                    .map(|(member_id, percent)| PercentShare { member_id, percent })
                    .collect(),
            },
        })
    }

    /// Resolves a name map into member order so leftover cents land predictably.
    fn ordered<V: Copy>(&self, values: &HashMap<String, V>) -> Result<Vec<(MemberId, V)>, EngineError> {
        let mut resolved = values
            .iter()
            .map(|(name, value)| Ok((self.id(name)?, *value)))
            .collect::<Result<Vec<_>, EngineError>>()?;
        resolved.sort_by_key(|(id, _)| self.members.iter().position(|m| m.id == *id));
        Ok(resolved)
    }
}

fn settle(args: SettleArgs) -> CliResult<()> {
    tracing::debug!("reading group file {}", args.file.display());
    let text = std::fs::read_to_string(&args.file)?;
    let file: GroupFile = serde_json::from_str(&text)?;
    let currency = match file.currency.as_deref() {
        Some(code) => Currency::try_from(code)?,
        None => Currency::default(),
    };

    let roster = Roster::new(&file.members)?;
    tracing::debug!(
        "{} member(s), {} expense(s), currency {}",
        roster.members.len(),
        file.expenses.len(),
        currency.code()
    );
    let group_id = Uuid::new_v4();
    let mut expenses = Vec::with_capacity(file.expenses.len());
    for entry in &file.expenses {
        let amount = MoneyCents::new(entry.amount_minor);
        expenses.push(GroupExpense {
            id: Uuid::new_v4(),
            group_id,
            description: entry.description.clone(),
            amount,
            paid_by: roster.id(&entry.paid_by)?,
            shares: roster.split(&entry.split)?.shares(amount)?,
            created_at: Utc::now(),
        });
    }

    let balances = compute_balances(&roster.members, &expenses)?;
    println!("Balances:");
    for balance in balances.iter() {
        println!(
            "  {:<20} {:>14}",
            roster.name(balance.member_id),
            currency.format(balance.amount)
        );
    }

    let transfers = compute_settlements(&balances);
    if transfers.is_empty() {
        println!("Everyone is settled up.");
        return Ok(());
    }
    println!("Settlements:");
    for transfer in transfers {
        println!(
            "  {} pays {} {}",
            roster.name(transfer.from),
            roster.name(transfer.to),
            currency.format(transfer.amount)
        );
    }
    Ok(())
}

fn import(args: ImportArgs) -> CliResult<()> {
    tracing::debug!("reading statement {}", args.file.display());
    let text = std::fs::read_to_string(&args.file)?;
    let report = parse_statement(&text)?;
    if report.skipped > 0 {
        tracing::warn!(
            "{} row(s) of {} were skipped (credits or unreadable rows)",
            report.skipped,
            args.file.display()
        );
    }
    for record in &report.records {
        println!(
            "{}  {:>12}  {:<14} {}",
            record.date,
            record.amount.to_string(),
            record.category,
            record.description
        );
    }
    println!(
        "{} expense(s) found, {} row(s) skipped",
        report.records.len(),
        report.skipped
    );
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log.as_str())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Settle(args) => settle(args),
        Command::Import(args) => import(args),
    }
}
