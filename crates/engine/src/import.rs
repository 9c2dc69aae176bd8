//! Bank statement CSV import.
//!
//! Statements come in many shapes, so columns are found by header keywords
//! rather than position. Only spending (debits) is imported; credits and rows
//! that cannot be read are counted as skipped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine, expenses::UNCATEGORIZED, util::normalize_key};

const DATE_HEADERS: &[&str] = &["date", "transaction date", "txn date", "posted", "value date"];
const DESCRIPTION_HEADERS: &[&str] = &[
    "description",
    "narration",
    "details",
    "particulars",
    "memo",
    "payee",
    "remarks",
];
const AMOUNT_HEADERS: &[&str] = &["amount", "value", "transaction amount"];
const DEBIT_HEADERS: &[&str] = &["debit", "withdrawal", "withdrawal amt", "debit amount"];
const CREDIT_HEADERS: &[&str] = &["credit", "deposit", "deposit amt", "credit amount"];
const TYPE_HEADERS: &[&str] = &["type", "dr/cr", "cr/dr", "transaction type"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d %b %Y"];

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Food",
        &["swiggy", "zomato", "restaurant", "cafe", "pizza", "dominos", "mcdonald", "starbucks"],
    ),
    (
        "Groceries",
        &["bigbasket", "grofers", "blinkit", "dmart", "grocery", "supermarket", "zepto"],
    ),
    (
        "Transport",
        &["uber", "ola", "rapido", "metro", "fuel", "petrol", "irctc", "parking"],
    ),
    (
        "Shopping",
        &["amazon", "flipkart", "myntra", "ajio", "meesho", "nykaa"],
    ),
    (
        "Entertainment",
        &["netflix", "spotify", "hotstar", "bookmyshow", "prime video", "cinema"],
    ),
    (
        "Utilities",
        &["electricity", "water bill", "airtel", "jio", "broadband", "recharge", "gas"],
    ),
    (
        "Health",
        &["pharmacy", "apollo", "hospital", "clinic", "medplus", "1mg"],
    ),
    ("Rent", &["rent", "landlord", "lease"]),
];

/// One spending row read from a statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRecord {
    pub date: NaiveDate,
    pub description: String,
    /// Always positive: the amount spent.
    pub amount: MoneyCents,
    pub category: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub records: Vec<StatementRecord>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy)]
enum AmountColumns {
    Single { amount: usize, kind: Option<usize> },
    Split { debit: usize, credit: Option<usize> },
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    description: usize,
    amount: AmountColumns,
}

fn find(headers: &[String], names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
}

impl Columns {
    fn detect(headers: &[String]) -> ResultEngine<Self> {
        let missing = |what: &str| EngineError::Import(format!("no {what} column in header"));

        let date = find(headers, DATE_HEADERS).ok_or_else(|| missing("date"))?;
        let description =
            find(headers, DESCRIPTION_HEADERS).ok_or_else(|| missing("description"))?;
        let amount = match find(headers, AMOUNT_HEADERS) {
            Some(amount) => AmountColumns::Single {
                amount,
                kind: find(headers, TYPE_HEADERS),
            },
            None => AmountColumns::Split {
                debit: find(headers, DEBIT_HEADERS).ok_or_else(|| missing("amount"))?,
                credit: find(headers, CREDIT_HEADERS),
            },
        };

        Ok(Self {
            date,
            description,
            amount,
        })
    }
}

/// Parses a date in any of the supported statement formats.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Parses a statement amount: strips currency markers and thousands
/// separators; `(12.00)` is negative.
pub fn parse_amount(value: &str) -> Option<MoneyCents> {
    let trimmed = value.trim();
    let negative = trimmed.starts_with('(') && trimmed.ends_with(')');
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let amount: MoneyCents = cleaned.parse().ok()?;
    Some(if negative { -amount.abs() } else { amount })
}

/// Keyword-based category guess for a description.
pub fn guess_category(description: &str) -> &'static str {
    let description = normalize_key(description);
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| description.contains(k)))
        .map_or(UNCATEGORIZED, |(category, _)| category)
}

fn is_credit_marker(value: &str) -> bool {
    let value = normalize_key(value.trim());
    value == "cr" || value.contains("credit") || value.contains("deposit")
}

/// Parses a bank statement CSV into spending records.
///
/// Fails only when the header is unusable; individual bad rows are skipped.
pub fn parse_statement(text: &str) -> ResultEngine<ImportReport> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| normalize_key(h.trim_start_matches('\u{feff}')))
        .collect();
    let columns = Columns::detect(&headers)?;

    let mut report = ImportReport::default();
    for (line, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                tracing::warn!("skipping unreadable statement row {}: {err}", line + 2);
                report.skipped += 1;
                continue;
            }
        };
        match read_row(&row, columns) {
            Some(record) => report.records.push(record),
            None => {
                tracing::debug!("skipping statement row {}", line + 2);
                report.skipped += 1;
            }
        }
    }

    tracing::info!(
        imported = report.records.len(),
        skipped = report.skipped,
        "parsed bank statement"
    );
    Ok(report)
}

fn read_row(row: &csv::StringRecord, columns: Columns) -> Option<StatementRecord> {
    let date = parse_date(row.get(columns.date)?)?;
    let description = row.get(columns.description)?.trim().to_string();
    if description.is_empty() {
        return None;
    }

    let amount = match columns.amount {
        AmountColumns::Single { amount, kind } => {
            if kind
                .and_then(|idx| row.get(idx))
                .is_some_and(is_credit_marker)
            {
                return None;
            }
            parse_amount(row.get(amount)?)?.abs()
        }
        AmountColumns::Split { debit, .. } => {
            // Rows with only a credit value leave the debit cell empty.
            parse_amount(row.get(debit).unwrap_or_default())?.abs()
        }
    };
    if amount.is_zero() {
        return None;
    }

    Some(StatementRecord {
        date,
        category: guess_category(&description).to_string(),
        description,
        amount,
    })
}
