//! Groups, their members and the expenses shared between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, MoneyCents, ResultEngine, storage::Record};

pub type MemberId = Uuid;

/// Maximum difference between the sum of shares and the expense amount.
///
/// One minor unit, i.e. the `0.01` currency-unit tolerance of decimal money.
pub const SHARE_TOLERANCE: MoneyCents = MoneyCents::new(1);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A set of members sharing expenses.
///
/// Member order is insertion order; settlements use it to break ties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub currency: Currency,
    pub members: Vec<Member>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn member(&self, member_id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    pub fn has_member(&self, member_id: MemberId) -> bool {
        self.member(member_id).is_some()
    }

    /// Display name for a member, falling back to the id.
    pub fn member_name(&self, member_id: MemberId) -> String {
        self.member(member_id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| member_id.to_string())
    }
}

impl Record for Group {
    const KIND: &'static str = "group";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEntry {
    pub member_id: MemberId,
    pub share: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupExpense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    pub paid_by: MemberId,
    pub shares: Vec<ShareEntry>,
    pub created_at: DateTime<Utc>,
}

impl GroupExpense {
    /// Sum of the shares; `None` when it overflows.
    pub fn shares_total(&self) -> Option<MoneyCents> {
        MoneyCents::checked_sum(self.shares.iter().map(|entry| entry.share))
    }

    /// Checks `|sum(shares) - amount| <= SHARE_TOLERANCE`.
    pub fn shares_balanced(&self) -> bool {
        self.shares_total()
            .and_then(|total| total.checked_sub(self.amount))
            .is_some_and(|gap| (-SHARE_TOLERANCE..=SHARE_TOLERANCE).contains(&gap))
    }

    /// Like [`GroupExpense::shares_balanced`], with an error describing the gap.
    pub fn check_shares(&self) -> ResultEngine<()> {
        let total = self.shares_total().ok_or_else(|| {
            EngineError::InvalidExpenseData(format!("expense {} shares overflow", self.id))
        })?;
        if !self.shares_balanced() {
            return Err(EngineError::InvalidExpenseData(format!(
                "shares sum to {total} but amount is {}",
                self.amount
            )));
        }
        Ok(())
    }
}

impl Record for GroupExpense {
    const KIND: &'static str = "group expense";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercentShare {
    pub member_id: MemberId,
    pub percent: f64,
}

/// How an expense amount is divided between members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitMethod {
    /// Even split; leftover minor units go to the first members listed.
    Equal { member_ids: Vec<MemberId> },
    /// Shares given verbatim.
    Exact { shares: Vec<ShareEntry> },
    /// Percentages summing to 100 (within 0.01), scaled by their actual total;
    /// leftover minor units go to the first members listed.
    Percentage { parts: Vec<PercentShare> },
}

impl SplitMethod {
    /// Builds share entries for `amount`.
    pub fn shares(&self, amount: MoneyCents) -> ResultEngine<Vec<ShareEntry>> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "expense amount must not be negative".to_string(),
            ));
        }

        match self {
            SplitMethod::Equal { member_ids } => {
                ensure_distinct(member_ids.iter().copied())?;
                let count = i64::try_from(member_ids.len()).map_err(|_| {
                    EngineError::InvalidExpenseData("too many members".to_string())
                })?;
                if count == 0 {
                    return Err(EngineError::InvalidExpenseData(
                        "equal split needs at least one member".to_string(),
                    ));
                }
                let base = amount.cents() / count;
                let shares = member_ids
                    .iter()
                    .map(|&member_id| ShareEntry {
                        member_id,
                        share: MoneyCents::new(base),
                    })
                    .collect();
                distribute_remainder(shares, amount)
            }
            SplitMethod::Exact { shares } => {
                ensure_distinct(shares.iter().map(|entry| entry.member_id))?;
                if shares.iter().any(|entry| entry.share.is_negative()) {
                    return Err(EngineError::InvalidExpenseData(
                        "shares must not be negative".to_string(),
                    ));
                }
                Ok(shares.clone())
            }
            SplitMethod::Percentage { parts } => {
                ensure_distinct(parts.iter().map(|part| part.member_id))?;
                if parts.is_empty() {
                    return Err(EngineError::InvalidExpenseData(
                        "percentage split needs at least one member".to_string(),
                    ));
                }
                if parts.iter().any(|p| !p.percent.is_finite() || p.percent < 0.0) {
                    return Err(EngineError::InvalidExpenseData(
                        "percentages must be non-negative numbers".to_string(),
                    ));
                }
                let total: f64 = parts.iter().map(|p| p.percent).sum();
                if (total - 100.0).abs() > 0.01 {
                    return Err(EngineError::InvalidExpenseData(format!(
                        "percentages sum to {total}, expected 100"
                    )));
                }
                let shares = parts
                    .iter()
                    .map(|part| ShareEntry {
                        member_id: part.member_id,
                        share: MoneyCents::new(
                            (amount.cents() as f64 * part.percent / total).floor() as i64,
                        ),
                    })
                    .collect();
                distribute_remainder(shares, amount)
            }
        }
    }
}

fn ensure_distinct(ids: impl Iterator<Item = MemberId>) -> ResultEngine<()> {
    let mut seen = Vec::new();
    for id in ids {
        if seen.contains(&id) {
            return Err(EngineError::InvalidExpenseData(format!(
                "member {id} listed twice in split"
            )));
        }
        seen.push(id);
    }
    Ok(())
}

/// Brings `sum(shares)` to exactly `amount`.
///
/// A shortfall is spread evenly with the extra minor units going to the first
/// members listed; an excess is taken back one minor unit at a time in list
/// order, never pushing a share below zero.
fn distribute_remainder(
    mut shares: Vec<ShareEntry>,
    amount: MoneyCents,
) -> ResultEngine<Vec<ShareEntry>> {
    let overflow = || EngineError::InvalidExpenseData("split shares overflow".to_string());

    let assigned =
        MoneyCents::checked_sum(shares.iter().map(|entry| entry.share)).ok_or_else(overflow)?;
    let leftover = amount.checked_sub(assigned).ok_or_else(overflow)?.cents();
    let Ok(len) = i64::try_from(shares.len()) else {
        return Err(EngineError::InvalidExpenseData("too many members".to_string()));
    };
    if len == 0 || leftover == 0 {
        return Ok(shares);
    }

    if leftover > 0 {
        let each = leftover / len;
        let extra = usize::try_from(leftover % len).unwrap_or(0);
        for (idx, entry) in shares.iter_mut().enumerate() {
            let bonus = if idx < extra { each + 1 } else { each };
            entry.share = entry
                .share
                .checked_add(MoneyCents::new(bonus))
                .ok_or_else(overflow)?;
        }
        return Ok(shares);
    }

    let mut excess = leftover.unsigned_abs();
    while excess > 0 {
        let mut taken = false;
        for entry in shares.iter_mut().filter(|entry| entry.share.is_positive()) {
            if excess == 0 {
                break;
            }
            entry.share -= MoneyCents::new(1);
            excess -= 1;
            taken = true;
        }
        if !taken {
            return Err(EngineError::InvalidExpenseData(
                "split shares exceed the amount".to_string(),
            ));
        }
    }
    Ok(shares)
}
