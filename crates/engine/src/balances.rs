//! Reduction of group expenses into one net balance per member.

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, MoneyCents, ResultEngine,
    groups::{GroupExpense, Member, MemberId},
};

/// Net position of one member.
///
/// Positive: the group owes the member. Negative: the member owes the group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBalance {
    pub member_id: MemberId,
    pub amount: MoneyCents,
}

/// Balances of every member of a group, in member order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBalances(Vec<NetBalance>);

impl NetBalances {
    /// Builds balances from `(member, amount)` pairs, keeping their order.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (MemberId, MoneyCents)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(member_id, amount)| NetBalance { member_id, amount })
                .collect(),
        )
    }

    pub fn get(&self, member_id: MemberId) -> Option<MoneyCents> {
        self.0
            .iter()
            .find(|b| b.member_id == member_id)
            .map(|b| b.amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetBalance> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every balance; zero for a consistent group.
    ///
    /// Accumulates in `i128` so intermediate sums cannot overflow; a total
    /// outside the `i64` range saturates.
    pub fn total(&self) -> MoneyCents {
        let total: i128 = self.0.iter().map(|b| i128::from(b.amount.cents())).sum();
        let clamped = total.clamp(i128::from(i64::MIN), i128::from(i64::MAX));
        MoneyCents::new(i64::try_from(clamped).unwrap_or_default())
    }

    /// `true` when every member is at zero.
    pub fn is_settled(&self) -> bool {
        self.0.iter().all(|b| b.amount.is_zero())
    }

    pub(crate) fn entry_mut(&mut self, member_id: MemberId) -> Option<&mut MoneyCents> {
        self.0
            .iter_mut()
            .find(|b| b.member_id == member_id)
            .map(|b| &mut b.amount)
    }
}

impl IntoIterator for NetBalances {
    type Item = NetBalance;
    type IntoIter = std::vec::IntoIter<NetBalance>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// `i64::MIN` has no positive counterpart, so the solver could not settle it.
fn checked_balance(value: Option<MoneyCents>) -> Option<MoneyCents> {
    value.filter(|v| v.cents() != i64::MIN)
}

/// Computes every member's net balance from the group's expenses.
///
/// - Every member appears in the result, starting at zero.
/// - The payer's own share entry credits them `amount - share`; every other
///   entry debits its member by `share`. The payer is thus credited exactly
///   what the others owe, so the result always sums to zero.
/// - A payer or share member outside `members`, or shares that do not add up
///   to the amount within [`SHARE_TOLERANCE`], fail with
///   [`EngineError::InvalidExpenseData`].
///
/// [`SHARE_TOLERANCE`]: crate::groups::SHARE_TOLERANCE
pub fn compute_balances(
    members: &[Member],
    expenses: &[GroupExpense],
) -> ResultEngine<NetBalances> {
    let mut balances = NetBalances::from_pairs(members.iter().map(|m| (m.id, MoneyCents::ZERO)));

    for expense in expenses {
        if expense.amount.is_negative() {
            return Err(EngineError::InvalidExpenseData(format!(
                "expense {} has a negative amount",
                expense.id
            )));
        }
        if balances.get(expense.paid_by).is_none() {
            return Err(EngineError::InvalidExpenseData(format!(
                "expense {} is paid by unknown member {}",
                expense.id, expense.paid_by
            )));
        }
        expense.check_shares()?;

        let overflow = || {
            EngineError::InvalidExpenseData(format!(
                "expense {} pushes a balance out of range",
                expense.id
            ))
        };
        let mut fronted = MoneyCents::ZERO;
        for entry in &expense.shares {
            if entry.member_id == expense.paid_by {
                continue;
            }
            let balance = balances.entry_mut(entry.member_id).ok_or_else(|| {
                EngineError::InvalidExpenseData(format!(
                    "expense {} has a share for unknown member {}",
                    expense.id, entry.member_id
                ))
            })?;
            *balance = checked_balance(balance.checked_sub(entry.share)).ok_or_else(overflow)?;
            fronted = fronted.checked_add(entry.share).ok_or_else(overflow)?;
        }
        if let Some(payer) = balances.entry_mut(expense.paid_by) {
            *payer = checked_balance(payer.checked_add(fronted)).ok_or_else(overflow)?;
        }
    }

    tracing::debug!(
        members = balances.len(),
        expenses = expenses.len(),
        "computed group balances"
    );
    Ok(balances)
}
