use chrono::Utc;
use uuid::Uuid;

use crate::{
    Currency, EngineError, MoneyCents, ResultEngine,
    balances::{NetBalances, compute_balances},
    groups::{Group, GroupExpense, Member, MemberId, SplitMethod},
    settlements::{Transfer, compute_settlements},
    util::{normalize_key, normalize_required_name},
};

use super::Engine;

/// Input for [`Engine::add_group_expense`].
#[derive(Clone, Debug, PartialEq)]
pub struct NewGroupExpense {
    pub description: String,
    pub amount: MoneyCents,
    pub paid_by: MemberId,
    pub split: SplitMethod,
}

fn ensure_unique_name(group: &Group, name: &str, except: Option<MemberId>) -> ResultEngine<()> {
    let key = normalize_key(name);
    let taken = group
        .members
        .iter()
        .filter(|m| Some(m.id) != except)
        .any(|m| normalize_key(&m.name) == key);
    if taken {
        return Err(EngineError::ExistingKey(format!("member {name}")));
    }
    Ok(())
}

impl Engine {
    /// Creates a group with its initial members (in the given order).
    pub fn create_group(
        &self,
        name: &str,
        currency: Option<Currency>,
        member_names: &[String],
    ) -> ResultEngine<Group> {
        let mut group = Group {
            id: Uuid::new_v4(),
            name: normalize_required_name(name, "group")?,
            currency: currency.unwrap_or(self.default_currency),
            members: Vec::with_capacity(member_names.len()),
            created_at: Utc::now(),
        };
        for member_name in member_names {
            let member_name = normalize_required_name(member_name, "member")?;
            ensure_unique_name(&group, &member_name, None)?;
            group.members.push(Member::new(member_name));
        }

        self.groups.insert(group.clone())?;
        tracing::info!("created group {} ({})", group.name, group.id);
        Ok(group)
    }

    pub fn list_groups(&self) -> Vec<Group> {
        self.groups.list()
    }

    pub fn group(&self, group_id: Uuid) -> ResultEngine<Group> {
        self.groups.get(group_id)
    }

    /// Deletes a group together with all of its expenses.
    pub fn delete_group(&self, group_id: Uuid) -> ResultEngine<()> {
        let group = self.groups.delete(group_id)?;
        let expenses = self
            .group_expenses
            .list()
            .into_iter()
            .filter(|e| e.group_id == group_id);
        for expense in expenses {
            self.group_expenses.delete(expense.id)?;
        }
        tracing::info!("deleted group {} ({})", group.name, group.id);
        Ok(())
    }

    pub fn add_member(&self, group_id: Uuid, name: &str) -> ResultEngine<Member> {
        let member = Member::new(normalize_required_name(name, "member")?);
        self.groups.modify(group_id, &mut |group| {
            ensure_unique_name(group, &member.name, None)?;
            group.members.push(member.clone());
            Ok(())
        })?;
        tracing::info!("added member {} to group {group_id}", member.name);
        Ok(member)
    }

    /// Renames a member; the only edit a member allows.
    pub fn rename_member(
        &self,
        group_id: Uuid,
        member_id: MemberId,
        name: &str,
    ) -> ResultEngine<Member> {
        let name = normalize_required_name(name, "member")?;
        let group = self.groups.modify(group_id, &mut |group| {
            ensure_unique_name(group, &name, Some(member_id))?;
            let member = group
                .members
                .iter_mut()
                .find(|m| m.id == member_id)
                .ok_or_else(|| EngineError::KeyNotFound(format!("member {member_id}")))?;
            member.name = name.clone();
            Ok(())
        })?;
        group
            .member(member_id)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound(format!("member {member_id}")))
    }

    /// Records a group expense after checking payer, shares and totals.
    pub fn add_group_expense(
        &self,
        group_id: Uuid,
        new: NewGroupExpense,
    ) -> ResultEngine<GroupExpense> {
        let group = self.groups.get(group_id)?;
        let description = normalize_required_name(&new.description, "expense")?;
        if new.amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "expense amount must not be negative".to_string(),
            ));
        }
        if !group.has_member(new.paid_by) {
            return Err(EngineError::InvalidExpenseData(format!(
                "payer {} is not a member of the group",
                new.paid_by
            )));
        }

        let shares = new.split.shares(new.amount)?;
        if let Some(stranger) = shares.iter().find(|s| !group.has_member(s.member_id)) {
            return Err(EngineError::InvalidExpenseData(format!(
                "member {} is not part of the group",
                stranger.member_id
            )));
        }

        let expense = GroupExpense {
            id: Uuid::new_v4(),
            group_id,
            description,
            amount: new.amount,
            paid_by: new.paid_by,
            shares,
            created_at: Utc::now(),
        };
        expense.check_shares()?;

        // Refuse expenses that would leave the group's balances out of range.
        let mut expenses = self.group_expenses(group_id)?;
        expenses.push(expense.clone());
        compute_balances(&group.members, &expenses)?;

        self.group_expenses.insert(expense.clone())?;
        tracing::info!(
            "added expense {} of {} to group {}",
            expense.id,
            group.currency.format(expense.amount),
            group.id
        );
        Ok(expense)
    }

    pub fn group_expenses(&self, group_id: Uuid) -> ResultEngine<Vec<GroupExpense>> {
        self.groups.get(group_id)?;
        Ok(self
            .group_expenses
            .list()
            .into_iter()
            .filter(|e| e.group_id == group_id)
            .collect())
    }

    /// Net balance of every member, recomputed from the group's expenses.
    pub fn group_balances(&self, group_id: Uuid) -> ResultEngine<NetBalances> {
        let group = self.groups.get(group_id)?;
        let expenses = self.group_expenses(group_id)?;
        compute_balances(&group.members, &expenses)
    }

    /// Transfers that settle every member of the group.
    pub fn group_settlements(&self, group_id: Uuid) -> ResultEngine<Vec<Transfer>> {
        let balances = self.group_balances(group_id)?;
        Ok(compute_settlements(&balances))
    }
}
