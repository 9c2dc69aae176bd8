use chrono::Utc;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    expenses::{Expense, ExpenseFilter, NewExpense, UNCATEGORIZED},
    rules::{ExpenseLike, RuleSuggestions, evaluate_rules},
    util::{normalize_optional_text, normalize_required_name},
};

use super::Engine;

fn push_tag(tags: &mut Vec<String>, tag: &str) {
    let tag = tag.trim();
    if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
}

impl Engine {
    /// Records a personal expense.
    ///
    /// Without an explicit category the active rules suggest one (falling back
    /// to `Uncategorized`); suggested tags are merged into the given ones.
    pub fn create_expense(&self, new: NewExpense) -> ResultEngine<Expense> {
        let description = normalize_required_name(&new.description, "expense")?;
        if !new.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "expense amount must be positive".to_string(),
            ));
        }

        let mut expense = Expense {
            id: Uuid::new_v4(),
            date: new.date.unwrap_or_else(|| Utc::now().date_naive()),
            description,
            amount: new.amount,
            category: normalize_optional_text(new.category.as_deref())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            merchant: normalize_optional_text(new.merchant.as_deref()),
            payment_method: normalize_optional_text(new.payment_method.as_deref()),
            notes: normalize_optional_text(new.notes.as_deref()),
            tags: Vec::new(),
            created_at: Utc::now(),
        };
        for tag in &new.tags {
            push_tag(&mut expense.tags, tag);
        }

        let suggestions = self.test_rules(&expense);
        if new.category.as_deref().is_none_or(|c| c.trim().is_empty())
            && let Some(category) = suggestions.category
        {
            expense.category = category;
        }
        for tag in &suggestions.tags {
            push_tag(&mut expense.tags, tag);
        }

        self.expenses.insert(expense.clone())?;
        tracing::info!(
            "created expense {} ({}, {})",
            expense.id,
            expense.amount,
            expense.category
        );
        Ok(expense)
    }

    /// Expenses accepted by `filter`, oldest date first.
    pub fn list_expenses(&self, filter: &ExpenseFilter) -> Vec<Expense> {
        let mut expenses: Vec<Expense> = self
            .expenses
            .list()
            .into_iter()
            .filter(|e| filter.accepts(e))
            .collect();
        expenses.sort_by_key(|e| e.date);
        expenses
    }

    pub fn expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        self.expenses.get(expense_id)
    }

    pub fn delete_expense(&self, expense_id: Uuid) -> ResultEngine<()> {
        self.expenses.delete(expense_id)?;
        Ok(())
    }

    /// Evaluates the stored rules (in creation order) against `record`.
    pub fn test_rules(&self, record: &impl ExpenseLike) -> RuleSuggestions {
        let rules = self.rules.list();
        evaluate_rules(&rules, record)
    }
}
