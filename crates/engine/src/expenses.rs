//! Personal (non-group) expenses.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    MoneyCents,
    rules::{ExpenseLike, Field, FieldValue, text_field},
    storage::Record,
    util::normalize_key,
};

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: MoneyCents,
    pub category: String,
    pub merchant: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Expense {
    const KIND: &'static str = "expense";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl ExpenseLike for Expense {
    fn field(&self, field: &Field) -> FieldValue<'_> {
        match field {
            Field::Description => FieldValue::Text(Cow::Borrowed(&self.description)),
            Field::Amount => FieldValue::Amount(self.amount),
            Field::Category => FieldValue::Text(Cow::Borrowed(&self.category)),
            Field::Merchant => text_field(&self.merchant),
            Field::PaymentMethod => text_field(&self.payment_method),
            Field::Notes => text_field(&self.notes),
            Field::Date => FieldValue::Date(self.date),
            Field::Other(_) => FieldValue::Missing,
        }
    }
}

/// Input for [`Engine::create_expense`](crate::Engine::create_expense).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount: MoneyCents,
    /// When absent the active rules pick one.
    pub category: Option<String>,
    pub merchant: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

/// Filter for listing expenses; every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    /// Inclusive lower bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub to: Option<NaiveDate>,
}

impl ExpenseFilter {
    pub fn accepts(&self, expense: &Expense) -> bool {
        if let Some(category) = &self.category
            && normalize_key(category.trim()) != normalize_key(&expense.category)
        {
            return false;
        }
        if self.from.is_some_and(|from| expense.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| expense.date > to) {
            return false;
        }
        true
    }
}
