//! Request and response bodies of the HTTP API.
//!
//! Money always travels as integer minor units (`*_minor` fields).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Eur,
    Usd,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub id: Uuid,
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub currency: Option<Currency>,
        /// Initial member names, in display order.
        #[serde(default)]
        pub members: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub currency: Currency,
        pub members: Vec<MemberView>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupListResponse {
        pub groups: Vec<GroupView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberRename {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub member_id: Uuid,
        pub share_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PercentView {
        pub member_id: Uuid,
        pub percent: f64,
    }

    /// How to divide a group expense.
    ///
    /// - `equal`: even split among `member_ids` (all members when empty).
    /// - `exact`: explicit shares that must add up to the amount.
    /// - `percentage`: percentages that must add up to 100.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    pub enum Split {
        Equal {
            #[serde(default)]
            member_ids: Vec<Uuid>,
        },
        Exact {
            shares: Vec<ShareView>,
        },
        Percentage {
            parts: Vec<PercentView>,
        },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupExpenseNew {
        pub description: String,
        pub amount_minor: i64,
        pub paid_by: Uuid,
        pub split: Split,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupExpenseView {
        pub id: Uuid,
        pub description: String,
        pub amount_minor: i64,
        pub paid_by: Uuid,
        pub shares: Vec<ShareView>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupExpenseListResponse {
        pub expenses: Vec<GroupExpenseView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub member_id: Uuid,
        pub name: String,
        /// Positive: is owed money. Negative: owes money.
        pub balance_minor: i64,
        pub balance_display: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub currency: Currency,
        pub balances: Vec<BalanceView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub from: Uuid,
        pub from_name: String,
        pub to: Uuid,
        pub to_name: String,
        pub amount_minor: i64,
        /// Currency formatted amount, e.g. `₹400.00`.
        pub amount_display: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementsResponse {
        pub currency: Currency,
        pub settlements: Vec<SettlementView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub date: Option<NaiveDate>,
        pub description: String,
        pub amount_minor: i64,
        pub category: Option<String>,
        pub merchant: Option<String>,
        pub payment_method: Option<String>,
        pub notes: Option<String>,
        #[serde(default)]
        pub tags: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub date: NaiveDate,
        pub description: String,
        pub amount_minor: i64,
        pub category: String,
        pub merchant: Option<String>,
        pub payment_method: Option<String>,
        pub notes: Option<String>,
        pub tags: Vec<String>,
    }

    /// Query string of `GET /expenses`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseQuery {
        pub category: Option<String>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
        pub total_minor: i64,
    }
}

pub mod rule {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ConditionView {
        pub field: String,
        /// One of `contains`, `equals`, `starts_with`, `ends_with`, `regex`,
        /// `greater_than`, `less_than`.
        pub operator: String,
        pub value: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "type", content = "value", rename_all = "snake_case")]
    pub enum ActionView {
        SetCategory(String),
        AddTag(String),
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleNew {
        pub name: String,
        pub active: Option<bool>,
        pub condition: ConditionView,
        pub actions: Vec<ActionView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RuleUpdate {
        pub name: Option<String>,
        pub active: Option<bool>,
        pub condition: Option<ConditionView>,
        pub actions: Option<Vec<ActionView>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleView {
        pub id: Uuid,
        pub name: String,
        pub active: bool,
        pub condition: ConditionView,
        pub actions: Vec<ActionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleListResponse {
        pub rules: Vec<RuleView>,
    }

    /// Record to evaluate in `POST /rules/test`; every field is optional.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RuleTest {
        pub description: Option<String>,
        pub amount_minor: Option<i64>,
        pub category: Option<String>,
        pub merchant: Option<String>,
        pub payment_method: Option<String>,
        pub notes: Option<String>,
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MatchedRuleView {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Suggestions {
        pub category: Option<String>,
        pub tags: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleTestResponse {
        pub matched_rules: Vec<MatchedRuleView>,
        pub suggestions: Suggestions,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetPeriod {
        Weekly,
        #[default]
        Monthly,
        Yearly,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub category: String,
        pub limit_minor: i64,
        pub period: Option<BudgetPeriod>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub category: String,
        pub limit_minor: i64,
        pub period: BudgetPeriod,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetListResponse {
        pub budgets: Vec<BudgetView>,
    }

    /// Query string of `GET /budgets/status`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetStatusQuery {
        pub as_of: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetStatusView {
        pub budget: BudgetView,
        pub period_start: NaiveDate,
        /// Exclusive.
        pub period_end: NaiveDate,
        pub spent_minor: i64,
        pub remaining_minor: i64,
        pub percent_used: f64,
        pub over_budget: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetStatusResponse {
        pub statuses: Vec<BudgetStatusView>,
    }
}

pub mod import {
    use super::*;

    /// Query string of `POST /import/csv`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ImportQuery {
        /// Store the parsed rows as expenses; preview only when absent.
        pub commit: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportedRow {
        pub date: NaiveDate,
        pub description: String,
        pub amount_minor: i64,
        pub category: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportResponse {
        pub committed: bool,
        pub records: Vec<ImportedRow>,
        pub skipped: usize,
    }
}
