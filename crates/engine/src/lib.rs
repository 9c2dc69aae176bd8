//! Expense tracking engine.
//!
//! Personal expenses, shared group expenses with balance and settlement
//! computation, categorisation rules, budgets and bank statement import. All
//! state sits behind [`storage::Repository`] implementations injected into
//! the [`Engine`].

pub use balances::{NetBalance, NetBalances, compute_balances};
pub use budgets::{Budget, BudgetPeriod, BudgetStatus};
pub use currency::Currency;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseFilter, NewExpense, UNCATEGORIZED};
pub use groups::{
    Group, GroupExpense, Member, MemberId, PercentShare, SHARE_TOLERANCE, ShareEntry, SplitMethod,
};
pub use import::{ImportReport, StatementRecord};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, NewGroupExpense, NewRule, RuleUpdate};
pub use rules::{
    Condition, ExpenseLike, ExpenseRecord, Field, MatchedRule, Operator, Rule, RuleAction,
    RuleSuggestions, evaluate_rules, matches,
};
pub use settlements::{Transfer, apply_transfers, compute_settlements};

pub mod balances;
mod budgets;
mod currency;
mod error;
mod expenses;
mod groups;
pub mod import;
mod money;
mod ops;
pub mod rules;
pub mod settlements;
pub mod storage;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
