use std::{fmt, sync::Arc};

use crate::{
    Currency,
    budgets::Budget,
    expenses::Expense,
    groups::{Group, GroupExpense},
    rules::Rule,
    storage::{MemoryRepository, Record, Repository},
};

mod budgets;
mod expenses;
mod groups;
mod import;
mod rules;

pub use groups::NewGroupExpense;
pub use rules::{NewRule, RuleUpdate};

/// Entry point for every expense-tracking operation.
///
/// The engine owns no state itself: each aggregate lives in an injected
/// [`Repository`]. Core computations (balances, settlements, rule matching)
/// run on snapshots read from those repositories.
pub struct Engine {
    groups: Arc<dyn Repository<Group>>,
    group_expenses: Arc<dyn Repository<GroupExpense>>,
    expenses: Arc<dyn Repository<Expense>>,
    rules: Arc<dyn Repository<Rule>>,
    budgets: Arc<dyn Repository<Budget>>,
    default_currency: Currency,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

/// The builder for `Engine`.
///
/// Any repository left unset defaults to an empty [`MemoryRepository`].
#[derive(Default)]
pub struct EngineBuilder {
    groups: Option<Arc<dyn Repository<Group>>>,
    group_expenses: Option<Arc<dyn Repository<GroupExpense>>>,
    expenses: Option<Arc<dyn Repository<Expense>>>,
    rules: Option<Arc<dyn Repository<Rule>>>,
    budgets: Option<Arc<dyn Repository<Budget>>>,
    default_currency: Option<Currency>,
}

fn or_memory<T: Record>(
    repo: Option<Arc<dyn Repository<T>>>,
) -> Arc<dyn Repository<T>> {
    match repo {
        Some(repo) => repo,
        None => Arc::new(MemoryRepository::<T>::new()),
    }
}

impl EngineBuilder {
    pub fn groups(mut self, repo: Arc<dyn Repository<Group>>) -> EngineBuilder {
        self.groups = Some(repo);
        self
    }

    pub fn group_expenses(mut self, repo: Arc<dyn Repository<GroupExpense>>) -> EngineBuilder {
        self.group_expenses = Some(repo);
        self
    }

    pub fn expenses(mut self, repo: Arc<dyn Repository<Expense>>) -> EngineBuilder {
        self.expenses = Some(repo);
        self
    }

    pub fn rules(mut self, repo: Arc<dyn Repository<Rule>>) -> EngineBuilder {
        self.rules = Some(repo);
        self
    }

    pub fn budgets(mut self, repo: Arc<dyn Repository<Budget>>) -> EngineBuilder {
        self.budgets = Some(repo);
        self
    }

    /// Currency of groups created without one. Defaults to INR.
    pub fn default_currency(mut self, currency: Currency) -> EngineBuilder {
        self.default_currency = Some(currency);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            groups: or_memory(self.groups),
            group_expenses: or_memory(self.group_expenses),
            expenses: or_memory(self.expenses),
            rules: or_memory(self.rules),
            budgets: or_memory(self.budgets),
            default_currency: self.default_currency.unwrap_or_default(),
        }
    }
}
