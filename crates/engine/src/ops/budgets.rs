use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine,
    budgets::{Budget, BudgetPeriod, BudgetStatus},
    util::{normalize_key, normalize_required_name},
};

use super::Engine;

impl Engine {
    /// Creates a budget; one budget per category and period.
    pub fn create_budget(
        &self,
        category: &str,
        limit: MoneyCents,
        period: BudgetPeriod,
    ) -> ResultEngine<Budget> {
        let category = normalize_required_name(category, "category")?;
        if !limit.is_positive() {
            return Err(EngineError::InvalidAmount(
                "budget limit must be positive".to_string(),
            ));
        }
        let budget = Budget {
            id: Uuid::new_v4(),
            category,
            limit,
            period,
            created_at: Utc::now(),
        };
        let key = normalize_key(&budget.category);
        self.budgets
            .insert_unless(budget.clone(), &|b| {
                b.period == period && normalize_key(&b.category) == key
            })
            .map_err(|err| match err {
                EngineError::ExistingKey(_) => {
                    EngineError::ExistingKey(format!("budget for {}", budget.category))
                }
                other => other,
            })?;
        tracing::info!("created budget {} for {}", budget.id, budget.category);
        Ok(budget)
    }

    pub fn list_budgets(&self) -> Vec<Budget> {
        self.budgets.list()
    }

    pub fn delete_budget(&self, budget_id: Uuid) -> ResultEngine<()> {
        self.budgets.delete(budget_id)?;
        Ok(())
    }

    /// Spending against every budget for the periods containing `as_of`
    /// (today when `None`).
    pub fn budget_status(&self, as_of: Option<NaiveDate>) -> ResultEngine<Vec<BudgetStatus>> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let expenses = self.expenses.list();
        self.budgets
            .list()
            .iter()
            .map(|budget| budget.status(&expenses, as_of))
            .collect()
    }
}
