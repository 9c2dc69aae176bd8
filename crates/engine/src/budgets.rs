//! Per-category spending limits.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, expenses::Expense, storage::Record,
    util::normalize_key,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    /// Half-open date range `[start, end)` of the period containing `day`.
    ///
    /// Weeks start on Monday. Fails with [`EngineError::InvalidDate`] when the
    /// period reaches past the representable calendar.
    pub fn range(self, day: NaiveDate) -> ResultEngine<(NaiveDate, NaiveDate)> {
        let start = match self {
            BudgetPeriod::Weekly => day.checked_sub_days(Days::new(u64::from(
                day.weekday().num_days_from_monday(),
            ))),
            BudgetPeriod::Monthly => day.with_day(1),
            BudgetPeriod::Yearly => day.with_ordinal(1),
        };
        let end = start.and_then(|start| match self {
            BudgetPeriod::Weekly => start.checked_add_days(Days::new(7)),
            BudgetPeriod::Monthly => start.checked_add_months(Months::new(1)),
            BudgetPeriod::Yearly => start.checked_add_months(Months::new(12)),
        });
        match (start, end) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(EngineError::InvalidDate(format!(
                "no {self:?} budget period around {day}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub category: String,
    pub limit: MoneyCents,
    pub period: BudgetPeriod,
    pub created_at: DateTime<Utc>,
}

impl Record for Budget {
    const KIND: &'static str = "budget";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub period_start: NaiveDate,
    /// Exclusive.
    pub period_end: NaiveDate,
    pub spent: MoneyCents,
    /// Negative once the budget is exceeded.
    pub remaining: MoneyCents,
    pub percent_used: f64,
    pub over_budget: bool,
}

impl Budget {
    /// Spending against this budget for the period containing `as_of`.
    pub fn status<'a>(
        &self,
        expenses: impl IntoIterator<Item = &'a Expense>,
        as_of: NaiveDate,
    ) -> ResultEngine<BudgetStatus> {
        let (period_start, period_end) = self.period.range(as_of)?;
        let category = normalize_key(&self.category);

        let spent = MoneyCents::checked_sum(
            expenses
                .into_iter()
                .filter(|e| e.date >= period_start && e.date < period_end)
                .filter(|e| normalize_key(&e.category) == category)
                .map(|e| e.amount),
        )
        .ok_or_else(|| {
            EngineError::InvalidAmount(format!("spending on {} overflows", self.category))
        })?;

        let percent_used = if self.limit.is_positive() {
            spent.cents() as f64 / self.limit.cents() as f64 * 100.0
        } else {
            0.0
        };

        Ok(BudgetStatus {
            budget: self.clone(),
            period_start,
            period_end,
            spent,
            remaining: self.limit - spent,
            percent_used,
            over_budget: spent > self.limit,
        })
    }
}
