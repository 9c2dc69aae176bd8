//! Budgets API endpoints.

use api_types::{
    Deleted,
    budget::{
        BudgetListResponse, BudgetNew, BudgetPeriod, BudgetStatusQuery, BudgetStatusResponse,
        BudgetStatusView, BudgetView,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::MoneyCents;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_period(period: engine::BudgetPeriod) -> BudgetPeriod {
    match period {
        engine::BudgetPeriod::Weekly => BudgetPeriod::Weekly,
        engine::BudgetPeriod::Monthly => BudgetPeriod::Monthly,
        engine::BudgetPeriod::Yearly => BudgetPeriod::Yearly,
    }
}

fn api_to_period(period: BudgetPeriod) -> engine::BudgetPeriod {
    match period {
        BudgetPeriod::Weekly => engine::BudgetPeriod::Weekly,
        BudgetPeriod::Monthly => engine::BudgetPeriod::Monthly,
        BudgetPeriod::Yearly => engine::BudgetPeriod::Yearly,
    }
}

fn map_budget(budget: engine::Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        category: budget.category,
        limit_minor: budget.limit.cents(),
        period: map_period(budget.period),
    }
}

pub async fn list(State(state): State<ServerState>) -> Json<BudgetListResponse> {
    let budgets = state
        .engine
        .list_budgets()
        .into_iter()
        .map(map_budget)
        .collect();
    Json(BudgetListResponse { budgets })
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let budget = state.engine.create_budget(
        &payload.category,
        MoneyCents::new(payload.limit_minor),
        api_to_period(payload.period.unwrap_or_default()),
    )?;
    Ok((StatusCode::CREATED, Json(map_budget(budget))))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<Deleted>, ServerError> {
    state.engine.delete_budget(budget_id)?;
    Ok(Json(Deleted { id: budget_id }))
}

pub async fn status(
    State(state): State<ServerState>,
    Query(query): Query<BudgetStatusQuery>,
) -> Result<Json<BudgetStatusResponse>, ServerError> {
    let statuses = state
        .engine
        .budget_status(query.as_of)?
        .into_iter()
        .map(|status| BudgetStatusView {
            budget: map_budget(status.budget),
            period_start: status.period_start,
            period_end: status.period_end,
            spent_minor: status.spent.cents(),
            remaining_minor: status.remaining.cents(),
            percent_used: status.percent_used,
            over_budget: status.over_budget,
        })
        .collect();
    Ok(Json(BudgetStatusResponse { statuses }))
}
