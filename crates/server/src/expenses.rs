//! Personal expenses API endpoints.

use api_types::{
    Deleted,
    expense::{ExpenseListResponse, ExpenseNew, ExpenseQuery, ExpenseView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{EngineError, ExpenseFilter, MoneyCents, NewExpense};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_expense(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        date: expense.date,
        description: expense.description,
        amount_minor: expense.amount.cents(),
        category: expense.category,
        merchant: expense.merchant,
        payment_method: expense.payment_method,
        notes: expense.notes,
        tags: expense.tags,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Err(ServerError::Generic(
            "from must not be after to".to_string(),
        ));
    }

    let filter = ExpenseFilter {
        category: query.category,
        from: query.from,
        to: query.to,
    };
    let expenses = state.engine.list_expenses(&filter);
    let total = MoneyCents::checked_sum(expenses.iter().map(|e| e.amount)).ok_or_else(|| {
        EngineError::InvalidAmount("expense total is out of range".to_string())
    })?;
    Ok(Json(ExpenseListResponse {
        expenses: expenses.into_iter().map(map_expense).collect(),
        total_minor: total.cents(),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state.engine.create_expense(NewExpense {
        date: payload.date,
        description: payload.description,
        amount: MoneyCents::new(payload.amount_minor),
        category: payload.category,
        merchant: payload.merchant,
        payment_method: payload.payment_method,
        notes: payload.notes,
        tags: payload.tags,
    })?;
    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(expense_id)?;
    Ok(Json(map_expense(expense)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<Deleted>, ServerError> {
    state.engine.delete_expense(expense_id)?;
    Ok(Json(Deleted { id: expense_id }))
}
