use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use std::sync::Arc;

use crate::{budgets, expenses, groups, import, rules};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/groups", get(groups::list).post(groups::create))
        .route("/groups/{group_id}", get(groups::get).delete(groups::remove))
        .route("/groups/{group_id}/members", post(groups::add_member))
        .route(
            "/groups/{group_id}/members/{member_id}",
            patch(groups::rename_member),
        )
        .route(
            "/groups/{group_id}/expenses",
            get(groups::list_expenses).post(groups::add_expense),
        )
        .route("/groups/{group_id}/balances", get(groups::balances))
        .route("/groups/{group_id}/settlements", get(groups::settlements))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{expense_id}",
            get(expenses::get).delete(expenses::remove),
        )
        .route("/rules", get(rules::list).post(rules::create))
        .route("/rules/test", post(rules::test))
        .route(
            "/rules/{rule_id}",
            patch(rules::update).delete(rules::remove),
        )
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route("/budgets/status", get(budgets::status))
        .route("/budgets/{budget_id}", delete(budgets::remove))
        .route("/import/csv", post(import::csv))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
