//! Bank statement import endpoint.
//!
//! The request body is the raw CSV text.

use api_types::import::{ImportQuery, ImportResponse, ImportedRow};
use axum::{
    Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState};

pub async fn csv(
    State(state): State<ServerState>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<Json<ImportResponse>, ServerError> {
    if body.trim().is_empty() {
        return Err(ServerError::Generic("empty CSV body".to_string()));
    }

    let committed = query.commit.unwrap_or(false);
    let report = state.engine.import_csv(&body, committed)?;
    let records = report
        .records
        .into_iter()
        .map(|r| ImportedRow {
            date: r.date,
            description: r.description,
            amount_minor: r.amount.cents(),
            category: r.category,
        })
        .collect();

    Ok(Json(ImportResponse {
        committed,
        records,
        skipped: report.skipped,
    }))
}
