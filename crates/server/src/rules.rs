//! Categorisation rules API endpoints.

use api_types::{
    Deleted,
    rule::{
        ActionView, ConditionView, MatchedRuleView, RuleListResponse, RuleNew, RuleTest,
        RuleTestResponse, RuleUpdate, RuleView, Suggestions,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Condition, ExpenseRecord, Field, MoneyCents, NewRule, Operator, RuleAction};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_condition(condition: engine::Condition) -> ConditionView {
    ConditionView {
        field: condition.field.as_str().to_string(),
        operator: condition.operator.as_str().to_string(),
        value: condition.value,
    }
}

fn api_to_condition(condition: ConditionView) -> Condition {
    Condition {
        field: Field::from(condition.field),
        operator: Operator::parse(&condition.operator),
        value: condition.value,
    }
}

fn map_action(action: RuleAction) -> ActionView {
    match action {
        RuleAction::SetCategory(category) => ActionView::SetCategory(category),
        RuleAction::AddTag(tag) => ActionView::AddTag(tag),
    }
}

fn api_to_action(action: ActionView) -> RuleAction {
    match action {
        ActionView::SetCategory(category) => RuleAction::SetCategory(category),
        ActionView::AddTag(tag) => RuleAction::AddTag(tag),
    }
}

fn map_rule(rule: engine::Rule) -> RuleView {
    RuleView {
        id: rule.id,
        name: rule.name,
        active: rule.active,
        condition: map_condition(rule.condition),
        actions: rule.actions.into_iter().map(map_action).collect(),
    }
}

pub async fn list(State(state): State<ServerState>) -> Json<RuleListResponse> {
    let rules = state
        .engine
        .list_rules()
        .into_iter()
        .map(map_rule)
        .collect();
    Json(RuleListResponse { rules })
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RuleNew>,
) -> Result<(StatusCode, Json<RuleView>), ServerError> {
    let rule = state.engine.create_rule(NewRule {
        name: payload.name,
        active: payload.active,
        condition: api_to_condition(payload.condition),
        actions: payload.actions.into_iter().map(api_to_action).collect(),
    })?;
    Ok((StatusCode::CREATED, Json(map_rule(rule))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(rule_id): Path<Uuid>,
    Json(payload): Json<RuleUpdate>,
) -> Result<Json<RuleView>, ServerError> {
    let update = engine::RuleUpdate {
        name: payload.name,
        active: payload.active,
        condition: payload.condition.map(api_to_condition),
        actions: payload
            .actions
            .map(|actions| actions.into_iter().map(api_to_action).collect()),
    };
    if update.is_empty() {
        return Err(ServerError::Generic(
            "provide at least one of name, active, condition or actions".to_string(),
        ));
    }

    let rule = state.engine.update_rule(rule_id, update)?;
    Ok(Json(map_rule(rule)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(rule_id): Path<Uuid>,
) -> Result<Json<Deleted>, ServerError> {
    state.engine.delete_rule(rule_id)?;
    Ok(Json(Deleted { id: rule_id }))
}

/// Evaluates the stored rules against an ad-hoc record.
pub async fn test(
    State(state): State<ServerState>,
    Json(payload): Json<RuleTest>,
) -> Json<RuleTestResponse> {
    let record = ExpenseRecord {
        description: payload.description,
        amount: payload.amount_minor.map(MoneyCents::new),
        category: payload.category,
        merchant: payload.merchant,
        payment_method: payload.payment_method,
        notes: payload.notes,
        date: payload.date,
    };
    let suggestions = state.engine.test_rules(&record);

    Json(RuleTestResponse {
        matched_rules: suggestions
            .matched_rules
            .into_iter()
            .map(|m| MatchedRuleView {
                id: m.id,
                name: m.name,
            })
            .collect(),
        suggestions: Suggestions {
            category: suggestions.category,
            tags: suggestions.tags,
        },
    })
}
