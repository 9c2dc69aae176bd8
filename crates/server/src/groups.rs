//! Groups API endpoints: members, shared expenses, balances and settlements.

use api_types::{
    Currency, Deleted,
    group::{
        BalanceView, BalancesResponse, GroupExpenseListResponse, GroupExpenseNew,
        GroupExpenseView, GroupListResponse, GroupNew, GroupView, MemberNew, MemberRename,
        MemberView, SettlementView, SettlementsResponse, ShareView, Split,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{MoneyCents, NewGroupExpense, PercentShare, ShareEntry, SplitMethod};
use uuid::Uuid;

use crate::{ServerError, map_currency, server::ServerState};

fn api_to_currency(currency: Currency) -> engine::Currency {
    match currency {
        Currency::Inr => engine::Currency::Inr,
        Currency::Eur => engine::Currency::Eur,
        Currency::Usd => engine::Currency::Usd,
    }
}

fn map_member(member: engine::Member) -> MemberView {
    MemberView {
        id: member.id,
        name: member.name,
    }
}

fn map_group(group: engine::Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        currency: map_currency(group.currency),
        members: group.members.into_iter().map(map_member).collect(),
        created_at: group.created_at,
    }
}

fn map_share(entry: &ShareEntry) -> ShareView {
    ShareView {
        member_id: entry.member_id,
        share_minor: entry.share.cents(),
    }
}

fn map_expense(expense: engine::GroupExpense) -> GroupExpenseView {
    GroupExpenseView {
        id: expense.id,
        description: expense.description,
        amount_minor: expense.amount.cents(),
        paid_by: expense.paid_by,
        shares: expense.shares.iter().map(map_share).collect(),
        created_at: expense.created_at,
    }
}

/// An equal split without members means "everyone in the group".
fn map_split(split: Split, group: &engine::Group) -> SplitMethod {
    match split {
        Split::Equal { member_ids } if member_ids.is_empty() => SplitMethod::Equal {
            member_ids: group.members.iter().map(|m| m.id).collect(),
        },
        Split::Equal { member_ids } => SplitMethod::Equal { member_ids },
        Split::Exact { shares } => SplitMethod::Exact {
            shares: shares
                .into_iter()
                .map(|s| ShareEntry {
                    member_id: s.member_id,
                    share: MoneyCents::new(s.share_minor),
                })
                .collect(),
        },
        Split::Percentage { parts } => SplitMethod::Percentage {
            parts: parts
                .into_iter()
                .map(|p| PercentShare {
                    member_id: p.member_id,
                    percent: p.percent,
                })
                .collect(),
        },
    }
}

pub async fn list(State(state): State<ServerState>) -> Json<GroupListResponse> {
    let groups = state
        .engine
        .list_groups()
        .into_iter()
        .map(map_group)
        .collect();
    Json(GroupListResponse { groups })
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state.engine.create_group(
        &payload.name,
        payload.currency.map(api_to_currency),
        &payload.members,
    )?;
    Ok((StatusCode::CREATED, Json(map_group(group))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.group(group_id)?;
    Ok(Json(map_group(group)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Deleted>, ServerError> {
    state.engine.delete_group(group_id)?;
    Ok(Json(Deleted { id: group_id }))
}

pub async fn add_member(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<MemberView>), ServerError> {
    let member = state.engine.add_member(group_id, &payload.name)?;
    Ok((StatusCode::CREATED, Json(map_member(member))))
}

pub async fn rename_member(
    State(state): State<ServerState>,
    Path((group_id, member_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<MemberRename>,
) -> Result<Json<MemberView>, ServerError> {
    let member = state
        .engine
        .rename_member(group_id, member_id, &payload.name)?;
    Ok(Json(map_member(member)))
}

pub async fn list_expenses(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupExpenseListResponse>, ServerError> {
    let expenses = state
        .engine
        .group_expenses(group_id)?
        .into_iter()
        .map(map_expense)
        .collect();
    Ok(Json(GroupExpenseListResponse { expenses }))
}

pub async fn add_expense(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<GroupExpenseNew>,
) -> Result<(StatusCode, Json<GroupExpenseView>), ServerError> {
    let group = state.engine.group(group_id)?;
    let expense = state.engine.add_group_expense(
        group_id,
        NewGroupExpense {
            description: payload.description,
            amount: MoneyCents::new(payload.amount_minor),
            paid_by: payload.paid_by,
            split: map_split(payload.split, &group),
        },
    )?;
    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn balances(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let group = state.engine.group(group_id)?;
    let balances = state
        .engine
        .group_balances(group_id)?
        .into_iter()
        .map(|b| BalanceView {
            member_id: b.member_id,
            name: group.member_name(b.member_id),
            balance_minor: b.amount.cents(),
            balance_display: group.currency.format(b.amount),
        })
        .collect();
    Ok(Json(BalancesResponse {
        currency: map_currency(group.currency),
        balances,
    }))
}

pub async fn settlements(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<SettlementsResponse>, ServerError> {
    let group = state.engine.group(group_id)?;
    let settlements = state
        .engine
        .group_settlements(group_id)?
        .into_iter()
        .map(|t| SettlementView {
            from: t.from,
            from_name: group.member_name(t.from),
            to: t.to,
            to_name: group.member_name(t.to),
            amount_minor: t.amount.cents(),
            amount_display: group.currency.format(t.amount),
        })
        .collect();
    Ok(Json(SettlementsResponse {
        currency: map_currency(group.currency),
        settlements,
    }))
}
