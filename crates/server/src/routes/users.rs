use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use math_core::model::{Grade, UserId};
use services::Recommendation;

use super::{AppStateArc, service_error};

pub(super) fn routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/users", post(create_user))
        .route("/api/users/:id/balance", get(balance))
        .route("/api/users/:id/tokens/flush", post(flush_tokens))
        .route("/api/recommendations", get(recommendations))
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    user_id: u64,
    grade: String,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    user_id: u64,
    grade: &'static str,
    tokens: u32,
}

async fn create_user(
    State(state): State<AppStateArc>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), (StatusCode, String)> {
    let grade: Grade = req
        .grade
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("unknown grade: {}", req.grade)))?;

    let progress = state
        .progress()
        .create_user(UserId::new(req.user_id), grade)
        .await
        .map_err(service_error)?;

    info!(user = req.user_id, %grade, "learner created");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            user_id: req.user_id,
            grade: grade.as_str(),
            tokens: progress.tokens(),
        }),
    ))
}

#[derive(Debug, Serialize)]
struct BalanceResponse {
    user_id: u64,
    balance: u32,
}

/// Authoritative balance for the client's reconciliation poll.
async fn balance(
    State(state): State<AppStateArc>,
    Path(id): Path<u64>,
) -> Result<Json<BalanceResponse>, (StatusCode, String)> {
    let balance = state
        .progress()
        .balance(UserId::new(id))
        .await
        .map_err(service_error)?;
    Ok(Json(BalanceResponse {
        user_id: id,
        balance,
    }))
}

#[derive(Debug, Deserialize)]
struct FlushRequest {
    delta: u32,
}

/// Landing point for the client's fire-and-forget unload flush.
async fn flush_tokens(
    State(state): State<AppStateArc>,
    Path(id): Path<u64>,
    Json(req): Json<FlushRequest>,
) -> Result<Json<BalanceResponse>, (StatusCode, String)> {
    let user = UserId::new(id);
    let balance = state
        .progress()
        .flush_tokens(user, req.delta)
        .await
        .map_err(service_error)?;

    state.publish_balance(user, balance);
    info!(%user, delta = req.delta, balance, "queued tokens flushed");
    Ok(Json(BalanceResponse {
        user_id: id,
        balance,
    }))
}

#[derive(Debug, Deserialize)]
struct RecommendationParams {
    user_id: u64,
}

async fn recommendations(
    State(state): State<AppStateArc>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<Vec<Recommendation>>, (StatusCode, String)> {
    let recs = state
        .progress()
        .recommendations(UserId::new(params.user_id))
        .await
        .map_err(service_error)?;
    Ok(Json(recs))
}
