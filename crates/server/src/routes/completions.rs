use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use math_core::model::{Operator, SkillModule, UserId};
use services::{CompletionOutcome, SkillCompletion};

use super::{AppStateArc, service_error};

pub(super) fn routes() -> Router<AppStateArc> {
    Router::new().route("/api/:module/complete", post(complete_skill))
}

#[derive(Debug, Deserialize)]
struct CompleteRequest {
    user_id: u64,
    operator: Option<Operator>,
    skill: String,
    correct: u32,
    total: u32,
    duration_secs: u32,
}

async fn complete_skill(
    State(state): State<AppStateArc>,
    Path(module): Path<String>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<CompletionOutcome>, (StatusCode, String)> {
    let module: SkillModule = module
        .parse()
        .map_err(|_| (StatusCode::NOT_FOUND, format!("unknown module: {module}")))?;

    let user = UserId::new(req.user_id);
    let outcome = state
        .progress()
        .complete_skill(
            user,
            SkillCompletion {
                module,
                operator: req.operator,
                skill: req.skill,
                correct: req.correct,
                total: req.total,
                duration_secs: req.duration_secs,
            },
        )
        .await
        .map_err(service_error)?;

    state.publish_balance(user, outcome.balance);
    info!(
        %user,
        %module,
        passed = outcome.score.passed,
        mastered = outcome.mastered,
        tokens = outcome.score.tokens_earned,
        "session completed"
    );
    Ok(Json(outcome))
}
