use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use math_core::check_answer;
use math_core::model::{AnswerKey, Operator, QuestionId, SkillModule, UserId};
use services::{QuestionService, SeenQuestions};

use super::{AppStateArc, service_error};
use crate::state::AppState;

pub(super) fn routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/questions/next", get(next_question))
        .route("/api/answer", post(submit_answer))
}

#[derive(Debug, Deserialize)]
struct NextQuestionParams {
    user_id: Option<u64>,
    module: String,
    skill: String,
    level: Option<u8>,
    /// Comma-separated fingerprints the client has already seen.
    exclude: Option<String>,
}

/// What the client gets to see. The answer key stays parked server-side
/// until submission.
#[derive(Debug, Serialize)]
struct ServedQuestion {
    id: QuestionId,
    module: SkillModule,
    skill: String,
    level: u8,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    choices: Option<Vec<String>>,
    fingerprint: String,
}

async fn next_question(
    State(state): State<AppStateArc>,
    Query(params): Query<NextQuestionParams>,
) -> Result<Json<ServedQuestion>, (StatusCode, String)> {
    let module: SkillModule = params
        .module
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("unknown module: {}", params.module)))?;

    let level = match params.level {
        Some(level) => level,
        None => stored_level(&state, params.user_id, module, &params.skill).await?,
    };
    let seen = SeenQuestions::from_param(params.exclude.as_deref().unwrap_or(""));

    let question = {
        let mut rng = rand::rng();
        QuestionService::new()
            .next_question(module, &params.skill, level, &seen, &mut rng)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    };

    let served = ServedQuestion {
        id: question.id(),
        module,
        skill: question.skill().to_string(),
        level: question.level(),
        prompt: question.prompt().to_string(),
        choices: question.choices().map(<[String]>::to_vec),
        fingerprint: question.fingerprint(),
    };
    state.register_question(question).await;
    info!(%module, skill = %served.skill, level, "served question");
    Ok(Json(served))
}

/// When the caller does not pin a level, an operator skill is served at the
/// learner's stored difficulty level; everything else starts at 1.
async fn stored_level(
    state: &AppState,
    user_id: Option<u64>,
    module: SkillModule,
    skill: &str,
) -> Result<u8, (StatusCode, String)> {
    let Some(user_id) = user_id else {
        return Ok(1);
    };
    if module != SkillModule::MathFacts {
        return Ok(1);
    }
    let Ok(operator) = skill.parse::<Operator>() else {
        return Ok(1);
    };
    let progress = state
        .progress()
        .progress(UserId::new(user_id))
        .await
        .map_err(service_error)?;
    Ok(progress.level(operator))
}

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    question_id: QuestionId,
    answer: String,
}

#[derive(Debug, Serialize)]
struct AnswerResponse {
    correct: bool,
    correct_answer: String,
}

async fn submit_answer(
    State(state): State<AppStateArc>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, (StatusCode, String)> {
    let question = state.take_question(req.question_id).await.ok_or((
        StatusCode::NOT_FOUND,
        format!("unknown or already answered question {}", req.question_id),
    ))?;

    let correct = check_answer(&question, &req.answer);
    let correct_answer = match question.answer() {
        AnswerKey::Exact(answer) => answer.clone(),
        AnswerKey::MultiSelect { correct, .. } => correct.join(","),
    };
    info!(question_id = %req.question_id, correct, "answer graded");
    Ok(Json(AnswerResponse {
        correct,
        correct_answer,
    }))
}
