use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    error::QuizError,
    extractors::AppJson,
    models::{AttemptResponse, Principal, ScoreResponse, SubmitAnswersRequest},
    services::AppState,
};

/// POST /api/v1/attempts/{quiz_id} - grade a full submission
pub async fn submit_attempt(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(quiz_id): Path<String>,
    AppJson(req): AppJson<SubmitAnswersRequest>,
) -> Result<Json<ScoreResponse>, QuizError> {
    tracing::info!(
        "User {} submitting {} answers for quiz {}",
        principal.user_id,
        req.answers.len(),
        quiz_id
    );
    let score = state
        .attempt_service()
        .submit(&quiz_id, &req, &principal)
        .await?;
    Ok(Json(score))
}

/// GET /api/v1/attempts/my
pub async fn my_attempts(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<AttemptResponse>>, QuizError> {
    let attempts = state.attempt_service().my_attempts(&principal).await?;
    Ok(Json(attempts))
}

/// GET /api/v1/attempts - every attempt, admins only
pub async fn all_attempts(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<AttemptResponse>>, QuizError> {
    let attempts = state.attempt_service().all_attempts(&principal).await?;
    Ok(Json(attempts))
}

/// GET /api/v1/attempts/{id} - owner or admin
pub async fn get_attempt(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(attempt_id): Path<String>,
) -> Result<Json<AttemptResponse>, QuizError> {
    let attempt = state
        .attempt_service()
        .attempt_details(&attempt_id, &principal)
        .await?;
    Ok(Json(attempt))
}
