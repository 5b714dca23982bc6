use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::QuizError,
    extractors::AppJson,
    models::{
        quiz::{CreateQuizRequest, UpdateQuizRequest},
        Principal, QuizResponse,
    },
    services::AppState,
};

/// POST /api/v1/admin/quizzes
pub async fn create_quiz(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    AppJson(req): AppJson<CreateQuizRequest>,
) -> Result<impl IntoResponse, QuizError> {
    req.validate()?;
    let quiz = state.quiz_service().create_quiz(req, &principal).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// PUT /api/v1/admin/quizzes/{id}
pub async fn update_quiz(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(quiz_id): Path<String>,
    AppJson(req): AppJson<UpdateQuizRequest>,
) -> Result<Json<QuizResponse>, QuizError> {
    req.validate()?;
    let quiz = state
        .quiz_service()
        .update_quiz(&quiz_id, req, &principal)
        .await?;
    Ok(Json(quiz))
}

/// DELETE /api/v1/admin/quizzes/{id}
pub async fn delete_quiz(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(quiz_id): Path<String>,
) -> Result<StatusCode, QuizError> {
    state.quiz_service().delete_quiz(&quiz_id, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}
