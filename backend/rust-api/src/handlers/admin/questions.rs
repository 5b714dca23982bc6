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
    models::{quiz::QuestionRequest, Principal, Question},
    services::AppState,
};

/// POST /api/v1/admin/quizzes/{id}/questions
pub async fn add_question(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(quiz_id): Path<String>,
    AppJson(req): AppJson<QuestionRequest>,
) -> Result<impl IntoResponse, QuizError> {
    req.validate()?;
    let question = state
        .question_service()
        .add_question(&quiz_id, req, &principal)
        .await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// PUT /api/v1/admin/questions/{id}
pub async fn update_question(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(question_id): Path<String>,
    AppJson(req): AppJson<QuestionRequest>,
) -> Result<Json<Question>, QuizError> {
    req.validate()?;
    let question = state
        .question_service()
        .update_question(&question_id, req, &principal)
        .await?;
    Ok(Json(question))
}

/// DELETE /api/v1/admin/questions/{id}
pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(question_id): Path<String>,
) -> Result<StatusCode, QuizError> {
    state
        .question_service()
        .delete_question(&question_id, &principal)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
