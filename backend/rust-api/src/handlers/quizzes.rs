use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{error::QuizError, models::QuizResponse, services::AppState};

/// GET /api/v1/quizzes - active quizzes as candidates see them
pub async fn list_quizzes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<QuizResponse>>, QuizError> {
    let quizzes = state.quiz_service().list_quizzes().await?;
    Ok(Json(quizzes))
}

/// GET /api/v1/quizzes/{id}
pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
) -> Result<Json<QuizResponse>, QuizError> {
    let quiz = state.quiz_service().get_quiz(&quiz_id).await?;
    Ok(Json(quiz))
}
