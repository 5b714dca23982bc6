use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::QuizError,
    extractors::AppJson,
    models::{
        user::{AuthResponse, LoginRequest, RegisterRequest, UserProfile},
        Principal,
    },
    services::AppState,
};

/// POST /api/v1/auth/register - Register a new user
pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, QuizError> {
    req.validate()?;
    tracing::info!("Registering new user: {}", req.email);

    let response = state.auth_service().register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, QuizError> {
    req.validate()?;
    let response = state.auth_service().login(req).await?;
    Ok(Json(response))
}

/// GET /api/v1/auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<UserProfile>, QuizError> {
    let profile = state.auth_service().current_user(&principal).await?;
    Ok(Json(profile))
}
