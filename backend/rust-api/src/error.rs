use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Every failure the quiz core can report. Handlers return this directly;
/// the HTTP status is derived from the variant.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Quiz not found or inactive: {0}")]
    QuizNotFound(String),

    #[error("Question not found or inactive: {0}")]
    QuestionNotFound(String),

    #[error("Invalid answers submitted: {0}")]
    InvalidAnswer(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Attempt not found with id {0}")]
    AttemptNotFound(String),

    #[error("Access denied")]
    AccessDenied,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage or other unexpected failures. The message is never sent to clients.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type QuizResult<T> = Result<T, QuizError>;

impl QuizError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QuizError::QuizNotFound(_)
            | QuizError::QuestionNotFound(_)
            | QuizError::AttemptNotFound(_) => StatusCode::NOT_FOUND,
            QuizError::InvalidAnswer(_)
            | QuizError::InvalidQuestion(_)
            | QuizError::Validation(_) => StatusCode::BAD_REQUEST,
            QuizError::AccessDenied => StatusCode::FORBIDDEN,
            QuizError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            QuizError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            QuizError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable kind, used as the `error` field of responses.
    pub fn kind(&self) -> &'static str {
        match self {
            QuizError::QuizNotFound(_) => "QUIZ_NOT_FOUND",
            QuizError::QuestionNotFound(_) => "QUESTION_NOT_FOUND",
            QuizError::InvalidAnswer(_) => "INVALID_ANSWER",
            QuizError::InvalidQuestion(_) => "INVALID_QUESTION",
            QuizError::AttemptNotFound(_) => "ATTEMPT_NOT_FOUND",
            QuizError::AccessDenied => "ACCESS_DENIED",
            QuizError::Unauthorized(_) => "UNAUTHORIZED",
            QuizError::UserAlreadyExists(_) => "USER_ALREADY_EXISTS",
            QuizError::Validation(_) => "VALIDATION_ERROR",
            QuizError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for QuizError {
    fn from(errors: validator::ValidationErrors) -> Self {
        QuizError::Validation(errors.to_string())
    }
}

impl From<mongodb::error::Error> for QuizError {
    fn from(error: mongodb::error::Error) -> Self {
        QuizError::Internal(error.into())
    }
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            QuizError::Internal(e) => {
                tracing::error!("Unexpected error: {:#}", e);
                "An unexpected error occurred".to_string()
            }
            other => {
                tracing::warn!("{} ({})", other, other.kind());
                other.to_string()
            }
        };

        let body = json!({
            "status": status.as_u16(),
            "error": self.kind(),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_distinct_statuses() {
        assert_eq!(
            QuizError::QuizNotFound("1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            QuizError::InvalidAnswer("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(QuizError::AccessDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            QuizError::AttemptNotFound("1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            QuizError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn internal_error_message_is_hidden() {
        let response = QuizError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert!(!body.to_string().contains("connection refused"));
    }
}
