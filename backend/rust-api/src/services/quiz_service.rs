use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{QuizError, QuizResult};
use crate::models::quiz::{CreateQuizRequest, UpdateQuizRequest};
use crate::models::{Principal, Quiz, QuizResponse};
use crate::repository::QuizRepository;

pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
}

impl QuizService {
    pub fn new(quizzes: Arc<dyn QuizRepository>) -> Self {
        Self { quizzes }
    }

    pub async fn create_quiz(
        &self,
        req: CreateQuizRequest,
        principal: &Principal,
    ) -> QuizResult<QuizResponse> {
        require_admin(principal)?;
        tracing::info!(
            "Creating quiz '{}' by user_id={}",
            req.title,
            principal.user_id
        );

        let now = Utc::now();
        let quiz = Quiz {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            created_by: principal.user_id.clone(),
            active: true,
            questions: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.quizzes.insert(&quiz).await?;

        Ok(QuizResponse::from(quiz))
    }

    pub async fn get_quiz(&self, quiz_id: &str) -> QuizResult<QuizResponse> {
        tracing::info!("Fetching quiz with id={}", quiz_id);
        let quiz = self.find_active(quiz_id).await?;
        Ok(QuizResponse::from(quiz))
    }

    pub async fn list_quizzes(&self) -> QuizResult<Vec<QuizResponse>> {
        let quizzes = self.quizzes.find_all_active().await?;
        Ok(quizzes.into_iter().map(QuizResponse::from).collect())
    }

    /// Renames a quiz. Only its creator may do this.
    pub async fn update_quiz(
        &self,
        quiz_id: &str,
        req: UpdateQuizRequest,
        principal: &Principal,
    ) -> QuizResult<QuizResponse> {
        require_admin(principal)?;
        let mut quiz = self.find_active(quiz_id).await?;
        require_creator(&quiz, principal)?;

        if !self.quizzes.update_title(quiz_id, &req.title).await? {
            return Err(QuizError::QuizNotFound(quiz_id.to_string()));
        }
        tracing::info!("Quiz id={} updated successfully", quiz_id);

        quiz.title = req.title;
        Ok(QuizResponse::from(quiz))
    }

    /// Soft delete. Questions stay stored so past attempts keep resolving.
    pub async fn delete_quiz(&self, quiz_id: &str, principal: &Principal) -> QuizResult<()> {
        require_admin(principal)?;
        let quiz = self.find_active(quiz_id).await?;
        require_creator(&quiz, principal)?;

        if !self.quizzes.deactivate(quiz_id).await? {
            return Err(QuizError::QuizNotFound(quiz_id.to_string()));
        }
        tracing::info!("Quiz id={} marked inactive (soft deleted)", quiz_id);
        Ok(())
    }

    async fn find_active(&self, quiz_id: &str) -> QuizResult<Quiz> {
        self.quizzes
            .find_active_by_id(quiz_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Quiz with id={} not found or inactive", quiz_id);
                QuizError::QuizNotFound(quiz_id.to_string())
            })
    }
}

pub(crate) fn require_admin(principal: &Principal) -> QuizResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        tracing::warn!("Access denied: admin role required for user_id={}", principal.user_id);
        Err(QuizError::AccessDenied)
    }
}

fn require_creator(quiz: &Quiz, principal: &Principal) -> QuizResult<()> {
    if quiz.created_by == principal.user_id {
        Ok(())
    } else {
        tracing::warn!(
            "User id={} tried to modify quiz id={} without permission",
            principal.user_id,
            quiz.id
        );
        Err(QuizError::AccessDenied)
    }
}
