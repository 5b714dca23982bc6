use std::sync::Arc;

use uuid::Uuid;

use super::question_validator::validate_question;
use super::quiz_service::require_admin;
use crate::error::{QuizError, QuizResult};
use crate::models::quiz::QuestionRequest;
use crate::models::{Principal, Question};
use crate::repository::QuizRepository;

pub struct QuestionService {
    quizzes: Arc<dyn QuizRepository>,
}

impl QuestionService {
    pub fn new(quizzes: Arc<dyn QuizRepository>) -> Self {
        Self { quizzes }
    }

    /// Adds a validated question to an active quiz. Returns the stored
    /// question, including option ids and correctness flags.
    pub async fn add_question(
        &self,
        quiz_id: &str,
        req: QuestionRequest,
        principal: &Principal,
    ) -> QuizResult<Question> {
        require_admin(principal)?;
        tracing::info!("Adding question to quiz_id={}", quiz_id);

        if self.quizzes.find_active_by_id(quiz_id).await?.is_none() {
            return Err(QuizError::QuizNotFound(quiz_id.to_string()));
        }

        let question = Question {
            id: Uuid::new_v4().to_string(),
            kind: validate_question(&req)?,
            text: req.text,
            active: true,
        };

        if !self.quizzes.push_question(quiz_id, &question).await? {
            return Err(QuizError::QuizNotFound(quiz_id.to_string()));
        }
        tracing::info!(
            "Question {} ({}) added to quiz_id={}",
            question.id,
            question.question_type(),
            quiz_id
        );

        Ok(question)
    }

    /// Replaces text, type and answer data of an active question. Options
    /// are recreated with new ids.
    pub async fn update_question(
        &self,
        question_id: &str,
        req: QuestionRequest,
        principal: &Principal,
    ) -> QuizResult<Question> {
        require_admin(principal)?;
        tracing::info!("Updating question_id={}", question_id);

        let quiz = self
            .quizzes
            .find_by_question_id(question_id)
            .await?
            .filter(|quiz| {
                quiz.questions
                    .iter()
                    .any(|q| q.id == question_id && q.active)
            })
            .ok_or_else(|| QuizError::QuestionNotFound(question_id.to_string()))?;

        if !quiz.active {
            return Err(QuizError::QuizNotFound(quiz.id));
        }

        let question = Question {
            id: question_id.to_string(),
            kind: validate_question(&req)?,
            text: req.text,
            active: true,
        };

        if !self.quizzes.replace_question(&quiz.id, &question).await? {
            return Err(QuizError::QuestionNotFound(question_id.to_string()));
        }
        tracing::info!("Question id={} updated successfully", question_id);

        Ok(question)
    }

    /// Soft delete. The question disappears from new attempts; old attempts
    /// still reference its id.
    pub async fn delete_question(&self, question_id: &str, principal: &Principal) -> QuizResult<()> {
        require_admin(principal)?;
        tracing::info!("Deleting question_id={}", question_id);

        if !self.quizzes.deactivate_question(question_id).await? {
            return Err(QuizError::QuestionNotFound(question_id.to_string()));
        }
        tracing::info!("Question id={} marked inactive", question_id);
        Ok(())
    }
}
