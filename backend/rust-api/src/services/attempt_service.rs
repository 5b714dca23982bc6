use std::sync::Arc;

use anyhow::Context;

use super::grading;
use crate::error::{QuizError, QuizResult};
use crate::metrics::{ANSWERS_GRADED_TOTAL, ATTEMPTS_SUBMITTED_TOTAL};
use crate::models::{Attempt, AttemptResponse, Principal, ScoreResponse, SubmitAnswersRequest};
use crate::repository::{AttemptRepository, QuizRepository};

/// Scores submissions and guards read access to stored attempts.
pub struct AttemptService {
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl AttemptService {
    pub fn new(quizzes: Arc<dyn QuizRepository>, attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { quizzes, attempts }
    }

    /// Grades a full answer set against the quiz's current questions and
    /// stores the attempt.
    ///
    /// The attempt shell is written before grading starts. If a later entry
    /// is rejected, the shell stays `pending` with the answers recorded so far.
    pub async fn submit(
        &self,
        quiz_id: &str,
        req: &SubmitAnswersRequest,
        principal: &Principal,
    ) -> QuizResult<ScoreResponse> {
        tracing::info!(
            "Submitting answers for quiz_id={} by user_id={}",
            quiz_id,
            principal.user_id
        );

        let result = self.grade_and_record(quiz_id, req, principal).await;

        match &result {
            Ok(score) => {
                ATTEMPTS_SUBMITTED_TOTAL
                    .with_label_values(&["completed"])
                    .inc();
                tracing::info!(
                    "Quiz attempt saved successfully. Score: {}/{}",
                    score.score,
                    score.total
                );
            }
            Err(QuizError::Internal(e)) => {
                ATTEMPTS_SUBMITTED_TOTAL.with_label_values(&["failed"]).inc();
                tracing::error!(
                    "Error while submitting answers for quiz_id={}: {:#}",
                    quiz_id,
                    e
                );
            }
            Err(e) => {
                ATTEMPTS_SUBMITTED_TOTAL
                    .with_label_values(&["rejected"])
                    .inc();
                tracing::warn!("Submission for quiz_id={} rejected: {}", quiz_id, e);
            }
        }

        result
    }

    async fn grade_and_record(
        &self,
        quiz_id: &str,
        req: &SubmitAnswersRequest,
        principal: &Principal,
    ) -> QuizResult<ScoreResponse> {
        let quiz = self
            .quizzes
            .find_active_by_id(quiz_id)
            .await?
            .ok_or_else(|| QuizError::QuizNotFound(quiz_id.to_string()))?;

        if req.answers.len() != quiz.questions.len() {
            return Err(QuizError::InvalidAnswer(
                "Must answer all questions".to_string(),
            ));
        }

        let total = u32::try_from(quiz.questions.len()).context("Question count overflow")?;

        let attempt = Attempt::shell(&principal.user_id, &quiz.id, total);
        self.attempts.insert(&attempt).await?;
        tracing::debug!("Created attempt shell {}", attempt.id);

        let mut score = 0u32;
        for entry in &req.answers {
            let question = quiz
                .questions
                .iter()
                .find(|q| q.id == entry.question_id)
                .ok_or_else(|| {
                    QuizError::InvalidAnswer(format!("Invalid question id: {}", entry.question_id))
                })?;

            let graded = grading::grade(question, entry)?;

            ANSWERS_GRADED_TOTAL
                .with_label_values(&[question.question_type().as_str(), bool_label(graded.is_correct)])
                .inc();

            if graded.is_correct {
                score += 1;
            }

            self.attempts
                .push_answer(&attempt.id, &graded.into_user_answer(&question.id))
                .await?;
        }

        self.attempts.finalize(&attempt.id, score).await?;

        Ok(ScoreResponse { score, total })
    }

    /// Attempts owned by the acting user.
    pub async fn my_attempts(&self, principal: &Principal) -> QuizResult<Vec<AttemptResponse>> {
        tracing::info!("Fetching attempts for user_id={}", principal.user_id);
        let attempts = self.attempts.find_by_user(&principal.user_id).await?;
        Ok(attempts.into_iter().map(AttemptResponse::from).collect())
    }

    /// Every attempt in the system. Admins only.
    pub async fn all_attempts(&self, principal: &Principal) -> QuizResult<Vec<AttemptResponse>> {
        if !principal.is_admin() {
            tracing::warn!(
                "Access denied for user_id={} while fetching all attempts",
                principal.user_id
            );
            return Err(QuizError::AccessDenied);
        }
        let attempts = self.attempts.find_all().await?;
        Ok(attempts.into_iter().map(AttemptResponse::from).collect())
    }

    /// One attempt, visible to its owner and to admins.
    pub async fn attempt_details(
        &self,
        attempt_id: &str,
        principal: &Principal,
    ) -> QuizResult<AttemptResponse> {
        tracing::info!(
            "Fetching attempt details for attempt_id={} by user_id={}",
            attempt_id,
            principal.user_id
        );

        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| QuizError::AttemptNotFound(attempt_id.to_string()))?;

        if !principal.is_admin() && attempt.user_id != principal.user_id {
            tracing::warn!(
                "Unauthorized access attempt. user_id={} tried to access attempt_id={}",
                principal.user_id,
                attempt_id
            );
            return Err(QuizError::AccessDenied);
        }

        Ok(AttemptResponse::from(attempt))
    }
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
