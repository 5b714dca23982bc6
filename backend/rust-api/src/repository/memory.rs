use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AttemptRepository, QuizRepository, UserRepository};
use crate::models::{Attempt, AttemptStatus, Question, Quiz, User, UserAnswer};

/// Process-local quiz store. Insertion order is kept for listings.
#[derive(Default)]
pub struct MemoryQuizRepository {
    quizzes: RwLock<Vec<Quiz>>,
}

impl MemoryQuizRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizRepository for MemoryQuizRepository {
    async fn insert(&self, quiz: &Quiz) -> Result<()> {
        self.quizzes.write().await.push(quiz.clone());
        Ok(())
    }

    async fn find_active_by_id(&self, id: &str) -> Result<Option<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes
            .iter()
            .find(|q| q.id == id && q.active)
            .cloned()
            .map(Quiz::with_active_questions))
    }

    async fn find_all_active(&self) -> Result<Vec<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes
            .iter()
            .filter(|q| q.active)
            .cloned()
            .map(Quiz::with_active_questions)
            .collect())
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<bool> {
        let mut quizzes = self.quizzes.write().await;
        match quizzes.iter_mut().find(|q| q.id == id && q.active) {
            Some(quiz) => {
                quiz.title = title.to_string();
                quiz.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate(&self, id: &str) -> Result<bool> {
        let mut quizzes = self.quizzes.write().await;
        match quizzes.iter_mut().find(|q| q.id == id && q.active) {
            Some(quiz) => {
                quiz.active = false;
                quiz.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn push_question(&self, quiz_id: &str, question: &Question) -> Result<bool> {
        let mut quizzes = self.quizzes.write().await;
        match quizzes.iter_mut().find(|q| q.id == quiz_id && q.active) {
            Some(quiz) => {
                quiz.questions.push(question.clone());
                quiz.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_question_id(&self, question_id: &str) -> Result<Option<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes
            .iter()
            .find(|q| q.questions.iter().any(|question| question.id == question_id))
            .cloned())
    }

    async fn replace_question(&self, quiz_id: &str, question: &Question) -> Result<bool> {
        let mut quizzes = self.quizzes.write().await;
        let slot = quizzes
            .iter_mut()
            .find(|q| q.id == quiz_id)
            .and_then(|quiz| quiz.questions.iter_mut().find(|q| q.id == question.id));
        match slot {
            Some(existing) => {
                *existing = question.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate_question(&self, question_id: &str) -> Result<bool> {
        let mut quizzes = self.quizzes.write().await;
        let question = quizzes
            .iter_mut()
            .flat_map(|quiz| quiz.questions.iter_mut())
            .find(|q| q.id == question_id && q.active);
        match question {
            Some(question) => {
                question.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryAttemptRepository {
    attempts: RwLock<Vec<Attempt>>,
}

impl MemoryAttemptRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptRepository for MemoryAttemptRepository {
    async fn insert(&self, attempt: &Attempt) -> Result<()> {
        self.attempts.write().await.push(attempt.clone());
        Ok(())
    }

    async fn push_answer(&self, attempt_id: &str, answer: &UserAnswer) -> Result<()> {
        let mut attempts = self.attempts.write().await;
        let attempt = attempts
            .iter_mut()
            .find(|a| a.id == attempt_id)
            .ok_or_else(|| anyhow!("Attempt {} not found while saving answer", attempt_id))?;
        attempt.answers.push(answer.clone());
        Ok(())
    }

    async fn finalize(&self, attempt_id: &str, score: u32) -> Result<()> {
        let mut attempts = self.attempts.write().await;
        let attempt = attempts
            .iter_mut()
            .find(|a| a.id == attempt_id)
            .ok_or_else(|| anyhow!("Attempt {} not found while finalizing", attempt_id))?;
        attempt.score = score;
        attempt.status = AttemptStatus::Completed;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Attempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Attempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Attempt>> {
        Ok(self.attempts.read().await.clone())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            anyhow::bail!("duplicate email: {}", user.email);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn touch_last_login(&self, id: &str) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer() -> UserAnswer {
        UserAnswer {
            id: "answer-1".to_string(),
            question_id: "q1".to_string(),
            selected_option_ids: None,
            answer_text: Some("rome".to_string()),
            is_correct: true,
        }
    }

    #[tokio::test]
    async fn writes_to_missing_attempt_fail() {
        let repo = MemoryAttemptRepository::new();

        let err = repo.push_answer("missing", &answer()).await.unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert!(repo.finalize("missing", 1).await.is_err());
    }

    #[tokio::test]
    async fn answers_and_score_land_on_the_shell() {
        let repo = MemoryAttemptRepository::new();
        let shell = Attempt::shell("alice", "quiz-1", 1);
        repo.insert(&shell).await.unwrap();

        repo.push_answer(&shell.id, &answer()).await.unwrap();
        repo.finalize(&shell.id, 1).await.unwrap();

        let stored = repo.find_by_id(&shell.id).await.unwrap().unwrap();
        assert_eq!(stored.answers, vec![answer()]);
        assert_eq!(stored.score, 1);
        assert_eq!(stored.status, AttemptStatus::Completed);
    }
}
