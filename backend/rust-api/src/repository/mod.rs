//! Storage ports used by the services, with MongoDB and in-memory adapters.
//!
//! Every method is a single atomic write or read. Errors are opaque
//! (`anyhow`) and surface as internal errors.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Attempt, Question, Quiz, User, UserAnswer};

pub mod memory;
pub mod mongo;

#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn insert(&self, quiz: &Quiz) -> Result<()>;

    /// Active quiz with its active questions only.
    async fn find_active_by_id(&self, id: &str) -> Result<Option<Quiz>>;

    async fn find_all_active(&self) -> Result<Vec<Quiz>>;

    /// Returns false when no active quiz matched.
    async fn update_title(&self, id: &str, title: &str) -> Result<bool>;

    /// Soft delete. Returns false when no active quiz matched.
    async fn deactivate(&self, id: &str) -> Result<bool>;

    /// Appends a question to an active quiz. Returns false when no active quiz matched.
    async fn push_question(&self, quiz_id: &str, question: &Question) -> Result<bool>;

    /// Quiz (active or not, all questions) that contains the question.
    async fn find_by_question_id(&self, question_id: &str) -> Result<Option<Quiz>>;

    /// Replaces the stored question with the same id inside the quiz.
    async fn replace_question(&self, quiz_id: &str, question: &Question) -> Result<bool>;

    /// Soft delete of an active question. Returns false when nothing matched.
    async fn deactivate_question(&self, question_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn insert(&self, attempt: &Attempt) -> Result<()>;

    async fn push_answer(&self, attempt_id: &str, answer: &UserAnswer) -> Result<()>;

    /// Sets the final score and marks the attempt completed.
    async fn finalize(&self, attempt_id: &str, score: u32) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Attempt>>;

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Attempt>>;

    async fn find_all(&self) -> Result<Vec<Attempt>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn touch_last_login(&self, id: &str) -> Result<()>;
}
