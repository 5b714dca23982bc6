use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, DateTime as BsonDateTime},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use serde::de::DeserializeOwned;

use super::{AttemptRepository, QuizRepository, UserRepository};
use crate::models::{Attempt, Question, Quiz, User, UserAnswer};

pub const USERS_COLLECTION: &str = "users";
pub const QUIZZES_COLLECTION: &str = "quizzes";
pub const ATTEMPTS_COLLECTION: &str = "attempts";

/// Creates the indexes the repositories rely on. Safe to call on every start.
pub async fn ensure_indexes(mongo: &Database) -> Result<()> {
    mongo
        .collection::<User>(USERS_COLLECTION)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await
        .context("Failed to create users.email index")?;

    mongo
        .collection::<Quiz>(QUIZZES_COLLECTION)
        .create_index(IndexModel::builder().keys(doc! { "questions.id": 1 }).build())
        .await
        .context("Failed to create quizzes.questions.id index")?;

    mongo
        .collection::<Attempt>(ATTEMPTS_COLLECTION)
        .create_index(IndexModel::builder().keys(doc! { "user_id": 1 }).build())
        .await
        .context("Failed to create attempts.user_id index")?;

    tracing::info!("MongoDB indexes ensured");
    Ok(())
}

async fn collect_all<T>(cursor: mongodb::Cursor<T>) -> Result<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    cursor
        .try_collect()
        .await
        .context("Failed to read documents from cursor")
}

pub struct MongoQuizRepository {
    quizzes: Collection<Quiz>,
}

impl MongoQuizRepository {
    pub fn new(mongo: &Database) -> Self {
        Self {
            quizzes: mongo.collection(QUIZZES_COLLECTION),
        }
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn insert(&self, quiz: &Quiz) -> Result<()> {
        self.quizzes
            .insert_one(quiz)
            .await
            .context("Failed to insert quiz")?;
        Ok(())
    }

    async fn find_active_by_id(&self, id: &str) -> Result<Option<Quiz>> {
        let quiz = self
            .quizzes
            .find_one(doc! { "_id": id, "active": true })
            .await
            .context("Failed to query quiz")?;
        Ok(quiz.map(Quiz::with_active_questions))
    }

    async fn find_all_active(&self) -> Result<Vec<Quiz>> {
        let cursor = self
            .quizzes
            .find(doc! { "active": true })
            .sort(doc! { "createdAt": 1 })
            .await
            .context("Failed to query quizzes")?;
        let quizzes = collect_all(cursor).await?;
        Ok(quizzes.into_iter().map(Quiz::with_active_questions).collect())
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<bool> {
        let result = self
            .quizzes
            .update_one(
                doc! { "_id": id, "active": true },
                doc! { "$set": { "title": title, "updatedAt": BsonDateTime::now() } },
            )
            .await
            .context("Failed to update quiz title")?;
        Ok(result.matched_count > 0)
    }

    async fn deactivate(&self, id: &str) -> Result<bool> {
        let result = self
            .quizzes
            .update_one(
                doc! { "_id": id, "active": true },
                doc! { "$set": { "active": false, "updatedAt": BsonDateTime::now() } },
            )
            .await
            .context("Failed to deactivate quiz")?;
        Ok(result.matched_count > 0)
    }

    async fn push_question(&self, quiz_id: &str, question: &Question) -> Result<bool> {
        let question = to_bson(question).context("Failed to serialize question")?;
        let result = self
            .quizzes
            .update_one(
                doc! { "_id": quiz_id, "active": true },
                doc! {
                    "$push": { "questions": question },
                    "$set": { "updatedAt": BsonDateTime::now() },
                },
            )
            .await
            .context("Failed to add question")?;
        Ok(result.matched_count > 0)
    }

    async fn find_by_question_id(&self, question_id: &str) -> Result<Option<Quiz>> {
        self.quizzes
            .find_one(doc! { "questions.id": question_id })
            .await
            .context("Failed to query quiz by question")
    }

    async fn replace_question(&self, quiz_id: &str, question: &Question) -> Result<bool> {
        let replacement = to_bson(question).context("Failed to serialize question")?;
        let result = self
            .quizzes
            .update_one(
                doc! { "_id": quiz_id, "questions.id": question.id.as_str() },
                doc! {
                    "$set": {
                        "questions.$": replacement,
                        "updatedAt": BsonDateTime::now(),
                    }
                },
            )
            .await
            .context("Failed to replace question")?;
        Ok(result.matched_count > 0)
    }

    async fn deactivate_question(&self, question_id: &str) -> Result<bool> {
        let result = self
            .quizzes
            .update_one(
                doc! { "questions": { "$elemMatch": { "id": question_id, "active": true } } },
                doc! {
                    "$set": {
                        "questions.$.active": false,
                        "updatedAt": BsonDateTime::now(),
                    }
                },
            )
            .await
            .context("Failed to deactivate question")?;
        Ok(result.matched_count > 0)
    }
}

pub struct MongoAttemptRepository {
    attempts: Collection<Attempt>,
}

impl MongoAttemptRepository {
    pub fn new(mongo: &Database) -> Self {
        Self {
            attempts: mongo.collection(ATTEMPTS_COLLECTION),
        }
    }
}

#[async_trait]
impl AttemptRepository for MongoAttemptRepository {
    async fn insert(&self, attempt: &Attempt) -> Result<()> {
        self.attempts
            .insert_one(attempt)
            .await
            .context("Failed to insert attempt")?;
        Ok(())
    }

    async fn push_answer(&self, attempt_id: &str, answer: &UserAnswer) -> Result<()> {
        let answer = to_bson(answer).context("Failed to serialize answer")?;
        let result = self
            .attempts
            .update_one(
                doc! { "_id": attempt_id },
                doc! { "$push": { "answers": answer } },
            )
            .await
            .context("Failed to save user answer")?;
        if result.matched_count == 0 {
            bail!("Attempt {} not found while saving answer", attempt_id);
        }
        Ok(())
    }

    async fn finalize(&self, attempt_id: &str, score: u32) -> Result<()> {
        let result = self
            .attempts
            .update_one(
                doc! { "_id": attempt_id },
                doc! { "$set": { "score": i64::from(score), "status": "completed" } },
            )
            .await
            .context("Failed to finalize attempt")?;
        if result.matched_count == 0 {
            bail!("Attempt {} not found while finalizing", attempt_id);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Attempt>> {
        self.attempts
            .find_one(doc! { "_id": id })
            .await
            .context("Failed to query attempt")
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Attempt>> {
        let cursor = self
            .attempts
            .find(doc! { "user_id": user_id })
            .sort(doc! { "attemptedAt": 1 })
            .await
            .context("Failed to query attempts")?;
        collect_all(cursor).await
    }

    async fn find_all(&self) -> Result<Vec<Attempt>> {
        let cursor = self
            .attempts
            .find(doc! {})
            .sort(doc! { "attemptedAt": 1 })
            .await
            .context("Failed to query attempts")?;
        collect_all(cursor).await
    }
}

pub struct MongoUserRepository {
    users: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(mongo: &Database) -> Self {
        Self {
            users: mongo.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: &User) -> Result<()> {
        self.users
            .insert_one(user)
            .await
            .context("Failed to insert user")?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        self.users
            .find_one(doc! { "_id": id })
            .await
            .context("Failed to query user")
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users
            .find_one(doc! { "email": email })
            .await
            .context("Failed to query user by email")
    }

    async fn touch_last_login(&self, id: &str) -> Result<()> {
        self.users
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "lastLoginAt": BsonDateTime::now() } },
            )
            .await
            .context("Failed to update last login")?;
        Ok(())
    }
}
