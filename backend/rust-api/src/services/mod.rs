use std::sync::Arc;

use anyhow::Context;
use mongodb::{Client as MongoClient, Database};

use crate::config::{Config, StorageBackend};
use crate::middlewares::auth::JwtService;
use crate::repository::{
    memory::{MemoryAttemptRepository, MemoryQuizRepository, MemoryUserRepository},
    mongo::{self, MongoAttemptRepository, MongoQuizRepository, MongoUserRepository},
    AttemptRepository, QuizRepository, UserRepository,
};

pub struct AppState {
    pub config: Config,
    pub mongo: Option<Database>,
    pub jwt: Arc<JwtService>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Builds the state for the configured storage backend and runs the
    /// admin bootstrap.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let state = match config.storage_backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Self::in_memory(config)
            }
            StorageBackend::Mongo => {
                let client = MongoClient::with_uri_str(&config.mongo_uri)
                    .await
                    .context("Failed to connect to MongoDB")?;
                let mongo = client.database(&config.mongo_database);
                mongo::ensure_indexes(&mongo).await?;
                tracing::info!("MongoDB connected to database {}", config.mongo_database);
                Self::with_mongo(config, mongo)
            }
        };

        admin_seed::bootstrap(&state.config, state.users.as_ref()).await?;
        Ok(state)
    }

    pub fn with_mongo(config: Config, mongo: Database) -> Self {
        let jwt = Arc::new(JwtService::new(&config.jwt_secret));
        Self {
            quizzes: Arc::new(MongoQuizRepository::new(&mongo)),
            attempts: Arc::new(MongoAttemptRepository::new(&mongo)),
            users: Arc::new(MongoUserRepository::new(&mongo)),
            mongo: Some(mongo),
            jwt,
            config,
        }
    }

    pub fn in_memory(config: Config) -> Self {
        let jwt = Arc::new(JwtService::new(&config.jwt_secret));
        Self {
            config,
            mongo: None,
            jwt,
            quizzes: Arc::new(MemoryQuizRepository::new()),
            attempts: Arc::new(MemoryAttemptRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
        }
    }

    pub fn quiz_service(&self) -> quiz_service::QuizService {
        quiz_service::QuizService::new(self.quizzes.clone())
    }

    pub fn question_service(&self) -> question_service::QuestionService {
        question_service::QuestionService::new(self.quizzes.clone())
    }

    pub fn attempt_service(&self) -> attempt_service::AttemptService {
        attempt_service::AttemptService::new(self.quizzes.clone(), self.attempts.clone())
    }

    pub fn auth_service(&self) -> auth_service::AuthService {
        auth_service::AuthService::new(
            self.users.clone(),
            self.jwt.clone(),
            self.config.token_ttl_seconds,
            self.config.bcrypt_cost,
        )
    }
}

pub mod admin_seed;
pub mod attempt_service;
pub mod auth_service;
pub mod grading;
pub mod question_service;
pub mod question_validator;
pub mod quiz_service;
