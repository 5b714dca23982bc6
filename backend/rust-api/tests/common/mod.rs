#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use quiz_api::{
    config::Config,
    create_router,
    middlewares::auth::JwtClaims,
    models::{User, UserRole},
    repository::UserRepository,
    services::AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

/// Router over the in-memory store with a fixed JWT secret.
pub fn create_test_app() -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let state = Arc::new(AppState::in_memory(Config::for_tests()));
    TestApp {
        router: create_router(state.clone()),
        state,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header("content-type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Registers through the API and returns `(token, user_id)`.
    pub async fn register_user(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "password123",
                    "name": "Test User",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Admins cannot self-register, so one is written straight to the store.
    pub async fn create_admin(&self, email: &str) -> (String, String) {
        let now = Utc::now();
        let admin = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: bcrypt::hash("password123", 4).unwrap(),
            name: "Admin".to_string(),
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        self.state.users.insert(&admin).await.unwrap();

        let claims = JwtClaims::new(&admin.id, UserRole::Admin, 3600);
        let token = self.state.jwt.generate_token(&claims).unwrap();
        (token, admin.id)
    }

    pub async fn create_quiz(&self, admin_token: &str, title: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/admin/quizzes",
                Some(admin_token),
                Some(json!({ "title": title })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create quiz failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Adds a question and returns the stored question as JSON.
    pub async fn add_question(&self, admin_token: &str, quiz_id: &str, question: Value) -> Value {
        let (status, body) = self
            .request(
                "POST",
                &format!("/api/v1/admin/quizzes/{}/questions", quiz_id),
                Some(admin_token),
                Some(question),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "add question failed: {}", body);
        body
    }
}

/// Option id of the option with the given text.
pub fn option_id(question: &Value, text: &str) -> String {
    question["kind"]["options"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["text"] == text)
        .and_then(|o| o["id"].as_str())
        .unwrap()
        .to_string()
}

/// Capitals quiz: one single choice, one multiple choice, one text question.
pub struct SeededQuiz {
    pub quiz_id: String,
    pub single: Value,
    pub multiple: Value,
    pub text: Value,
}

pub async fn seed_capitals_quiz(app: &TestApp, admin_token: &str) -> SeededQuiz {
    let quiz_id = app.create_quiz(admin_token, "Capitals").await;

    let single = app
        .add_question(
            admin_token,
            &quiz_id,
            json!({
                "text": "Capital of France?",
                "type": "SINGLE_CHOICE",
                "options": [
                    { "text": "Paris", "is_correct": true },
                    { "text": "Lyon", "is_correct": false },
                ]
            }),
        )
        .await;

    let multiple = app
        .add_question(
            admin_token,
            &quiz_id,
            json!({
                "text": "Which are in Europe?",
                "type": "MULTIPLE_CHOICE",
                "options": [
                    { "text": "Berlin", "is_correct": true },
                    { "text": "Madrid", "is_correct": true },
                    { "text": "Tokyo", "is_correct": false },
                ]
            }),
        )
        .await;

    let text = app
        .add_question(
            admin_token,
            &quiz_id,
            json!({
                "text": "Capital of Italy?",
                "type": "TEXT",
                "correct_answer_text": "Rome",
            }),
        )
        .await;

    SeededQuiz {
        quiz_id,
        single,
        multiple,
        text,
    }
}

impl SeededQuiz {
    /// Submission with every question answered correctly.
    pub fn all_correct(&self) -> Value {
        json!({
            "answers": [
                {
                    "question_id": self.single["id"],
                    "selected_option_ids": [option_id(&self.single, "Paris")],
                },
                {
                    "question_id": self.multiple["id"],
                    "selected_option_ids": [
                        option_id(&self.multiple, "Madrid"),
                        option_id(&self.multiple, "Berlin"),
                    ],
                },
                {
                    "question_id": self.text["id"],
                    "answer_text": "rome",
                },
            ]
        })
    }
}
