use std::sync::Arc;

use anyhow::Context;
use bcrypt::{hash, verify};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{QuizError, QuizResult};
use crate::middlewares::auth::{JwtClaims, JwtService};
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
use crate::models::{Principal, User, UserRole};
use crate::repository::UserRepository;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    access_token_ttl_seconds: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt_service: Arc<JwtService>,
        access_token_ttl_seconds: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            jwt_service,
            access_token_ttl_seconds,
            bcrypt_cost,
        }
    }

    pub fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        hash(password, self.bcrypt_cost).context("Failed to hash password")
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> anyhow::Result<bool> {
        verify(password, hash).context("Failed to verify password")
    }

    /// Registers a new account with the `user` role and signs it in.
    pub async fn register(&self, req: RegisterRequest) -> QuizResult<AuthResponse> {
        let email = normalize_email(&req.email);

        if self.users.find_by_email(&email).await?.is_some() {
            tracing::warn!("Registration rejected: email {} already taken", email);
            return Err(QuizError::UserAlreadyExists(email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash: self.hash_password(&req.password)?,
            name: req.name,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        self.users.insert(&user).await?;
        tracing::info!("User registered: {} ({})", user.email, user.id);

        self.issue(user)
    }

    pub async fn login(&self, req: LoginRequest) -> QuizResult<AuthResponse> {
        let email = normalize_email(&req.email);

        let Some(mut user) = self.users.find_by_email(&email).await? else {
            tracing::warn!("Login failed: unknown email {}", email);
            return Err(QuizError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !self.verify_password(&req.password, &user.password_hash)? {
            tracing::warn!("Login failed: wrong password for {}", email);
            return Err(QuizError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        self.users.touch_last_login(&user.id).await?;
        user.last_login_at = Some(Utc::now());
        tracing::info!("User logged in: {} ({})", user.email, user.id);

        self.issue(user)
    }

    pub async fn current_user(&self, principal: &Principal) -> QuizResult<UserProfile> {
        self.users
            .find_by_id(&principal.user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| QuizError::Unauthorized("User no longer exists".to_string()))
    }

    fn issue(&self, user: User) -> QuizResult<AuthResponse> {
        let claims = JwtClaims::new(&user.id, user.role, self.access_token_ttl_seconds);
        let access_token = self.jwt_service.generate_token(&claims)?;
        Ok(AuthResponse {
            access_token,
            user: UserProfile::from(user),
        })
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
