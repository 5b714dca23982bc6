use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

use super::auth_service::normalize_email;
use crate::config::Config;
use crate::models::{User, UserRole};
use crate::repository::UserRepository;

#[derive(Debug, Deserialize)]
pub struct AdminSeed {
    pub email: String,
    #[serde(default = "default_admin_name")]
    pub name: String,
    /// Plain-text password from seed file (hashed before storage)
    pub password: String,
}

fn default_admin_name() -> String {
    "Quiz Admin".to_string()
}

impl AdminSeed {
    fn into_user(self, bcrypt_cost: u32) -> Result<User> {
        let now = Utc::now();
        Ok(User {
            id: Uuid::new_v4().to_string(),
            email: normalize_email(&self.email),
            password_hash: bcrypt::hash(&self.password, bcrypt_cost)
                .context("Failed to hash admin password")?,
            name: self.name,
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        })
    }
}

/// Creates the bootstrap admin from the configured seed file. A missing file
/// or an already registered email leaves the store untouched.
pub async fn bootstrap(config: &Config, users: &dyn UserRepository) -> Result<()> {
    let path = match &config.superuser_seed_file {
        Some(path) => Path::new(path),
        None => {
            tracing::debug!("No admin seed file configured, skipping bootstrap");
            return Ok(());
        }
    };

    if !path.exists() {
        tracing::warn!(
            "Admin seed file {} not found, skipping bootstrap",
            path.display()
        );
        return Ok(());
    }

    let contents = fs::read_to_string(path)
        .await
        .context("Failed to read admin seed file")?;
    let seed: AdminSeed =
        serde_json::from_str(&contents).context("Failed to deserialize admin seed payload")?;

    if users
        .find_by_email(&normalize_email(&seed.email))
        .await?
        .is_some()
    {
        tracing::info!("Admin {} already exists, seed skipped", seed.email);
        return Ok(());
    }

    let user = seed.into_user(config.bcrypt_cost)?;
    users.insert(&user).await?;
    tracing::info!(
        "Admin {} inserted; remove seed file to prevent rerun",
        user.email
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryUserRepository;

    fn config_with_seed(path: Option<String>) -> Config {
        Config {
            superuser_seed_file: path,
            ..Config::for_tests()
        }
    }

    #[tokio::test]
    async fn seeds_admin_once() {
        let path = std::env::temp_dir().join(format!("admin-seed-{}.json", Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{"email": "Root@Quiz.io", "password": "supersecret"}"#,
        )
        .unwrap();
        let config = config_with_seed(Some(path.display().to_string()));
        let users = MemoryUserRepository::new();

        bootstrap(&config, &users).await.unwrap();
        bootstrap(&config, &users).await.unwrap();

        let admin = users.find_by_email("root@quiz.io").await.unwrap().unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert_eq!(admin.name, "Quiz Admin");
        assert!(bcrypt::verify("supersecret", &admin.password_hash).unwrap());

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn missing_file_is_skipped() {
        let config = config_with_seed(Some("/nonexistent/admin.json".to_string()));
        let users = MemoryUserRepository::new();
        bootstrap(&config, &users).await.unwrap();
        assert!(users.find_by_email("root@quiz.io").await.unwrap().is_none());
    }
}
