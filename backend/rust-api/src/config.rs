use serde::Deserialize;
use std::env;

/// Where quizzes, attempts and users are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Result<Self, config::ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(config::ConfigError::Message(format!(
                "Unknown storage backend '{}', expected 'mongo' or 'memory'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app_env: String,
    pub storage_backend: StorageBackend,
    pub mongo_uri: String,
    pub mongo_database: String,
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub bcrypt_cost: u32,
    pub superuser_seed_file: Option<String>,
    pub bind_addr: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first, then the local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml + ENV overrides (prefix: APP_)
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let storage_backend = settings
            .get_string("storage.backend")
            .or_else(|_| env::var("STORAGE_BACKEND"))
            .map(|value| StorageBackend::parse(&value))
            .unwrap_or(Ok(StorageBackend::Mongo))?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "quizapp".to_string());

        let jwt_secret = match settings
            .get_string("auth.jwt_secret")
            .or_else(|_| env::var("JWT_SECRET"))
        {
            Ok(secret) => secret,
            Err(_) if app_env == "prod" => {
                return Err(config::ConfigError::Message(
                    "JWT_SECRET must be set in production".to_string(),
                ));
            }
            Err(_) => {
                eprintln!("WARNING: Using default JWT_SECRET (dev mode only!)");
                "dev-secret-only-for-local-testing".to_string()
            }
        };

        let token_ttl_seconds = settings
            .get_int("auth.token_ttl_seconds")
            .ok()
            .or_else(|| {
                env::var("JWT_ACCESS_TOKEN_TTL_SECONDS")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .unwrap_or(3600);

        let bcrypt_cost = settings
            .get_int("auth.bcrypt_cost")
            .ok()
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| env::var("BCRYPT_COST").ok().and_then(|v| v.parse().ok()))
            .unwrap_or(bcrypt::DEFAULT_COST);

        let superuser_seed_file = settings
            .get_string("auth.superuser_seed_file")
            .or_else(|_| env::var("SUPERUSER_SEED_FILE"))
            .ok()
            .filter(|path| !path.is_empty());

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        Ok(Config {
            app_env,
            storage_backend,
            mongo_uri,
            mongo_database,
            jwt_secret,
            token_ttl_seconds,
            bcrypt_cost,
            superuser_seed_file,
            bind_addr,
        })
    }

    /// In-memory configuration with a fixed secret and a cheap bcrypt cost.
    pub fn for_tests() -> Self {
        Config {
            app_env: "test".to_string(),
            storage_backend: StorageBackend::Memory,
            mongo_uri: "mongodb://localhost:27017".to_string(),
            mongo_database: "quizapp_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            token_ttl_seconds: 3600,
            bcrypt_cost: 4,
            superuser_seed_file: None,
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}
