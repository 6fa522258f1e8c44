use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// SHA-256 digest (lowercase hex) of the supervisor access code.
    pub supervisor_code_digest: String,
    pub supervisor_token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub public_prefix: String,
}

/// Development fallback only. Production deployments must set
/// SUPERVISOR_ACCESS_CODE; startup logs a warning when the default is live.
const DEFAULT_SUPERVISOR_CODE: &str = "TAJROYALS2025SUPERVISOR";
const DEFAULT_DEV_JWT_SECRET: &str = "tajroyals-dev-secret";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging =
                v.parse().unwrap_or(self.database.enable_query_logging);
        }

        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = v.parse().unwrap_or(self.api.default_page_size);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }

        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            if !v.is_empty() {
                self.security.jwt_secret = v;
            }
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SUPERVISOR_ACCESS_CODE") {
            if !v.is_empty() {
                self.security.supervisor_code_digest = sha256_hex(&v);
            }
        }
        if let Ok(v) = env::var("SECURITY_SUPERVISOR_TOKEN_TTL_MINUTES") {
            self.security.supervisor_token_ttl_minutes =
                v.parse().unwrap_or(self.security.supervisor_token_ttl_minutes);
        }

        if let Ok(v) = env::var("STORAGE_UPLOAD_DIR") {
            self.storage.upload_dir = v;
        }
        if let Ok(v) = env::var("STORAGE_PUBLIC_PREFIX") {
            self.storage.public_prefix = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
                enable_query_logging: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB, covers gallery uploads
                default_page_size: 50,
                max_page_size: 500,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                jwt_secret: DEFAULT_DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7,
                supervisor_code_digest: sha256_hex(DEFAULT_SUPERVISOR_CODE),
                supervisor_token_ttl_minutes: 60,
            },
            storage: StorageConfig {
                upload_dir: "uploads".to_string(),
                public_prefix: "/uploads".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout_secs: 10,
                enable_query_logging: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024,
                default_page_size: 50,
                max_page_size: 200,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.tajroyals.club".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                supervisor_code_digest: String::new(),
                supervisor_token_ttl_minutes: 60,
            },
            storage: StorageConfig {
                upload_dir: "uploads".to_string(),
                public_prefix: "/uploads".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout_secs: 5,
                enable_query_logging: false,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 10 * 1024 * 1024,
                default_page_size: 50,
                max_page_size: 100,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://tajroyals.club".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                supervisor_code_digest: String::new(),
                supervisor_token_ttl_minutes: 30,
            },
            storage: StorageConfig {
                upload_dir: "uploads".to_string(),
                public_prefix: "/uploads".to_string(),
            },
        }
    }

    /// Log loud warnings when secret material is missing or left at the
    /// development defaults outside Development.
    pub fn warn_on_insecure_defaults(&self) {
        if self.environment == Environment::Development {
            return;
        }
        if self.security.jwt_secret.is_empty() || self.security.jwt_secret == DEFAULT_DEV_JWT_SECRET
        {
            tracing::warn!("JWT_SECRET is not set; tokens cannot be issued or verified");
        }
        if self.security.supervisor_code_digest.is_empty()
            || self.security.supervisor_code_digest == sha256_hex(DEFAULT_SUPERVISOR_CODE)
        {
            tracing::warn!("SUPERVISOR_ACCESS_CODE is unset or at the development default");
        }
    }
}

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert!(config.api.enable_request_logging);
        assert_eq!(config.security.jwt_expiry_hours, 24 * 7);
        assert_eq!(config.security.supervisor_token_ttl_minutes, 60);
        assert!(!config.security.supervisor_code_digest.is_empty());
    }

    #[test]
    fn production_defaults_have_no_baked_in_secrets() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert!(config.security.supervisor_code_digest.is_empty());
        assert!(!config.database.enable_query_logging);
    }

    #[test]
    fn sha256_hex_is_stable() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
