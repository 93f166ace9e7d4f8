use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};

const DEV_JWT_SECRET: &str = "dev_secret_key_change_in_production";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub password_hash_rounds: u32,
    pub session_cookie_name: String,
    pub production: bool,
    pub educator_invite_code: Option<SecretString>,
    pub allowed_origins: Vec<String>,
    pub submission_window_hours: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "neet-prep-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            ),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24 * 7),
            password_hash_rounds: env::var("PASSWORD_HASH_ROUNDS")
                .ok()
                .and_then(|r| r.parse().ok())
                .unwrap_or(600_000),
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "token".to_string()),
            production: env::var("APP_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            educator_invite_code: env::var("EDUCATOR_INVITE_CODE")
                .ok()
                .filter(|code| !code.is_empty())
                .map(SecretString::from),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_else(|_| {
                    vec![
                        "http://localhost:5173".to_string(),
                        "http://localhost:5174".to_string(),
                        "http://localhost:5175".to_string(),
                    ]
                }),
            submission_window_hours: env::var("SUBMISSION_WINDOW_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .filter(|h: &i64| *h > 0)
                .unwrap_or(24),
        }
    }

    /// Refuse to boot a production server with the development signing key
    /// or one too short to be a real secret.
    pub fn validate_for_production(&self) -> AppResult<()> {
        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEV_JWT_SECRET {
            return Err(AppError::InternalError(
                "JWT_SECRET is using the development default".to_string(),
            ));
        }

        if jwt_secret.len() < 32 {
            return Err(AppError::InternalError(format!(
                "JWT_SECRET is too short ({}), must be at least 32 characters",
                jwt_secret.len()
            )));
        }

        if self.educator_invite_code.is_none() {
            log::warn!("EDUCATOR_INVITE_CODE is not set; educator signup is disabled");
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "neet-prep-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            password_hash_rounds: 1_000,
            session_cookie_name: "token".to_string(),
            production: false,
            educator_invite_code: Some(SecretString::from("let-me-teach".to_string())),
            allowed_origins: vec!["http://localhost:5173".to_string()],
            submission_window_hours: 24,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
