use std::collections::HashMap;
use std::env;

use hostel_api::token::{DEFAULT_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES};
use thiserror::Error;

/// Secrets that must never sign production tokens.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "dev-secret-change-me", "secret"];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: String,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub token_ttl_minutes: i64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Admin account ensured at startup.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub roll_number: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("HOSTEL_JWT_SECRET is a placeholder; set a real secret")]
    PlaceholderSecret,

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let jwt_secret = vars
            .get("HOSTEL_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("HOSTEL_JWT_SECRET".to_string()))?
            .clone();
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::PlaceholderSecret);
        }

        let db_path = vars
            .get("HOSTEL_DB_PATH")
            .cloned()
            .unwrap_or_else(|| "hostel.db".to_string());

        let host = vars
            .get("HOSTEL_HOST")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match vars.get("HOSTEL_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                name: "HOSTEL_PORT".to_string(),
                reason: format!("{e}"),
            })?,
            None => 8000,
        };

        let cors_origin = vars
            .get("HOSTEL_CORS_ORIGIN")
            .cloned()
            .unwrap_or_else(|| "http://localhost:3000".to_string());
        if axum::http::HeaderValue::from_str(&cors_origin).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "HOSTEL_CORS_ORIGIN".to_string(),
                reason: "not a valid header value".to_string(),
            });
        }

        let token_ttl_minutes = match vars.get("HOSTEL_TOKEN_TTL_MINUTES") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(v) if v > 0 && v <= MAX_TOKEN_TTL_MINUTES => v,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "HOSTEL_TOKEN_TTL_MINUTES".to_string(),
                        reason: format!("must be an integer between 1 and {MAX_TOKEN_TTL_MINUTES}"),
                    });
                }
            },
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let bootstrap_admin = match (vars.get("HOSTEL_ADMIN_EMAIL"), vars.get("HOSTEL_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                name: vars
                    .get("HOSTEL_ADMIN_NAME")
                    .cloned()
                    .unwrap_or_else(|| "Admin User".to_string()),
                email: email.clone(),
                roll_number: vars
                    .get("HOSTEL_ADMIN_ROLL")
                    .cloned()
                    .unwrap_or_else(|| "ADMIN001".to_string()),
                password: password.clone(),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar("HOSTEL_ADMIN_PASSWORD".to_string()));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar("HOSTEL_ADMIN_EMAIL".to_string()));
            }
        };

        Ok(Config {
            jwt_secret,
            db_path,
            host,
            port,
            cors_origin,
            token_ttl_minutes,
            bootstrap_admin,
        })
    }
}
