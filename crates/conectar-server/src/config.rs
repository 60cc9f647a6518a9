//! Environment-driven server configuration.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use conectar_api::{ApiConfig, LinkedInConfig, PaymentConfig};
use conectar_auth::AuthConfig;
use conectar_db::DbConfig;
use tracing::{info, warn};

pub struct ServerConfig {
    pub port: u16,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub api: ApiConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let db_defaults = DbConfig::default();
        let auth_defaults = AuthConfig::default();
        let api_defaults = ApiConfig::default();

        let frontend_url = var("FRONTEND_URI").unwrap_or(api_defaults.frontend_url);
        let frontend = frontend_url.trim_end_matches('/');

        let payment = PaymentConfig {
            access_token: var("MP_ACCESS_TOKEN"),
            success_url: var("MP_SUCCESS_URL")
                .or_else(|| Some(format!("{frontend}/dashboard?status=approved"))),
            failure_url: var("MP_FAILURE_URL")
                .or_else(|| Some(format!("{frontend}/free-to-premium?status=failure"))),
            notification_url: var("MP_NOTIFICATION_URL"),
            ..api_defaults.payment
        };

        let linkedin = LinkedInConfig {
            client_id: var("LINKEDIN_CLIENT_ID"),
            client_secret: var("LINKEDIN_CLIENT_SECRET"),
            redirect_uri: var("LINKEDIN_REDIRECT_URI"),
            form_url: var("FRONTEND_FREELANCER_FORM_URL")
                .unwrap_or_else(|| format!("{frontend}/hacerse-freelancer")),
            ..api_defaults.linkedin
        };

        Ok(Self {
            port: try_load("PORT", 8080)?,
            db: DbConfig {
                url: var("SURREAL_URL").unwrap_or(db_defaults.url),
                namespace: var("SURREAL_NAMESPACE").unwrap_or(db_defaults.namespace),
                database: var("SURREAL_DATABASE").unwrap_or(db_defaults.database),
                username: var("SURREAL_USER").unwrap_or(db_defaults.username),
                password: var("SURREAL_PASS").unwrap_or(db_defaults.password),
            },
            auth: AuthConfig {
                jwt_secret: var("JWT_SECRET").context("JWT_SECRET must be set")?,
                token_lifetime_secs: try_load("JWT_LIFETIME_SECS", auth_defaults.token_lifetime_secs)?,
                pepper: var("PASSWORD_PEPPER"),
                ..auth_defaults
            },
            api: ApiConfig {
                frontend_url,
                payment,
                linkedin,
            },
        })
    }
}

/// Non-empty environment variable.
fn var(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            warn!("Environment variable {key} not found");
            None
        }
    }
}

fn try_load<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow!("invalid {key} value {raw:?}: {e}")),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
