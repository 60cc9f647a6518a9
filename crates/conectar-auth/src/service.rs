//! Authentication service: registration, login and bearer-token checks.

use conectar_core::error::{MarketError, MarketResult};
use conectar_core::models::user::{CreateUser, Role, User};
use conectar_core::repository::UserRepository;
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Successful register/login result.
#[derive(Debug)]
pub struct AuthOutput {
    pub user: User,
    /// Signed HS256 bearer token.
    pub token: String,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
#[derive(Clone)]
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

/// Emails are compared case-insensitively and stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create an account and issue its first token.
    pub async fn register(&self, input: RegisterInput) -> MarketResult<AuthOutput> {
        let first_name = input.first_name.trim();
        let last_name = input.last_name.trim();
        let email = normalize_email(&input.email);

        if first_name.is_empty() || last_name.is_empty() || email.is_empty() {
            return Err(MarketError::validation(
                "Por favor, completa todos los campos",
            ));
        }

        let password_hash = self.hash_new_password(&input.password)?;

        if self.user_repo.email_exists(&email).await? {
            return Err(MarketError::already_exists("user", "El email ya está en uso"));
        }

        let user = self
            .user_repo
            .create(CreateUser {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email,
                password_hash,
                role: input.role,
            })
            .await?;

        info!(user_id = %user.id, role = ?user.role, "user registered");
        let token = token::issue_token(user.id, &self.config)?;
        Ok(AuthOutput { user, token })
    }

    /// Verify email + password and issue a token.
    ///
    /// An unknown email is reported separately from a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> MarketResult<AuthOutput> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(MarketError::validation(
                "Por favor, ingresa email y contraseña",
            ));
        }

        let user = match self.user_repo.get_by_email(&email).await {
            Ok(user) => user,
            Err(MarketError::NotFound { .. }) => return Err(AuthError::UnknownEmail.into()),
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = token::issue_token(user.id, &self.config)?;
        Ok(AuthOutput { user, token })
    }

    /// Resolve a bearer token to the current user record.
    pub async fn authenticate(&self, bearer: &str) -> MarketResult<User> {
        let claims = token::validate_token(bearer, &self.config).inspect_err(|e| {
            debug!(error = %e, "bearer token rejected");
        })?;

        match self.user_repo.get_by_id(claims.user_id).await {
            Ok(user) => Ok(user),
            Err(MarketError::NotFound { .. }) => Err(AuthError::UserGone.into()),
            Err(e) => Err(e),
        }
    }

    /// Enforce the password policy and hash for storage.
    pub fn hash_new_password(&self, password: &str) -> MarketResult<String> {
        if password.chars().count() < self.config.min_password_length {
            return Err(AuthError::WeakPassword {
                min: self.config.min_password_length,
            }
            .into());
        }
        Ok(password::hash_password(
            password,
            self.config.pepper.as_deref(),
        )?)
    }
}
