//! Authentication error types.

use conectar_core::error::MarketError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credenciales inválidas (Email o Contraseña incorrectos)")]
    InvalidCredentials,

    #[error("No existe un usuario registrado con el email ingresado")]
    UnknownEmail,

    #[error("La contraseña debe tener al menos {min} caracteres")]
    WeakPassword { min: usize },

    #[error("No autorizado, no se encontró token")]
    MissingToken,

    #[error("No autorizado, token fallido o expirado")]
    TokenExpired,

    #[error("No autorizado, token fallido o expirado: {0}")]
    TokenInvalid(String),

    #[error("No autorizado, usuario no encontrado")]
    UserGone,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for MarketError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UnknownEmail => MarketError::NotFound {
                entity: "user".into(),
                id: err.to_string(),
            },
            AuthError::WeakPassword { .. } => MarketError::Validation {
                message: err.to_string(),
            },
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::UserGone
            | AuthError::TokenExpired => MarketError::AuthenticationFailed {
                reason: err.to_string(),
            },
            // Drop the decoder detail; it is logged where it happens.
            AuthError::TokenInvalid(_) => MarketError::AuthenticationFailed {
                reason: AuthError::TokenExpired.to_string(),
            },
            AuthError::Crypto(msg) => MarketError::Crypto(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_market_errors() {
        assert!(matches!(
            MarketError::from(AuthError::UnknownEmail),
            MarketError::NotFound { .. }
        ));
        assert!(matches!(
            MarketError::from(AuthError::WeakPassword { min: 6 }),
            MarketError::Validation { .. }
        ));
        assert!(matches!(
            MarketError::from(AuthError::InvalidCredentials),
            MarketError::AuthenticationFailed { .. }
        ));
        assert!(matches!(
            MarketError::from(AuthError::Crypto("x".into())),
            MarketError::Crypto(_)
        ));
    }

    #[test]
    fn invalid_token_detail_is_not_exposed() {
        let err = MarketError::from(AuthError::TokenInvalid("InvalidSignature".into()));
        assert!(!err.to_string().contains("InvalidSignature"));
    }
}
