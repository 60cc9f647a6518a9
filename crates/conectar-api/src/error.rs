//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"message": "..."}`. Server-side
//! failures are logged with their detail and answered generically.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use conectar_core::error::MarketError;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

const INTERNAL_MESSAGE: &str = "Error interno del servidor";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Market(#[from] MarketError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Market(e) => match e {
                MarketError::Validation { .. } | MarketError::AlreadyExists { .. } => {
                    StatusCode::BAD_REQUEST
                }
                MarketError::NotFound { .. } => StatusCode::NOT_FOUND,
                MarketError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
                MarketError::Forbidden { .. } => StatusCode::FORBIDDEN,
                MarketError::Database(_)
                | MarketError::Crypto(_)
                | MarketError::Gateway(_)
                | MarketError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Client-facing message.
    pub fn message(&self) -> String {
        match self {
            Self::BadRequest(m) | Self::NotFound(m) | Self::Unauthorized(m) | Self::Forbidden(m) => {
                m.clone()
            }
            Self::Market(e) => match e {
                MarketError::Validation { message } => message.clone(),
                MarketError::AlreadyExists { reason, .. } => reason.clone(),
                MarketError::AuthenticationFailed { reason } => reason.clone(),
                MarketError::Forbidden { reason } => reason.clone(),
                MarketError::NotFound { entity, .. } => not_found_message(entity).to_string(),
                _ => INTERNAL_MESSAGE.to_string(),
            },
        }
    }
}

fn not_found_message(entity: &str) -> &'static str {
    match entity {
        "user" => "Usuario no encontrado",
        "opinion" => "Opinión no encontrada",
        "service" => "Servicio no encontrado o no tienes permiso",
        "service_type" => "Tipo de servicio no encontrado",
        "technology" => "Tecnología no encontrada",
        _ => "Recurso no encontrado",
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection.body_text(), "rejected request body");
        Self::BadRequest("El cuerpo de la petición es inválido".into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "message": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_errors_map_to_status_codes() {
        let cases = [
            (MarketError::validation("x"), StatusCode::BAD_REQUEST),
            (
                MarketError::already_exists("user", "El email ya está en uso"),
                StatusCode::BAD_REQUEST,
            ),
            (MarketError::not_found("user", "1"), StatusCode::NOT_FOUND),
            (
                MarketError::AuthenticationFailed { reason: "x".into() },
                StatusCode::UNAUTHORIZED,
            ),
            (
                MarketError::Forbidden { reason: "x".into() },
                StatusCode::FORBIDDEN,
            ),
            (
                MarketError::Database("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                MarketError::Gateway("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn internal_detail_is_hidden() {
        let err = ApiError::from(MarketError::Database("connection refused at 10.0.0.3".into()));
        assert_eq!(err.message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn duplicate_reason_is_the_message() {
        let err = ApiError::from(MarketError::already_exists("user", "El email ya está en uso"));
        assert_eq!(err.message(), "El email ya está en uso");
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = ApiError::from(MarketError::not_found("user", "abc"));
        assert_eq!(err.message(), "Usuario no encontrado");
        let err = ApiError::from(MarketError::not_found("widget", "abc"));
        assert_eq!(err.message(), "Recurso no encontrado");
    }
}
