//! `/api/auth/linkedin` handlers: browser-facing OAuth handshake.
//!
//! These endpoints are navigated to, not called with fetch, so failures
//! are plain-text pages and successes are redirects.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use conectar_auth::token;
use conectar_core::error::{MarketError, MarketResult};
use conectar_core::models::user::{Role, UpdateUser};
use conectar_core::repository::UserRepository;
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::bridge::linkedin::{
    STATE_COOKIE, USER_COOKIE, expired_cookie, handshake_cookie, new_state, read_cookie,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    token: Option<String>,
}

pub async fn connect(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Response {
    let Some(bearer) = query.token.filter(|t| !t.is_empty()) else {
        return (StatusCode::UNAUTHORIZED, "No autorizado: Token no proporcionado.").into_response();
    };

    let claims = match token::validate_token(&bearer, state.auth.config()) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "linkedin connect with bad token");
            return (StatusCode::UNAUTHORIZED, "No autorizado: Token inválido.").into_response();
        }
    };

    let oauth_state = new_state();
    let url = match state.linkedin.authorization_url(&oauth_state) {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "linkedin not configured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error de configuración: Faltan variables de entorno de LinkedIn.",
            )
                .into_response();
        }
    };

    let cookies = handshake_cookie(STATE_COOKIE, &oauth_state)
        .zip(handshake_cookie(USER_COOKIE, &claims.user_id.to_string()));
    let Some((state_cookie, user_cookie)) = cookies else {
        error!("linkedin handshake cookie rejected");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    (
        AppendHeaders([(SET_COOKIE, state_cookie), (SET_COOKIE, user_cookie)]),
        Redirect::to(&url),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Response {
    let stored_state = read_cookie(&headers, STATE_COOKIE);
    match (query.state.as_deref(), stored_state.as_deref()) {
        (Some(received), Some(stored)) if received == stored => {}
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                "Error de seguridad: Intento de vinculación inválido.",
            )
                .into_response();
        }
    }

    let Some(user_ref) = read_cookie(&headers, USER_COOKIE) else {
        return (
            StatusCode::UNAUTHORIZED,
            "Sesión expirada. Por favor intente nuevamente.",
        )
            .into_response();
    };

    let clear = AppendHeaders([
        (SET_COOKIE, expired_cookie(STATE_COOKIE)),
        (SET_COOKIE, expired_cookie(USER_COOKIE)),
    ]);

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            clear,
            "Falta el código de autorización.",
        )
            .into_response();
    };

    match link_account(&state, &user_ref, &code).await {
        Ok(target) => (clear, Redirect::to(&target)).into_response(),
        Err(MarketError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, clear, "Usuario no encontrado.").into_response()
        }
        Err(e) => {
            error!(error = %e, "linkedin callback failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                clear,
                "Error al vincular cuenta de LinkedIn.",
            )
                .into_response()
        }
    }
}

/// Exchange the code, fetch the profile URL and decide where the user
/// lands. Users who already have a portfolio and a description become
/// freelancers immediately.
async fn link_account(state: &AppState, user_ref: &str, code: &str) -> MarketResult<String> {
    let user_id =
        Uuid::parse_str(user_ref).map_err(|_| MarketError::not_found("user", user_ref))?;

    let access_token = state.linkedin.exchange_code(code).await?;
    let profile_url = state.linkedin.user_info(&access_token).await?.profile_url();

    let user = state.users.get_by_id(user_id).await?;
    let has_profile = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

    if has_profile(&user.portfolio) && has_profile(&user.description) {
        state
            .users
            .update(
                user_id,
                UpdateUser {
                    linkedin: Some(profile_url),
                    role: Some(Role::Freelancer),
                    is_available: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %user_id, "linkedin linked, user converted to freelancer");

        let origin = state.linkedin.frontend_origin()?;
        return Ok(format!("{origin}/dashboard?status=success_auto_freelancer"));
    }

    info!(user_id = %user_id, "linkedin linked, profile form pending");
    state.linkedin.form_redirect(&profile_url)
}
