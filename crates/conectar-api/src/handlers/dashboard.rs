//! `/api/dashboard` handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use conectar_core::dashboard::Dashboard;
use conectar_core::error::MarketError;
use conectar_core::models::user::{Counter, User};
use conectar_core::repository::UserRepository;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, ClientIp, JsonBody};
use crate::handlers::users::count_visit;
use crate::state::AppState;

const FREELANCER_NOT_FOUND: &str = "Freelancer no encontrado";

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Dashboard>> {
    Ok(Json(state.dashboards.dashboard(caller.id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRequest {
    freelancer_id: Option<String>,
}

/// Resolve the tracked freelancer. Clients and unknown ids are both 404.
async fn tracked_freelancer(state: &AppState, body: StatsRequest) -> ApiResult<User> {
    let raw = body
        .freelancer_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Se requiere el ID del freelancer"))?;

    let not_found = || ApiError::NotFound(FREELANCER_NOT_FOUND.into());
    let id = uuid::Uuid::parse_str(&raw).map_err(|_| not_found())?;

    match state.users.get_by_id(id).await {
        Ok(user) if user.is_freelancer() => Ok(user),
        Ok(_) | Err(MarketError::NotFound { .. }) => Err(not_found()),
        Err(e) => Err(e.into()),
    }
}

pub async fn track_visit(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    JsonBody(body): JsonBody<StatsRequest>,
) -> ApiResult<impl IntoResponse> {
    let freelancer = tracked_freelancer(&state, body).await?;
    let outcome = count_visit(&state, freelancer, &ip).await?;

    Ok(Json(json!({
        "message": "Visita registrada correctamente",
        "counted": outcome.counted,
    })))
}

pub async fn track_linkedin(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<StatsRequest>,
) -> ApiResult<impl IntoResponse> {
    let freelancer = tracked_freelancer(&state, body).await?;
    state
        .users
        .increment_counter(freelancer.id, Counter::LinkedinAccess)
        .await?;
    Ok(Json(json!({ "message": "Acceso a LinkedIn registrado correctamente" })))
}

pub async fn track_portfolio(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<StatsRequest>,
) -> ApiResult<impl IntoResponse> {
    let freelancer = tracked_freelancer(&state, body).await?;
    state
        .users
        .increment_counter(freelancer.id, Counter::PortfolioAccess)
        .await?;
    Ok(Json(json!({ "message": "Acceso a Portfolio registrado correctamente" })))
}
