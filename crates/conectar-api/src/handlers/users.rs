//! `/api/users` handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use conectar_auth::{AuthError, AuthOutput, RegisterInput};
use conectar_core::error::{MarketError, MarketResult};
use conectar_core::models::user::{Counter, FreelancerFilter, Plan, Role, UpdateUser, User};
use conectar_core::repository::UserRepository;
use conectar_core::stats::{self, VisitOutcome};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, ClientIp, JsonBody, parse_id};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    nombre: Option<String>,
    apellido: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

/// Register/login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    message: &'static str,
    #[serde(rename = "_id")]
    id: Uuid,
    nombre: String,
    email: String,
    role: Role,
    plan: Plan,
    token: String,
}

impl AuthResponse {
    fn new(message: &'static str, out: AuthOutput) -> Self {
        Self {
            message,
            id: out.user.id,
            nombre: out.user.first_name,
            email: out.user.email,
            role: out.user.role,
            plan: out.user.plan,
            token: out.token,
        }
    }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(first_name), Some(last_name), Some(email), Some(password)) =
        (body.nombre, body.apellido, body.email, body.password)
    else {
        return Err(ApiError::bad_request("Por favor, completa todos los campos"));
    };

    let out = state
        .auth
        .register(RegisterInput {
            first_name,
            last_name,
            email,
            password,
            role: body.role.unwrap_or_default(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("¡Usuario registrado exitosamente!", out)),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = body.email.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let out = state
        .auth
        .login(&email, &password)
        .await
        .map_err(|e| match e {
            MarketError::NotFound { .. } => ApiError::NotFound(AuthError::UnknownEmail.to_string()),
            other => other.into(),
        })?;

    Ok(Json(AuthResponse::new("Login exitoso", out)))
}

pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerQuery {
    is_premium: Option<String>,
    is_disponible: Option<String>,
    is_available: Option<String>,
}

impl FreelancerQuery {
    fn into_filter(self) -> FreelancerFilter {
        let availability = self.is_disponible.or(self.is_available);
        FreelancerFilter {
            premium_only: self.is_premium.as_deref() == Some("true"),
            available_only: availability.as_deref() == Some("true"),
            ids: None,
        }
    }
}

pub async fn list_freelancers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FreelancerQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.directory.freelancers(query.into_filter()).await?))
}

pub async fn premium_freelancers(
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.directory.premium_freelancers().await?))
}

pub async fn freelancers_by_main_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.directory.by_main_category(&category).await?))
}

pub async fn freelancers_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.directory.by_category(&category).await?))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id, "user")?;
    Ok(Json(state.users.get_by_id(id).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    nombre: Option<String>,
    apellido: Option<String>,
    email: Option<String>,
    password: Option<String>,
    linkedin: Option<String>,
    portfolio: Option<String>,
    descripcion: Option<String>,
    tarifa: Option<f64>,
}

/// Always updates the caller; the path id is ignored.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(_id): Path<String>,
    JsonBody(body): JsonBody<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let password_hash = body
        .password
        .as_deref()
        .map(|p| state.auth.hash_new_password(p))
        .transpose()?;

    let user = state
        .users
        .update(
            caller.id,
            UpdateUser {
                first_name: body.nombre,
                last_name: body.apellido,
                email: body.email.map(|e| conectar_auth::service::normalize_email(&e)),
                password_hash,
                linkedin: body.linkedin,
                portfolio: body.portfolio,
                description: body.descripcion,
                rate: body.tarifa,
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(json!({
        "message": "Usuario actualizado exitosamente.",
        "user": user,
    })))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "user")?;
    if id != caller.id {
        return Err(ApiError::forbidden(
            "Acceso denegado. Solo puedes eliminar tu propia cuenta.",
        ));
    }

    state.users.delete(id).await?;
    info!(user_id = %id, "user deleted");
    Ok(Json(json!({ "message": "Usuario eliminado correctamente" })))
}

#[derive(Debug, Deserialize)]
pub struct BecomeFreelancerRequest {
    linkedin: Option<String>,
    portfolio: Option<String>,
    descripcion: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn become_freelancer(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    JsonBody(body): JsonBody<BecomeFreelancerRequest>,
) -> ApiResult<Json<User>> {
    let (Some(linkedin), Some(portfolio), Some(description)) = (
        non_blank(body.linkedin),
        non_blank(body.portfolio),
        non_blank(body.descripcion),
    ) else {
        return Err(ApiError::bad_request(
            "Todos los campos son obligatorios para ser freelancer",
        ));
    };

    let user = state
        .users
        .update(
            caller.id,
            UpdateUser {
                role: Some(Role::Freelancer),
                linkedin: Some(linkedin),
                portfolio: Some(portfolio),
                description: Some(description),
                ..Default::default()
            },
        )
        .await?;

    info!(user_id = %user.id, "user became freelancer");
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    is_disponible: Option<bool>,
}

pub async fn set_availability(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    JsonBody(body): JsonBody<AvailabilityRequest>,
) -> ApiResult<Json<User>> {
    let available = body
        .is_disponible
        .ok_or_else(|| ApiError::bad_request("El estado debe ser booleano (true/false)"))?;

    let user = state
        .users
        .update(
            caller.id,
            UpdateUser {
                is_available: Some(available),
                ..Default::default()
            },
        )
        .await?;
    Ok(Json(user))
}

/// Premium implies freelancer.
pub(crate) async fn upgrade_to_premium(state: &AppState, user_id: Uuid) -> MarketResult<User> {
    let user = state
        .users
        .update(
            user_id,
            UpdateUser {
                plan: Some(Plan::Premium),
                role: Some(Role::Freelancer),
                ..Default::default()
            },
        )
        .await?;
    info!(user_id = %user_id, "user upgraded to premium");
    Ok(user)
}

pub async fn become_premium(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<User>> {
    Ok(Json(upgrade_to_premium(&state, caller.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct SkillsRequest {
    skills: Option<Vec<String>>,
}

pub async fn set_skills(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<SkillsRequest>,
) -> ApiResult<Json<User>> {
    let skills = body.skills.ok_or_else(|| {
        ApiError::bad_request("El campo skills es obligatorio y debe ser un array.")
    })?;

    if parse_id(&id, "user").ok() != Some(caller.id) {
        return Err(ApiError::forbidden(
            "Acceso denegado: No puedes actualizar otro usuario.",
        ));
    }

    Ok(Json(state.users.set_skills(caller.id, skills).await?))
}

/// Run one request through the visit-dedup window and persist the result.
///
/// Read-modify-write without a lock: two simultaneous first visits from
/// the same IP can both count.
pub(crate) async fn count_visit(
    state: &AppState,
    mut user: User,
    source_ip: &str,
) -> MarketResult<VisitOutcome> {
    let outcome = stats::record_visit(&mut user, source_ip, Utc::now());
    if outcome.counted {
        state
            .users
            .save_visits(user.id, user.visit_history, user.visit_count)
            .await?;
    }
    Ok(outcome)
}

pub async fn record_visit(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "user")?;
    let user = state.users.get_by_id(id).await?;
    let outcome = count_visit(&state, user, &ip).await?;

    let message = if outcome.counted {
        "Visita registrada"
    } else {
        "Visita ya registrada en las últimas 24 horas"
    };
    Ok(Json(json!({ "message": message, "counted": outcome.counted })))
}

async fn bump(state: &AppState, raw_id: &str, counter: Counter) -> ApiResult<()> {
    let id = parse_id(raw_id, "user")?;
    state.users.increment_counter(id, counter).await?;
    Ok(())
}

pub async fn record_linkedin_access(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    bump(&state, &id, Counter::LinkedinAccess).await?;
    Ok(Json(json!({ "message": "Acceso a LinkedIn registrado" })))
}

pub async fn record_portfolio_access(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    bump(&state, &id, Counter::PortfolioAccess).await?;
    Ok(Json(json!({ "message": "Acceso a Portfolio registrado" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(premium: Option<&str>, disponible: Option<&str>, available: Option<&str>) -> FreelancerQuery {
        FreelancerQuery {
            is_premium: premium.map(String::from),
            is_disponible: disponible.map(String::from),
            is_available: available.map(String::from),
        }
    }

    #[test]
    fn filter_flags_require_literal_true() {
        let f = query(Some("true"), None, Some("true")).into_filter();
        assert!(f.premium_only);
        assert!(f.available_only);

        let f = query(Some("1"), Some("yes"), None).into_filter();
        assert!(!f.premium_only);
        assert!(!f.available_only);
    }

    #[test]
    fn is_disponible_takes_precedence() {
        let f = query(None, Some("false"), Some("true")).into_filter();
        assert!(!f.available_only);
    }
}
