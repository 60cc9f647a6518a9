//! `/api/servicios` handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use conectar_core::models::service::{CreateService, ServiceWithType, UpdateService};
use conectar_core::models::service_type::ServiceType;
use conectar_core::repository::{ServiceRepository, ServiceTypeRepository};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, JsonBody, parse_id};
use crate::state::AppState;

pub async fn list_types(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ServiceType>>> {
    Ok(Json(state.service_types.list_all().await?))
}

pub async fn list_by_freelancer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ServiceWithType>>> {
    let id = parse_id(&id, "user")?;
    Ok(Json(state.services.list_by_freelancer(id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    tipo_servicio: Option<String>,
    precio: Option<f64>,
    descripcion: Option<String>,
    tiempo_estimado: Option<String>,
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    AuthUser(freelancer): AuthUser,
    JsonBody(body): JsonBody<CreateServiceRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(service_type), Some(price), Some(description)) =
        (body.tipo_servicio, body.precio, body.descripcion)
    else {
        return Err(ApiError::bad_request(
            "Faltan datos obligatorios (tipo, precio o descripción)",
        ));
    };

    let service = state
        .services
        .create(CreateService {
            freelancer_id: freelancer.id,
            service_type_id: parse_id(&service_type, "service_type")?,
            price,
            description,
            estimated_duration: body.tiempo_estimado,
        })
        .await?;

    info!(service_id = %service.id, freelancer_id = %freelancer.id, "service created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Servicio agregado correctamente",
            "servicio": service,
        })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    precio: Option<f64>,
    descripcion_personalizada: Option<String>,
    tiempo_estimado: Option<String>,
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    AuthUser(freelancer): AuthUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateServiceRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "service")?;
    let service = state
        .services
        .update(
            id,
            freelancer.id,
            UpdateService {
                price: body.precio,
                description: body.descripcion_personalizada,
                estimated_duration: body.tiempo_estimado,
            },
        )
        .await?;

    Ok(Json(json!({
        "message": "Servicio actualizado correctamente",
        "servicio": service,
    })))
}

pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    AuthUser(freelancer): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "service")?;
    state.services.delete(id, freelancer.id).await?;

    info!(service_id = %id, freelancer_id = %freelancer.id, "service deleted");
    Ok(Json(json!({ "message": "Servicio eliminado correctamente" })))
}
