//! `/api/types` and `/api/technologies` handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use conectar_core::models::service_type::ServiceType;
use conectar_core::repository::{ServiceTypeRepository, TechnologyRepository};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, JsonBody};
use crate::state::AppState;

pub async fn list_service_types(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ServiceType>>> {
    Ok(Json(state.service_types.list_all().await?))
}

#[derive(Debug, Deserialize)]
pub struct MainCategoryQuery {
    principal: Option<String>,
}

/// Distinct sub-categories under a main category, in name order of
/// their first service type.
pub async fn categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MainCategoryQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let principal = query
        .principal
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Se requiere el parámetro 'principal'"))?;

    let types = state.service_types.list_by_main_category(&principal).await?;
    Ok(Json(unique_categories(types)))
}

fn unique_categories(types: Vec<ServiceType>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in types {
        if !out.contains(&t.category) {
            out.push(t.category);
        }
    }
    out
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    categoria: Option<String>,
}

pub async fn names(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Json<Vec<ServiceType>>> {
    let category = query
        .categoria
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("Se requiere el parámetro 'categoria'"))?;

    Ok(Json(state.service_types.list_by_category(&category).await?))
}

pub async fn main_categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    let mains = state.service_types.distinct_main_categories().await?;
    Ok(Json(mains.into_iter().collect()))
}

pub async fn available_technologies(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.technologies.list_names().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateTechnologyRequest {
    name: Option<String>,
}

pub async fn create_technology(
    State(state): State<Arc<AppState>>,
    _caller: AuthUser,
    JsonBody(body): JsonBody<CreateTechnologyRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("El nombre de la tecnología es obligatorio"))?;

    let technology = state.technologies.create(&name).await?;
    Ok((StatusCode::CREATED, Json(technology)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ty(name: &str, category: &str) -> ServiceType {
        ServiceType {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            main_category: "Desarrollo Web".into(),
            base_description: None,
        }
    }

    #[test]
    fn categories_are_deduplicated_in_order() {
        let types = vec![
            ty("API REST", "Backend"),
            ty("Landing Page", "Frontend"),
            ty("Microservicios", "Backend"),
            ty("Tienda Online", "E-commerce"),
        ];
        assert_eq!(
            unique_categories(types),
            vec!["Backend", "Frontend", "E-commerce"]
        );
    }
}
