//! `/api/opinions` handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use conectar_core::models::opinion::{CreateOpinion, Opinion};
use conectar_core::repository::OpinionRepository;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, JsonBody, parse_id};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpinionRequest {
    destinatario_id: Option<String>,
    puntuacion: Option<i64>,
    opinion: Option<String>,
}

pub async fn create_opinion(
    State(state): State<Arc<AppState>>,
    AuthUser(author): AuthUser,
    JsonBody(body): JsonBody<CreateOpinionRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(recipient), Some(score), Some(text)) =
        (body.destinatario_id, body.puntuacion, body.opinion)
    else {
        return Err(ApiError::bad_request("Faltan datos obligatorios"));
    };

    let opinion = state
        .opinions
        .create(CreateOpinion {
            recipient_id: parse_id(&recipient, "user")?,
            author_id: author.id,
            score,
            body: text,
        })
        .await?;

    info!(
        opinion_id = %opinion.id,
        author_id = %opinion.author_id,
        recipient_id = %opinion.recipient_id,
        "opinion created"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Opinión creada exitosamente",
            "opinion": opinion,
        })),
    ))
}

pub async fn received_opinions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Opinion>>> {
    let user_id = parse_id(&user_id, "user")?;
    Ok(Json(state.opinions.list_received(user_id).await?))
}

pub async fn authored_opinions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Opinion>>> {
    let user_id = parse_id(&user_id, "user")?;
    Ok(Json(state.opinions.list_authored(user_id).await?))
}

/// Only the author may delete an opinion.
pub async fn delete_opinion(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "opinion")?;
    let opinion = state.opinions.get_by_id(id).await?;
    if opinion.author_id != caller.id {
        return Err(ApiError::forbidden(
            "No puedes eliminar una opinión que no escribiste",
        ));
    }

    state.opinions.delete(id).await?;
    info!(opinion_id = %id, "opinion deleted");
    Ok(Json(json!({ "message": "Opinión eliminada correctamente" })))
}
