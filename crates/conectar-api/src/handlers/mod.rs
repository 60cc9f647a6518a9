//! Request handlers, one module per resource.

pub mod catalog;
pub mod dashboard;
pub mod linkedin;
pub mod opinions;
pub mod payments;
pub mod services;
pub mod users;

use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

/// `GET /` liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({
        "message": "¡Hola! Tu servidor está funcionando",
        "fecha": Utc::now(),
    }))
}
