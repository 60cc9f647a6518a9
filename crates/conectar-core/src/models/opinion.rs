//! Opinion (rating + review) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest accepted score.
pub const MIN_SCORE: i64 = 1;
/// Highest accepted score.
pub const MAX_SCORE: i64 = 5;

/// A rating left by one user about another.
///
/// Immutable once created; only deletion is supported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Opinion {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// User who receives the opinion.
    #[serde(rename = "destinatario")]
    pub recipient_id: Uuid,
    /// User who wrote the opinion.
    #[serde(rename = "autor")]
    pub author_id: Uuid,
    #[serde(rename = "puntuacion")]
    pub score: u8,
    #[serde(rename = "opinion")]
    pub body: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOpinion {
    pub recipient_id: Uuid,
    pub author_id: Uuid,
    /// Raw score as received; validated against `MIN_SCORE..=MAX_SCORE`.
    pub score: i64,
    pub body: String,
}
