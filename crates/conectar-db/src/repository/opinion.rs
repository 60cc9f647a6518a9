//! SurrealDB implementation of [`OpinionRepository`].

use chrono::{DateTime, Utc};
use conectar_core::error::{MarketError, MarketResult};
use conectar_core::models::opinion::{CreateOpinion, MAX_SCORE, MIN_SCORE, Opinion};
use conectar_core::repository::OpinionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{id_strings, parse_uuid, record_exists};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OpinionRow {
    record_id: String,
    recipient_id: String,
    author_id: String,
    score: i64,
    body: String,
    created_at: DateTime<Utc>,
}

impl OpinionRow {
    fn try_into_opinion(self) -> Result<Opinion, DbError> {
        let score = u8::try_from(self.score)
            .map_err(|_| DbError::Decode(format!("score out of range: {}", self.score)))?;
        Ok(Opinion {
            id: parse_uuid(&self.record_id)?,
            recipient_id: parse_uuid(&self.recipient_id)?,
            author_id: parse_uuid(&self.author_id)?,
            score,
            body: self.body,
            created_at: self.created_at,
        })
    }
}

fn into_opinions(rows: Vec<OpinionRow>) -> Result<Vec<Opinion>, DbError> {
    rows.into_iter().map(OpinionRow::try_into_opinion).collect()
}

/// Checks that need no database access. Runs before anything is written.
fn validate(input: &CreateOpinion) -> MarketResult<()> {
    if input.author_id == input.recipient_id {
        return Err(MarketError::validation(
            "No puedes escribirte una opinión a ti mismo",
        ));
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&input.score) {
        return Err(MarketError::validation(format!(
            "La puntuación debe estar entre {MIN_SCORE} y {MAX_SCORE}"
        )));
    }
    if input.body.trim().is_empty() {
        return Err(MarketError::validation("La opinión no puede estar vacía"));
    }
    Ok(())
}

/// SurrealDB implementation of the Opinion repository.
///
/// Every write also maintains `opinion_ids` on the recipient, inside the
/// same transaction.
#[derive(Clone)]
pub struct SurrealOpinionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOpinionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select_where(&self, field: &str, user_id: Uuid) -> MarketResult<Vec<Opinion>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM opinion \
             WHERE {field} = $user_id ORDER BY created_at DESC"
        );
        let mut result = self
            .db
            .query(&query)
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OpinionRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_opinions(rows)?)
    }
}

impl<C: Connection> OpinionRepository for SurrealOpinionRepository<C> {
    async fn create(&self, input: CreateOpinion) -> MarketResult<Opinion> {
        validate(&input)?;

        if !record_exists(&self.db, "user", input.recipient_id).await? {
            return Err(DbError::not_found("user", input.recipient_id).into());
        }

        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('opinion', $id) SET \
                     recipient_id = $recipient_id, author_id = $author_id, \
                     score = $score, body = $body; \
                 UPDATE type::record('user', $recipient_id) SET \
                     opinion_ids += $id, updated_at = time::now(); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("recipient_id", input.recipient_id.to_string()))
            .bind(("author_id", input.author_id.to_string()))
            .bind(("score", input.score))
            .bind(("body", input.body.trim().to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(
            opinion_id = %id,
            recipient_id = %input.recipient_id,
            author_id = %input.author_id,
            score = input.score,
            "Opinion created"
        );
        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> MarketResult<Opinion> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('opinion', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OpinionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("opinion", id))?;

        Ok(row.try_into_opinion()?)
    }

    async fn list_received(&self, user_id: Uuid) -> MarketResult<Vec<Opinion>> {
        self.select_where("recipient_id", user_id).await
    }

    async fn list_authored(&self, user_id: Uuid) -> MarketResult<Vec<Opinion>> {
        self.select_where("author_id", user_id).await
    }

    async fn list_for_recipients(&self, user_ids: &[Uuid]) -> MarketResult<Vec<Opinion>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM opinion \
                 WHERE recipient_id IN $ids ORDER BY created_at DESC",
            )
            .bind(("ids", id_strings(user_ids)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OpinionRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_opinions(rows)?)
    }

    async fn delete(&self, id: Uuid) -> MarketResult<Opinion> {
        let opinion = self.get_by_id(id).await?;

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE type::record('opinion', $id); \
                 UPDATE type::record('user', $recipient_id) SET \
                     opinion_ids -= $id, updated_at = time::now(); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("recipient_id", opinion.recipient_id.to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(opinion_id = %id, "Opinion deleted");
        Ok(opinion)
    }
}
