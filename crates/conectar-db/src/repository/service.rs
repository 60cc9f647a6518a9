//! SurrealDB implementation of [`ServiceRepository`].
//!
//! Services reference their freelancer and service type by id. Reads that
//! return [`ServiceWithType`] resolve the type with a second query.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use conectar_core::error::{MarketError, MarketResult};
use conectar_core::models::service::{
    CreateService, MAX_DESCRIPTION_LEN, Service, ServiceWithType, UpdateService,
};
use conectar_core::repository::ServiceRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{info, warn};
use uuid::Uuid;

use super::service_type::fetch_many;
use super::{CountRow, id_strings, parse_uuid, parse_uuids, record_exists, violates_index};
use crate::error::DbError;

const DUPLICATE_OFFER: &str = "Ya ofreces este tipo de servicio. Puedes editar el existente.";

#[derive(Debug, SurrealValue)]
struct ServiceRow {
    record_id: String,
    freelancer_id: String,
    service_type_id: String,
    price: f64,
    description: String,
    estimated_duration: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceRow {
    fn try_into_service(self) -> Result<Service, DbError> {
        Ok(Service {
            id: parse_uuid(&self.record_id)?,
            freelancer_id: parse_uuid(&self.freelancer_id)?,
            service_type_id: parse_uuid(&self.service_type_id)?,
            price: self.price,
            description: self.description,
            estimated_duration: self.estimated_duration,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn validate_price(price: f64) -> MarketResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(MarketError::validation("El precio no puede ser negativo"));
    }
    Ok(())
}

/// Trimmed description, or `Validation` when empty or too long.
fn validate_description(description: &str) -> MarketResult<String> {
    let trimmed = description.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_DESCRIPTION_LEN {
        return Err(MarketError::validation(format!(
            "La descripción debe tener entre 1 y {MAX_DESCRIPTION_LEN} caracteres"
        )));
    }
    Ok(trimmed.to_string())
}

/// SurrealDB implementation of the Service repository.
#[derive(Clone)]
pub struct SurrealServiceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealServiceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn get(&self, id: Uuid) -> MarketResult<Service> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('service', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service", id))?
            .try_into_service()?)
    }

    /// Whether `freelancer_id` already offers `service_type_id`.
    async fn offers_type(&self, freelancer_id: Uuid, service_type_id: Uuid) -> Result<bool, DbError> {
        if self.offers_type(input.freelancer_id, input.service_type_id).await? {
            return Err(MarketError::already_exists("service", DUPLICATE_OFFER));
        }

        let id = Uuid::new_v4();
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('service', $id) SET \
                     freelancer_id = $freelancer_id, \
                     service_type_id = $service_type_id, \
                     price = $price, description = $description, \
                     estimated_duration = $estimated_duration; \
                 UPDATE type::record('user', $freelancer_id) SET \
                     service_ids += $id, updated_at = time::now(); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("freelancer_id", input.freelancer_id.to_string()))
            .bind(("service_type_id", input.service_type_id.to_string()))
            .bind(("price", input.price))
            .bind(("description", description))
            .bind(("estimated_duration", input.estimated_duration))
            .await
            .map_err(DbError::from)?;

        // A concurrent create for the same pair loses on the unique index
        // or on the back-reference write.
        if let Err(e) = result.check() {
            let message = e.to_string();
            if violates_index(&message, "idx_service_freelancer_type")
                || self.offers_type(input.freelancer_id, input.service_type_id).await?
            {
                return Err(MarketError::already_exists("service", DUPLICATE_OFFER));
            }
            return Err(DbError::Query(message).into());
        }

        info!(
            service_id = %id,
            freelancer_id = %input.freelancer_id,
            service_type_id = %input.service_type_id,
            "Service created"
        );
        self.get(id).await
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        input: UpdateService,
    ) -> MarketResult<ServiceWithType> {
        if let Some(price) = input.price {
            validate_price(price)?;
        }
        let description = input
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;

        let mut sets = Vec::new();
        if input.price.is_some() {
            sets.push("price = $price");
        }
        if description.is_some() {
            sets.push("description = $description");
        }
        if input.estimated_duration.is_some() {
            sets.push("estimated_duration = $estimated_duration");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('service', $id) SET {} \
             WHERE freelancer_id = $owner RETURN VALUE meta::id(id)",
            sets.join(", ")
        );
        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("owner", owner_id.to_string()));
        if let Some(price) = input.price {
            builder = builder.bind(("price", price));
        }
        if let Some(description) = description {
            builder = builder.bind(("description", description));
        }
        if let Some(estimated_duration) = input.estimated_duration {
            builder = builder.bind(("estimated_duration", estimated_duration));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let updated: Vec<String> = result.take(0).map_err(DbError::from)?;
        if updated.is_empty() {
            return Err(DbError::not_found("service", id).into());
        }

        let service = self.get(id).await?;
        self.resolve(vec![service])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service_type", id).into())
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> MarketResult<Service> {
        let mut result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 LET $gone = (DELETE type::record('service', $id) \
                     WHERE freelancer_id = $owner RETURN BEFORE); \
                 IF array::len($gone) > 0 { \
                     UPDATE type::record('user', $owner) SET \
                         service_ids -= $id, updated_at = time::now(); \
                 }; \
                 SELECT meta::id(id) AS record_id, * FROM $gone; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("owner", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let last = result.num_statements().saturating_sub(1);
        let rows: Vec<ServiceRow> = result.take(last).map_err(DbError::from)?;
        let service = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service", id))?
            .try_into_service()?;

        info!(service_id = %id, freelancer_id = %owner_id, "Service deleted");
        Ok(service)
    }

    async fn list_by_freelancer(&self, freelancer_id: Uuid) -> MarketResult<Vec<ServiceWithType>> {
        self.list_by_freelancers(&[freelancer_id]).await
    }

    async fn list_by_freelancers(
        &self,
        freelancer_ids: &[Uuid],
    ) -> MarketResult<Vec<ServiceWithType>> {
        if freelancer_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM service \
                 WHERE freelancer_id IN $ids ORDER BY created_at ASC",
            )
            .bind(("ids", id_strings(freelancer_ids)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        let services = rows
            .into_iter()
            .map(ServiceRow::try_into_service)
            .collect::<Result<Vec<_>, DbError>>()?;

        self.resolve(services).await
    }

    async fn freelancer_ids_for_types(&self, type_ids: &[Uuid]) -> MarketResult<Vec<Uuid>> {
        if type_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query("SELECT VALUE freelancer_id FROM service WHERE service_type_id IN $ids")
            .bind(("ids", id_strings(type_ids)))
            .await
            .map_err(DbError::from)?;

        let raw: Vec<String> = result.take(0).map_err(DbError::from)?;
        let mut ids = parse_uuids(&raw)?;
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_price_is_rejected() {
        assert!(validate_price(-0.01).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(0.0).is_ok());
    }

    #[test]
    fn description_bounds() {
        assert!(validate_description("   ").is_err());
        assert!(validate_description(&"a".repeat(MAX_DESCRIPTION_LEN + 1)).is_err());
        assert_eq!(
            validate_description(&format!("  {}  ", "ñ".repeat(MAX_DESCRIPTION_LEN))).unwrap(),
            "ñ".repeat(MAX_DESCRIPTION_LEN)
        );
    }
}
