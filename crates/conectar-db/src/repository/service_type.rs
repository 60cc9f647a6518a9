//! SurrealDB implementation of [`ServiceTypeRepository`].

use std::collections::BTreeSet;

use conectar_core::error::{MarketError, MarketResult};
use conectar_core::models::service_type::{CreateServiceType, ServiceType};
use conectar_core::repository::ServiceTypeRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{CountRow, id_strings, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
pub(super) struct ServiceTypeRow {
    record_id: String,
    name: String,
    category: String,
    main_category: String,
    base_description: Option<String>,
}

impl ServiceTypeRow {
    pub(super) fn try_into_service_type(self) -> Result<ServiceType, DbError> {
        Ok(ServiceType {
            id: parse_uuid(&self.record_id)?,
            name: self.name,
            category: self.category,
            main_category: self.main_category,
            base_description: self.base_description,
        })
    }
}

fn into_service_types(rows: Vec<ServiceTypeRow>) -> Result<Vec<ServiceType>, DbError> {
    rows.into_iter()
        .map(ServiceTypeRow::try_into_service_type)
        .collect()
}

/// Fetch the given service types, in no particular order.
pub(super) async fn fetch_many<C: Connection>(
    db: &Surreal<C>,
    ids: &[Uuid],
) -> Result<Vec<ServiceType>, DbError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut result = db
        .query(
            "SELECT meta::id(id) AS record_id, * FROM service_type \
             WHERE meta::id(id) IN $ids",
        )
        .bind(("ids", id_strings(ids)))
        .await?;
    let rows: Vec<ServiceTypeRow> = result.take(0)?;
    into_service_types(rows)
}

/// SurrealDB implementation of the ServiceType repository.
#[derive(Clone)]
pub struct SurrealServiceTypeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealServiceTypeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Select by an arbitrary WHERE clause binding `$value`, sorted by name.
    async fn select_where(&self, clause: &str, value: &str) -> MarketResult<Vec<ServiceType>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM service_type \
             WHERE {clause} ORDER BY name ASC"
        );
        let mut result = self
            .db
            .query(&query)
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceTypeRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_service_types(rows)?)
    }
}

impl<C: Connection> ServiceTypeRepository for SurrealServiceTypeRepository<C> {
    async fn create(&self, input: CreateServiceType) -> MarketResult<ServiceType> {
        let name = input.name.trim().to_string();
        let category = input.category.trim().to_string();
        let main_category = input.main_category.trim().to_string();
        if name.is_empty() || category.is_empty() || main_category.is_empty() {
            return Err(MarketError::validation(
                "Nombre, categoría y categoría principal son obligatorios",
            ));
        }

        let mut count = self
            .db
            .query("SELECT count() AS total FROM service_type WHERE name = $name GROUP ALL")
            .bind(("name", name.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = count.take(0).map_err(DbError::from)?;
        if rows.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(MarketError::already_exists(
                "service_type",
                "Ya existe un tipo de servicio con ese nombre",
            ));
        }

        let id = Uuid::new_v4();
        let result = self
            .db
            .query(
                "CREATE type::record('service_type', $id) SET \
                 name = $name, category = $category, \
                 main_category = $main_category, \
                 base_description = $base_description",
            )
            .bind(("id", id.to_string()))
            .bind(("name", name))
            .bind(("category", category))
            .bind(("main_category", main_category))
            .bind(("base_description", input.base_description))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(service_type_id = %id, "Service type created");
        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> MarketResult<ServiceType> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('service_type', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceTypeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service_type", id))?;

        Ok(row.try_into_service_type()?)
    }

    async fn list_all(&self) -> MarketResult<Vec<ServiceType>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM service_type ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceTypeRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_service_types(rows)?)
    }

    async fn list_by_main_category(&self, main_category: &str) -> MarketResult<Vec<ServiceType>> {
        self.select_where("main_category = $value", main_category)
            .await
    }

    async fn list_by_category(&self, category: &str) -> MarketResult<Vec<ServiceType>> {
        self.select_where("category = $value", category).await
    }

    async fn distinct_main_categories(&self) -> MarketResult<BTreeSet<String>> {
        let mut result = self
            .db
            .query("SELECT VALUE main_category FROM service_type")
            .await
            .map_err(DbError::from)?;

        let names: Vec<String> = result.take(0).map_err(DbError::from)?;
        Ok(names.into_iter().collect())
    }

    async fn find_by_main_category_ci(&self, main_category: &str) -> MarketResult<Vec<ServiceType>> {
        self.select_where(
            "string::lowercase(main_category) = string::lowercase($value)",
            main_category.trim(),
        )
        .await
    }

    async fn find_by_category_ci(&self, category: &str) -> MarketResult<Vec<ServiceType>> {
        self.select_where(
            "string::lowercase(category) = string::lowercase($value)",
            category.trim(),
        )
        .await
    }
}
