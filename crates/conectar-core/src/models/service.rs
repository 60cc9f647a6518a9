//! Freelancer service offering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::service_type::ServiceType;

/// Maximum length (in characters) of a service description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// A priced offering of one [`ServiceType`] by a freelancer.
///
/// A freelancer may offer each service type at most once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "freelancer")]
    pub freelancer_id: Uuid,
    #[serde(rename = "tipoServicio")]
    pub service_type_id: Uuid,
    #[serde(rename = "precio")]
    pub price: f64,
    #[serde(rename = "descripcionPersonalizada")]
    pub description: String,
    #[serde(rename = "tiempoEstimado", skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A [`Service`] with its service type resolved to the full record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceWithType {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "freelancer")]
    pub freelancer_id: Uuid,
    #[serde(rename = "tipoServicio")]
    pub service_type: ServiceType,
    #[serde(rename = "precio")]
    pub price: f64,
    #[serde(rename = "descripcionPersonalizada")]
    pub description: String,
    #[serde(rename = "tiempoEstimado", skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn with_type(self, service_type: ServiceType) -> ServiceWithType {
        ServiceWithType {
            id: self.id,
            freelancer_id: self.freelancer_id,
            service_type,
            price: self.price,
            description: self.description,
            estimated_duration: self.estimated_duration,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateService {
    pub freelancer_id: Uuid,
    pub service_type_id: Uuid,
    pub price: f64,
    pub description: String,
    pub estimated_duration: Option<String>,
}

/// Editable fields. The service type is fixed once created.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateService {
    pub price: Option<f64>,
    pub description: Option<String>,
    pub estimated_duration: Option<String>,
}
