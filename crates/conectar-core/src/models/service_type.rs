//! Service type taxonomy.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entry of the fixed service catalog, e.g. `Full Stack` under
/// `Desarrollo` / `Desarrollo Web`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceType {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "categoria_principal")]
    pub main_category: String,
    #[serde(rename = "descripcionBase", skip_serializing_if = "Option::is_none")]
    pub base_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceType {
    pub name: String,
    pub category: String,
    pub main_category: String,
    pub base_description: Option<String>,
}
