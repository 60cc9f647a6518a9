//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of skills a profile may list.
pub const MAX_SKILLS: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    #[serde(rename = "cliente", alias = "client")]
    Client,
    #[serde(rename = "freelancer")]
    Freelancer,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Premium,
}

/// Last time a given source IP was counted as a profile visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitRecord {
    pub ip: String,
    #[serde(rename = "lastVisit")]
    pub last_visit: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    pub email: String,
    /// Argon2id PHC string. Never leaves the server.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub plan: Plan,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    /// Reference hourly price shown on premium profiles.
    #[serde(rename = "tarifa")]
    pub rate: Option<f64>,
    #[serde(rename = "isDisponible")]
    pub is_available: bool,
    pub skills: Vec<String>,
    #[serde(rename = "cantVisitas")]
    pub visit_count: u64,
    #[serde(rename = "cantAccesosLinkedin")]
    pub linkedin_access_count: u64,
    #[serde(rename = "cantAccesosPortfolio")]
    pub portfolio_access_count: u64,
    /// One entry per distinct source IP. Kept server-side.
    #[serde(skip_serializing, default)]
    pub visit_history: Vec<VisitRecord>,
    /// Received opinions.
    #[serde(rename = "opiniones")]
    pub opinion_ids: Vec<Uuid>,
    /// Offered services.
    #[serde(rename = "servicios")]
    pub service_ids: Vec<Uuid>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_freelancer(&self) -> bool {
        self.role == Role::Freelancer
    }

    pub fn is_premium(&self) -> bool {
        self.plan == Plan::Premium
    }
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Already-hashed password; hashing happens in the auth layer.
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub plan: Option<Plan>,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
    pub description: Option<String>,
    pub rate: Option<f64>,
    pub is_available: Option<bool>,
}

/// Filters for the freelancer directory.
#[derive(Debug, Clone, Default)]
pub struct FreelancerFilter {
    pub premium_only: bool,
    pub available_only: bool,
    /// Restrict to these user ids (category search).
    pub ids: Option<Vec<Uuid>>,
}

/// Click counters that can be bumped independently of the visit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    LinkedinAccess,
    PortfolioAccess,
}
