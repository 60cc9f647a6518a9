//! Public freelancer directory.
//!
//! Listings expand the id lists stored on the user into full services
//! (with their type) and received opinions, and attach the average rating.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::MarketResult;
use crate::models::opinion::Opinion;
use crate::models::service::ServiceWithType;
use crate::models::user::{FreelancerFilter, Plan, Role, User};
use crate::repository::{OpinionRepository, ServiceRepository, ServiceTypeRepository, UserRepository};
use crate::stats::average_rating;

/// Client-facing profile fields shared by every listing.
#[derive(Debug, Clone, Serialize)]
pub struct FreelancerProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub role: Role,
    pub plan: Plan,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
    pub descripcion: Option<String>,
    pub tarifa: Option<f64>,
    #[serde(rename = "isDisponible")]
    pub is_available: bool,
    pub skills: Vec<String>,
    #[serde(rename = "cantVisitas")]
    pub visit_count: u64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for FreelancerProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nombre: user.first_name,
            apellido: user.last_name,
            email: user.email,
            role: user.role,
            plan: user.plan,
            linkedin: user.linkedin,
            portfolio: user.portfolio,
            descripcion: user.description,
            tarifa: user.rate,
            is_available: user.is_available,
            skills: user.skills,
            visit_count: user.visit_count,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FreelancerSummary {
    #[serde(flatten)]
    pub profile: FreelancerProfile,
    pub servicios: Vec<ServiceWithType>,
    pub opiniones: Vec<Opinion>,
    #[serde(rename = "averageRating")]
    pub average_rating: f64,
}

/// Entry of the premium showcase. `rating` is the display string.
#[derive(Debug, Clone, Serialize)]
pub struct PremiumFreelancer {
    #[serde(flatten)]
    pub profile: FreelancerProfile,
    pub opiniones: Vec<Opinion>,
    pub rating: String,
    #[serde(rename = "calculatedRating")]
    pub calculated_rating: f64,
}

impl PremiumFreelancer {
    pub fn new(user: User, opinions: Vec<Opinion>) -> Self {
        let calculated_rating = average_rating(&opinions);
        Self {
            profile: user.into(),
            opiniones: opinions,
            rating: format!("{calculated_rating:.1}"),
            calculated_rating,
        }
    }
}

/// Highest rating first. Ties keep their input order.
pub fn rank_by_rating(freelancers: &mut [PremiumFreelancer]) {
    freelancers.sort_by(|a, b| b.calculated_rating.total_cmp(&a.calculated_rating));
}

fn group_by<T, F: Fn(&T) -> Uuid>(items: Vec<T>, key: F) -> HashMap<Uuid, Vec<T>> {
    let mut groups: HashMap<Uuid, Vec<T>> = HashMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}

/// Read-only directory over the identity, opinion and catalog stores.
#[derive(Clone)]
pub struct DirectoryService<U, O, S, T>
where
    U: UserRepository,
    O: OpinionRepository,
    S: ServiceRepository,
    T: ServiceTypeRepository,
{
    users: U,
    opinions: O,
    services: S,
    service_types: T,
}

impl<U, O, S, T> DirectoryService<U, O, S, T>
where
    U: UserRepository,
    O: OpinionRepository,
    S: ServiceRepository,
    T: ServiceTypeRepository,
{
    pub fn new(users: U, opinions: O, services: S, service_types: T) -> Self {
        Self {
            users,
            opinions,
            services,
            service_types,
        }
    }

    pub async fn freelancers(&self, filter: FreelancerFilter) -> MarketResult<Vec<FreelancerSummary>> {
        let users = self.users.list_freelancers(filter).await?;
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        let mut opinions = group_by(
            self.opinions.list_for_recipients(&ids).await?,
            |o: &Opinion| o.recipient_id,
        );
        let mut services = group_by(
            self.services.list_by_freelancers(&ids).await?,
            |s: &ServiceWithType| s.freelancer_id,
        );

        Ok(users
            .into_iter()
            .map(|user| {
                let opiniones = opinions.remove(&user.id).unwrap_or_default();
                let servicios = services.remove(&user.id).unwrap_or_default();
                FreelancerSummary {
                    average_rating: average_rating(&opiniones),
                    profile: user.into(),
                    servicios,
                    opiniones,
                }
            })
            .collect())
    }

    /// Premium and available freelancers, best rated first.
    pub async fn premium_freelancers(&self) -> MarketResult<Vec<PremiumFreelancer>> {
        let users = self
            .users
            .list_freelancers(FreelancerFilter {
                premium_only: true,
                available_only: true,
                ids: None,
            })
            .await?;
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        let mut opinions = group_by(
            self.opinions.list_for_recipients(&ids).await?,
            |o: &Opinion| o.recipient_id,
        );

        let mut ranked: Vec<PremiumFreelancer> = users
            .into_iter()
            .map(|user| {
                let received = opinions.remove(&user.id).unwrap_or_default();
                PremiumFreelancer::new(user, received)
            })
            .collect();
        rank_by_rating(&mut ranked);
        Ok(ranked)
    }

    /// Freelancers offering a service whose main category matches, ignoring case.
    pub async fn by_main_category(&self, main_category: &str) -> MarketResult<Vec<FreelancerSummary>> {
        let types = self
            .service_types
            .find_by_main_category_ci(main_category)
            .await?;
        self.offering(types.iter().map(|t| t.id).collect()).await
    }

    /// Freelancers offering a service whose category matches, ignoring case.
    pub async fn by_category(&self, category: &str) -> MarketResult<Vec<FreelancerSummary>> {
        let types = self.service_types.find_by_category_ci(category).await?;
        self.offering(types.iter().map(|t| t.id).collect()).await
    }

    async fn offering(&self, type_ids: Vec<Uuid>) -> MarketResult<Vec<FreelancerSummary>> {
        if type_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = self.services.freelancer_ids_for_types(&type_ids).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.freelancers(FreelancerFilter {
            ids: Some(ids),
            ..Default::default()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            first_name: name.into(),
            last_name: "Test".into(),
            email: format!("{name}@example.com"),
            password_hash: "hash".into(),
            role: Role::Freelancer,
            plan: Plan::Premium,
            linkedin: None,
            portfolio: None,
            description: None,
            rate: None,
            is_available: true,
            skills: vec![],
            visit_count: 0,
            linkedin_access_count: 0,
            portfolio_access_count: 0,
            visit_history: vec![],
            opinion_ids: vec![],
            service_ids: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn received(recipient: Uuid, scores: &[u8]) -> Vec<Opinion> {
        scores
            .iter()
            .map(|&score| Opinion {
                id: Uuid::new_v4(),
                recipient_id: recipient,
                author_id: Uuid::new_v4(),
                score,
                body: "bien".into(),
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn premium_entry_formats_rating() {
        let u = user("ana");
        let ops = received(u.id, &[5, 4, 4]);
        let entry = PremiumFreelancer::new(u, ops);
        assert_eq!(entry.rating, "4.3");
        assert_eq!(entry.calculated_rating, 4.3);

        let unrated = PremiumFreelancer::new(user("bea"), vec![]);
        assert_eq!(unrated.rating, "0.0");
        assert_eq!(unrated.calculated_rating, 0.0);
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let a = user("a");
        let b = user("b");
        let c = user("c");
        let d = user("d");
        let (a_id, b_id, c_id, d_id) = (a.id, b.id, c.id, d.id);

        let mut list = vec![
            PremiumFreelancer::new(a, received(a_id, &[3])),
            PremiumFreelancer::new(b, received(b_id, &[5, 5])),
            PremiumFreelancer::new(c, vec![]),
            PremiumFreelancer::new(d, received(d_id, &[3])),
        ];
        rank_by_rating(&mut list);

        let order: Vec<Uuid> = list.iter().map(|f| f.profile.id).collect();
        assert_eq!(order, vec![b_id, a_id, d_id, c_id]);
    }

    #[test]
    fn profile_hides_private_fields() {
        let entry = PremiumFreelancer::new(user("ana"), vec![]);
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("visit_history").is_none());
        assert_eq!(json["nombre"], "ana");
        assert_eq!(json["role"], "freelancer");
        assert_eq!(json["calculatedRating"], 0.0);
    }
}
