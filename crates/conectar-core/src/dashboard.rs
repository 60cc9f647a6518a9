//! Role-dependent dashboard composition.
//!
//! The composer reads from the identity, opinion and service stores and
//! never writes: stat counters are bumped by their own endpoints.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::MarketResult;
use crate::models::opinion::Opinion;
use crate::models::service::ServiceWithType;
use crate::models::user::User;
use crate::repository::{OpinionRepository, ServiceRepository, UserRepository};
use crate::stats::{
    ConversionRate, RatingDistribution, average_rating, conversion_rate, rating_distribution,
};

/// How many opinions the dashboard previews.
pub const RECENT_OPINIONS: usize = 5;

const CLIENT_MESSAGE: &str = "Dashboard de Cliente - Aquí puedes ver tu historial de opiniones";
const FREELANCER_MESSAGE: &str = "Dashboard de Freelancer - Gestiona tu perfil y servicios";
const PREMIUM_MESSAGE: &str = "Dashboard Premium - Acceso completo a estadísticas avanzadas";

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    #[serde(rename = "isFreelancer")]
    pub is_freelancer: bool,
    #[serde(rename = "isPremium")]
    pub is_premium: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            nombre: user.first_name.clone(),
            apellido: user.last_name.clone(),
            email: user.email.clone(),
            is_freelancer: user.is_freelancer(),
            is_premium: user.is_premium(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub total_opiniones_realizadas: usize,
    pub ultimas_opiniones: Vec<Opinion>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerStats {
    pub total_opiniones_recibidas: usize,
    pub promedio_calificacion: f64,
    pub total_servicios: usize,
    pub cant_visitas: u64,
    pub is_disponible: bool,
    pub ultimas_opiniones: Vec<Opinion>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumStats {
    #[serde(flatten)]
    pub base: FreelancerStats,
    pub cant_accesos_linkedin: u64,
    pub cant_accesos_portfolio: u64,
    pub distribucion_calificaciones: RatingDistribution,
    pub tasa_conversion: ConversionRate,
}

/// Profile fields only premium freelancers see on their dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct PremiumProfile {
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
    pub descripcion: Option<String>,
    pub tarifa: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientDashboard {
    pub usuario: UserSummary,
    pub estadisticas: ClientStats,
    pub mensaje: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FreelancerDashboard {
    pub usuario: UserSummary,
    pub estadisticas: FreelancerStats,
    pub servicios: Vec<ServiceWithType>,
    pub mensaje: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PremiumDashboard {
    pub usuario: UserSummary,
    pub estadisticas: PremiumStats,
    pub servicios: Vec<ServiceWithType>,
    pub perfil: PremiumProfile,
    pub mensaje: String,
}

/// One envelope per caller; serialized without a tag.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Dashboard {
    Client(ClientDashboard),
    Freelancer(FreelancerDashboard),
    Premium(PremiumDashboard),
}

/// Inputs the composer needs, already fetched and ordered most recent first.
#[derive(Debug, Default)]
pub struct DashboardInputs {
    pub authored: Vec<Opinion>,
    pub received: Vec<Opinion>,
    pub services: Vec<ServiceWithType>,
}

fn recent(opinions: &[Opinion]) -> Vec<Opinion> {
    opinions.iter().take(RECENT_OPINIONS).cloned().collect()
}

/// Build the envelope for `user`. Exactly one branch applies.
pub fn compose(user: &User, inputs: DashboardInputs) -> Dashboard {
    let usuario = UserSummary::from(user);

    if !user.is_freelancer() {
        return Dashboard::Client(ClientDashboard {
            usuario,
            estadisticas: ClientStats {
                total_opiniones_realizadas: inputs.authored.len(),
                ultimas_opiniones: recent(&inputs.authored),
            },
            mensaje: CLIENT_MESSAGE.into(),
        });
    }

    let base = FreelancerStats {
        total_opiniones_recibidas: inputs.received.len(),
        promedio_calificacion: average_rating(&inputs.received),
        total_servicios: inputs.services.len(),
        cant_visitas: user.visit_count,
        is_disponible: user.is_available,
        ultimas_opiniones: recent(&inputs.received),
    };

    if !user.is_premium() {
        return Dashboard::Freelancer(FreelancerDashboard {
            usuario,
            estadisticas: base,
            servicios: inputs.services,
            mensaje: FREELANCER_MESSAGE.into(),
        });
    }

    Dashboard::Premium(PremiumDashboard {
        usuario,
        estadisticas: PremiumStats {
            distribucion_calificaciones: rating_distribution(&inputs.received),
            tasa_conversion: conversion_rate(
                user.visit_count,
                user.linkedin_access_count,
                user.portfolio_access_count,
            ),
            cant_accesos_linkedin: user.linkedin_access_count,
            cant_accesos_portfolio: user.portfolio_access_count,
            base,
        },
        servicios: inputs.services,
        perfil: PremiumProfile {
            linkedin: user.linkedin.clone(),
            portfolio: user.portfolio.clone(),
            descripcion: user.description.clone(),
            tarifa: user.rate,
        },
        mensaje: PREMIUM_MESSAGE.into(),
    })
}

/// Dashboard service.
///
/// Generic over repository implementations so that the composer has no
/// dependency on the database crate.
#[derive(Clone)]
pub struct DashboardService<U: UserRepository, O: OpinionRepository, S: ServiceRepository> {
    users: U,
    opinions: O,
    services: S,
}

impl<U: UserRepository, O: OpinionRepository, S: ServiceRepository> DashboardService<U, O, S> {
    pub fn new(users: U, opinions: O, services: S) -> Self {
        Self {
            users,
            opinions,
            services,
        }
    }

    /// Fetch what the caller's branch needs and compose the envelope.
    pub async fn dashboard(&self, user_id: Uuid) -> MarketResult<Dashboard> {
        let user = self.users.get_by_id(user_id).await?;

        let inputs = if user.is_freelancer() {
            DashboardInputs {
                received: self.opinions.list_received(user_id).await?,
                services: self.services.list_by_freelancer(user_id).await?,
                ..Default::default()
            }
        } else {
            DashboardInputs {
                authored: self.opinions.list_authored(user_id).await?,
                ..Default::default()
            }
        };

        debug!(
            user_id = %user_id,
            freelancer = user.is_freelancer(),
            premium = user.is_premium(),
            "Composing dashboard"
        );

        Ok(compose(&user, inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::service_type::ServiceType;
    use crate::models::user::{Plan, Role};
    use chrono::{Duration, Utc};

    fn user(role: Role, plan: Plan) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            first_name: "Lucía".into(),
            last_name: "Gómez".into(),
            email: "lucia@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role,
            plan,
            linkedin: Some("https://www.linkedin.com/in/lucia".into()),
            portfolio: Some("https://lucia.dev".into()),
            description: Some("Backend".into()),
            rate: Some(25.0),
            is_available: true,
            skills: vec!["RUST".into()],
            visit_count: 100,
            linkedin_access_count: 10,
            portfolio_access_count: 5,
            visit_history: vec![],
            opinion_ids: vec![],
            service_ids: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn opinions(scores: &[u8]) -> Vec<Opinion> {
        let now = Utc::now();
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| Opinion {
                id: Uuid::new_v4(),
                recipient_id: Uuid::new_v4(),
                author_id: Uuid::new_v4(),
                score,
                body: format!("opinion {i}"),
                created_at: now - Duration::minutes(i as i64),
            })
            .collect()
    }

    fn service() -> ServiceWithType {
        let now = Utc::now();
        ServiceWithType {
            id: Uuid::new_v4(),
            freelancer_id: Uuid::new_v4(),
            service_type: ServiceType {
                id: Uuid::new_v4(),
                name: "API REST".into(),
                category: "Backend".into(),
                main_category: "Desarrollo".into(),
                base_description: None,
            },
            price: 100.0,
            description: "APIs".into(),
            estimated_duration: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn client_sees_authored_history() {
        let u = user(Role::Client, Plan::Free);
        let authored = opinions(&[5, 4, 3, 2, 1, 5, 4]);
        let first_body = authored[0].body.clone();

        let Dashboard::Client(d) = compose(
            &u,
            DashboardInputs {
                authored,
                ..Default::default()
            },
        ) else {
            panic!("expected client dashboard");
        };

        assert_eq!(d.estadisticas.total_opiniones_realizadas, 7);
        assert_eq!(d.estadisticas.ultimas_opiniones.len(), RECENT_OPINIONS);
        assert_eq!(d.estadisticas.ultimas_opiniones[0].body, first_body);
        assert!(!d.usuario.is_freelancer);
    }

    #[test]
    fn free_freelancer_gets_basic_stats() {
        let u = user(Role::Freelancer, Plan::Free);
        let d = compose(
            &u,
            DashboardInputs {
                received: opinions(&[5, 4, 4]),
                services: vec![service()],
                ..Default::default()
            },
        );

        let json = serde_json::to_value(&d).unwrap();
        let stats = &json["estadisticas"];
        assert_eq!(stats["totalOpinionesRecibidas"], 3);
        assert_eq!(stats["promedioCalificacion"], 4.3);
        assert_eq!(stats["totalServicios"], 1);
        assert_eq!(stats["cantVisitas"], 100);
        assert_eq!(stats["isDisponible"], true);
        assert!(stats.get("tasaConversion").is_none());
        assert!(json.get("perfil").is_none());
        assert_eq!(json["servicios"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn premium_freelancer_gets_extended_stats() {
        let u = user(Role::Freelancer, Plan::Premium);
        let d = compose(
            &u,
            DashboardInputs {
                received: opinions(&[5, 5, 3, 1, 5]),
                ..Default::default()
            },
        );

        let json = serde_json::to_value(&d).unwrap();
        let stats = &json["estadisticas"];
        assert_eq!(stats["promedioCalificacion"], 3.8);
        assert_eq!(stats["cantAccesosLinkedin"], 10);
        assert_eq!(stats["cantAccesosPortfolio"], 5);
        assert_eq!(
            stats["distribucionCalificaciones"],
            serde_json::json!({"1": 1, "2": 0, "3": 1, "4": 0, "5": 3})
        );
        assert_eq!(
            stats["tasaConversion"],
            serde_json::json!({"linkedin": 10.0, "portfolio": 5.0, "total": 15.0})
        );
        assert_eq!(json["perfil"]["tarifa"], 25.0);
        assert_eq!(json["usuario"]["isPremium"], true);
    }

    #[test]
    fn freelancer_without_opinions_uses_default_rating() {
        let u = user(Role::Freelancer, Plan::Free);
        let Dashboard::Freelancer(d) = compose(&u, DashboardInputs::default()) else {
            panic!("expected freelancer dashboard");
        };
        assert_eq!(d.estadisticas.promedio_calificacion, 0.0);
        assert!(d.estadisticas.ultimas_opiniones.is_empty());
    }

    #[test]
    fn summary_never_carries_the_password_hash() {
        let u = user(Role::Client, Plan::Free);
        let json = serde_json::to_string(&compose(&u, DashboardInputs::default())).unwrap();
        assert!(!json.contains("argon2"));
    }
}
