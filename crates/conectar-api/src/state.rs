//! Shared application state.

use std::sync::Arc;

use axum::http::HeaderValue;
use conectar_auth::{AuthConfig, AuthService};
use conectar_core::dashboard::DashboardService;
use conectar_core::error::{MarketError, MarketResult};
use conectar_core::listing::DirectoryService;
use conectar_db::repository::{
    SurrealOpinionRepository, SurrealServiceRepository, SurrealServiceTypeRepository,
    SurrealTechnologyRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

use crate::bridge::{LinkedInClient, MercadoPagoClient};
use crate::config::{ApiConfig, CONNECT_TIMEOUT, REQUEST_TIMEOUT};

pub type Users = SurrealUserRepository<Any>;
pub type Opinions = SurrealOpinionRepository<Any>;
pub type Services = SurrealServiceRepository<Any>;
pub type ServiceTypes = SurrealServiceTypeRepository<Any>;
pub type Technologies = SurrealTechnologyRepository<Any>;

pub struct AppState {
    pub users: Users,
    pub opinions: Opinions,
    pub services: Services,
    pub service_types: ServiceTypes,
    pub technologies: Technologies,
    pub auth: AuthService<Users>,
    pub dashboards: DashboardService<Users, Opinions, Services>,
    pub directory: DirectoryService<Users, Opinions, Services, ServiceTypes>,
    pub payments: MercadoPagoClient,
    pub linkedin: LinkedInClient,
    pub cors_origin: HeaderValue,
}

impl AppState {
    pub fn new(
        db: Surreal<Any>,
        auth_config: AuthConfig,
        config: ApiConfig,
    ) -> MarketResult<Arc<Self>> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MarketError::Internal(format!("http client: {e}")))?;

        let cors_origin = config.frontend_url.parse::<HeaderValue>().map_err(|e| {
            MarketError::Internal(format!("invalid frontend url {}: {e}", config.frontend_url))
        })?;

        let users = Users::new(db.clone());
        let opinions = Opinions::new(db.clone());
        let services = Services::new(db.clone());
        let service_types = ServiceTypes::new(db.clone());

        Ok(Arc::new(Self {
            auth: AuthService::new(users.clone(), auth_config),
            dashboards: DashboardService::new(users.clone(), opinions.clone(), services.clone()),
            directory: DirectoryService::new(
                users.clone(),
                opinions.clone(),
                services.clone(),
                service_types.clone(),
            ),
            payments: MercadoPagoClient::new(http.clone(), config.payment),
            linkedin: LinkedInClient::new(http, config.linkedin),
            technologies: Technologies::new(db),
            users,
            opinions,
            services,
            service_types,
            cors_origin,
        }))
    }
}
