//! Route table.

use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::routing::{delete, get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{catalog, dashboard, health, linkedin, opinions, payments, services, users};
use crate::state::AppState;

fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/", get(users::list_users))
        .route("/freelancers", get(users::list_freelancers))
        .route("/freelancers/premium", get(users::premium_freelancers))
        .route(
            "/freelancers/category-main/{category}",
            get(users::freelancers_by_main_category),
        )
        .route(
            "/freelancers/category-specific/{category}",
            get(users::freelancers_by_category),
        )
        .route("/hacerse-freelancer", put(users::become_freelancer))
        .route("/availability", put(users::set_availability))
        .route("/hacerse-premium", put(users::become_premium))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/{id}/skills", put(users::set_skills))
        .route("/{id}/visitas", put(users::record_visit))
        .route("/{id}/linkedin", put(users::record_linkedin_access))
        .route("/{id}/portfolio", put(users::record_portfolio_access))
}

fn opinion_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(opinions::create_opinion))
        .route("/recibidas/{usuario_id}", get(opinions::received_opinions))
        .route("/realizadas/{usuario_id}", get(opinions::authored_opinions))
        .route("/{id}", delete(opinions::delete_opinion))
}

fn service_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/types", get(services::list_types))
        .route("/freelancer/{id}", get(services::list_by_freelancer))
        .route("/", post(services::create_service))
        .route(
            "/{id}",
            put(services::update_service).delete(services::delete_service),
        )
}

fn type_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(catalog::list_service_types))
        .route("/categorias", get(catalog::categories))
        .route("/nombres", get(catalog::names))
        .route("/categorias-principales", get(catalog::main_categories))
}

fn technology_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/available", get(catalog::available_technologies))
        .route("/", post(catalog::create_technology))
}

fn dashboard_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/stats/visitas", post(dashboard::track_visit))
        .route("/stats/linkedin", post(dashboard::track_linkedin))
        .route("/stats/portfolio", post(dashboard::track_portfolio))
}

fn payment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create_preference", post(payments::create_preference))
        .route("/webhook", post(payments::webhook))
}

fn linkedin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/connect", get(linkedin::connect))
        .route("/callback", get(linkedin::callback))
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .nest("/api/users", user_routes())
        .nest("/api/opinions", opinion_routes())
        .nest("/api/servicios", service_routes())
        .nest("/api/types", type_routes())
        .nest("/api/technologies", technology_routes())
        .nest("/api/dashboard", dashboard_routes())
        .nest("/api/mercadopago", payment_routes())
        .nest("/api/auth/linkedin", linkedin_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
