//! ConectAR API: axum REST surface over the marketplace stores, plus
//! the MercadoPago and LinkedIn bridges.

pub mod bridge;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, LinkedInConfig, PaymentConfig};
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
