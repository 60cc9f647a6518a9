//! ConectAR Core: domain models, store contracts, and the rating and
//! dashboard logic shared by the database and API crates.
//!
//! This crate provides:
//! - Models and the error taxonomy ([`MarketError`])
//! - Repository traits implemented by `conectar-db`
//! - Statistics ([`stats`]), dashboards ([`dashboard`]) and the freelancer
//!   directory ([`listing`])

pub mod dashboard;
pub mod error;
pub mod listing;
pub mod models;
pub mod repository;
pub mod stats;

pub use dashboard::{Dashboard, DashboardService};
pub use error::{MarketError, MarketResult};
pub use listing::DirectoryService;
