//! ConectAR Auth: password hashing, JWT issuance/validation and the
//! register/login flows.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthOutput, AuthService, RegisterInput};
pub use token::{Claims, ValidatedClaims};
