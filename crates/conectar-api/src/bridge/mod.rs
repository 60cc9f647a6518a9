//! Outbound integrations.

pub mod linkedin;
pub mod mercadopago;

pub use linkedin::LinkedInClient;
pub use mercadopago::MercadoPagoClient;
