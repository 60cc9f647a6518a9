//! API configuration: frontend origin and the two outbound integrations.

use std::time::Duration;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origin (credentials enabled).
    pub frontend_url: String,
    pub payment: PaymentConfig,
    pub linkedin: LinkedInConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".into(),
            payment: PaymentConfig::default(),
            linkedin: LinkedInConfig::default(),
        }
    }
}

/// MercadoPago checkout settings.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Gateway credentials. Checkout is unavailable without them.
    pub access_token: Option<String>,
    pub api_base: String,
    pub success_url: Option<String>,
    pub failure_url: Option<String>,
    /// Dropped from the preference when it points at localhost.
    pub notification_url: Option<String>,
    pub item_title: String,
    pub unit_price: f64,
    pub currency: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base: "https://api.mercadopago.com".into(),
            success_url: None,
            failure_url: None,
            notification_url: None,
            item_title: "Suscripción Freelancer Premium".into(),
            unit_price: 1000.0,
            currency: "ARS".into(),
        }
    }
}

/// LinkedIn OpenID Connect settings.
#[derive(Debug, Clone)]
pub struct LinkedInConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    /// Frontend page that finishes the become-freelancer form.
    pub form_url: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

impl Default for LinkedInConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            form_url: "http://localhost:5173/hacerse-freelancer".into(),
            authorization_endpoint: "https://www.linkedin.com/oauth/v2/authorization".into(),
            token_endpoint: "https://www.linkedin.com/oauth/v2/accessToken".into(),
            userinfo_endpoint: "https://api.linkedin.com/v2/userinfo".into(),
        }
    }
}
