//! MercadoPago checkout: preference creation and payment lookup.

use conectar_core::error::{MarketError, MarketResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::PaymentConfig;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub currency_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BackUrls {
    pub success: Option<String>,
    pub failure: Option<String>,
    pub pending: Option<String>,
}

/// Body of `POST /checkout/preferences`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    pub back_urls: BackUrls,
    pub auto_return: String,
    /// Id of the user being upgraded; echoed back on the payment.
    pub external_reference: String,
    pub statement_descriptor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preference {
    pub id: String,
    pub init_point: Option<String>,
    pub sandbox_init_point: Option<String>,
}

/// The subset of a payment the webhook needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub status: String,
    pub external_reference: Option<String>,
}

impl Payment {
    pub fn is_approved(&self) -> bool {
        self.status == "approved"
    }
}

#[derive(Clone)]
pub struct MercadoPagoClient {
    http: reqwest::Client,
    config: PaymentConfig,
}

impl MercadoPagoClient {
    pub fn new(http: reqwest::Client, config: PaymentConfig) -> Self {
        if config.access_token.is_none() {
            warn!("MercadoPago access token not configured, checkout disabled");
        }
        Self { http, config }
    }

    fn access_token(&self) -> MarketResult<&str> {
        self.config
            .access_token
            .as_deref()
            .ok_or_else(|| MarketError::Gateway("MercadoPago access token not configured".into()))
    }

    /// Premium subscription preference for `user_id`.
    pub fn build_preference(&self, user_id: Uuid) -> PreferenceRequest {
        let notification_url = match self.config.notification_url.as_deref() {
            Some(url) if !url.contains("localhost") => Some(url.to_string()),
            Some(_) => {
                debug!("skipping localhost notification_url");
                None
            }
            None => None,
        };

        PreferenceRequest {
            items: vec![PreferenceItem {
                id: "freelancer-premium".into(),
                title: self.config.item_title.clone(),
                quantity: 1,
                unit_price: self.config.unit_price,
                currency_id: self.config.currency.clone(),
            }],
            back_urls: BackUrls {
                success: self.config.success_url.clone(),
                failure: self.config.failure_url.clone(),
                pending: self.config.failure_url.clone(),
            },
            auto_return: "approved".into(),
            external_reference: user_id.to_string(),
            statement_descriptor: "CONECTAR PREMIUM".into(),
            notification_url,
        }
    }

    pub async fn create_preference(&self, user_id: Uuid) -> MarketResult<Preference> {
        let token = self.access_token()?;
        let body = self.build_preference(user_id);

        let response = self
            .http
            .post(format!("{}/checkout/preferences", self.config.api_base))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| MarketError::Gateway(format!("create preference: {e}")))?;

        response
            .json::<Preference>()
            .await
            .map_err(|e| MarketError::Gateway(format!("decode preference: {e}")))
    }

    pub async fn get_payment(&self, payment_id: &str) -> MarketResult<Payment> {
        let token = self.access_token()?;

        let response = self
            .http
            .get(format!("{}/v1/payments/{payment_id}", self.config.api_base))
            .bearer_auth(token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| MarketError::Gateway(format!("get payment {payment_id}: {e}")))?;

        response
            .json::<Payment>()
            .await
            .map_err(|e| MarketError::Gateway(format!("decode payment: {e}")))
    }
}
