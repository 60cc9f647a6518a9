//! `/api/mercadopago` handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use conectar_core::error::{MarketError, MarketResult};
use reqwest::Url;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::bridge::mercadopago::Preference;
use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::handlers::users::upgrade_to_premium;
use crate::state::AppState;

pub async fn create_preference(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Preference>> {
    let preference = state.payments.create_preference(caller.id).await?;
    info!(user_id = %caller.id, preference_id = %preference.id, "premium checkout started");
    Ok(Json(preference))
}

/// Gateway notification. Both the legacy (`topic`, `id`) and the
/// current (`type`, `data.id`) query shapes are accepted.
#[derive(Debug, Default, PartialEq)]
pub struct WebhookQuery {
    topic: Option<String>,
    kind: Option<String>,
    id: Option<String>,
    data_id: Option<String>,
}

impl WebhookQuery {
    /// Never fails: the first value of a repeated key wins and unknown
    /// keys are ignored.
    fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let Some(raw) = raw.filter(|r| !r.is_empty()) else {
            return query;
        };

        let url = match Url::parse(&format!("http://webhook.local/?{raw}")) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, query = raw, "unparseable webhook query");
                return query;
            }
        };

        for (key, value) in url.query_pairs() {
            let slot = match key.as_ref() {
                "topic" => &mut query.topic,
                "type" => &mut query.kind,
                "id" => &mut query.id,
                "data.id" => &mut query.data_id,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        query
    }

    /// Payment id when this notification is about a payment.
    fn payment_id(&self) -> Option<&str> {
        let topic = self.topic.as_deref().or(self.kind.as_deref());
        if topic != Some("payment") {
            return None;
        }
        self.id
            .as_deref()
            .or(self.data_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

async fn process_notification(state: &AppState, payment_id: &str) -> MarketResult<()> {
    let payment = state.payments.get_payment(payment_id).await?;
    if !payment.is_approved() {
        info!(payment_id, status = %payment.status, "payment not approved yet");
        return Ok(());
    }

    let reference = payment.external_reference.unwrap_or_default();
    let user_id = Uuid::parse_str(&reference).map_err(|_| {
        MarketError::Gateway(format!("payment {payment_id} has bad external_reference {reference:?}"))
    })?;

    upgrade_to_premium(state, user_id).await?;
    info!(payment_id, user_id = %user_id, "payment approved, premium activated");
    Ok(())
}

/// Always acknowledges so the gateway stops retrying; failures are logged.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> impl IntoResponse {
    let query = WebhookQuery::parse(raw.as_deref());
    if let Some(payment_id) = query.payment_id() {
        if let Err(e) = process_notification(&state, payment_id).await {
            error!(payment_id, error = %e, "webhook processing failed");
        }
    }
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_id_from_either_query_shape() {
        let legacy = WebhookQuery {
            topic: Some("payment".into()),
            id: Some("123".into()),
            ..Default::default()
        };
        assert_eq!(legacy.payment_id(), Some("123"));

        let current = WebhookQuery {
            kind: Some("payment".into()),
            data_id: Some("456".into()),
            ..Default::default()
        };
        assert_eq!(current.payment_id(), Some("456"));
    }

    #[test]
    fn parses_both_query_shapes() {
        let legacy = WebhookQuery::parse(Some("topic=payment&id=123"));
        assert_eq!(legacy.payment_id(), Some("123"));

        let current = WebhookQuery::parse(Some("type=payment&data.id=456&extra=1"));
        assert_eq!(current.payment_id(), Some("456"));
    }

    #[test]
    fn repeated_keys_keep_the_first_value() {
        let q = WebhookQuery::parse(Some("type=payment&data.id=1&data.id=2"));
        assert_eq!(q.payment_id(), Some("1"));

        let q = WebhookQuery::parse(Some("topic=payment&id=7&id=8&topic=merchant_order"));
        assert_eq!(q.payment_id(), Some("7"));
    }

    #[test]
    fn garbage_queries_parse_to_nothing() {
        assert_eq!(WebhookQuery::parse(None), WebhookQuery::default());
        assert_eq!(WebhookQuery::parse(Some("")), WebhookQuery::default());
        assert_eq!(WebhookQuery::parse(Some("&&==&")).payment_id(), None);
        assert_eq!(WebhookQuery::parse(Some("id=%FF")).payment_id(), None);
    }

    #[test]
    fn other_topics_are_ignored() {
        let q = WebhookQuery {
            topic: Some("merchant_order".into()),
            id: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(q.payment_id(), None);
        assert_eq!(WebhookQuery::default().payment_id(), None);
    }
}
