//! LinkedIn OpenID Connect: authorization URL, code exchange and
//! profile lookup.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use conectar_core::error::{MarketError, MarketResult};
use reqwest::Url;
use serde::Deserialize;

use crate::config::LinkedInConfig;

pub const STATE_COOKIE: &str = "linkedin_auth_state";
pub const USER_COOKIE: &str = "linkedin_auth_user";
/// Lifetime of both handshake cookies.
pub const COOKIE_MAX_AGE_SECS: u64 = 300;
pub const SCOPES: &str = "openid profile email";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OIDC userinfo claims we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    pub profile: Option<String>,
}

impl UserInfo {
    pub fn profile_url(&self) -> String {
        match self.profile.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("https://www.linkedin.com/in/{}", self.sub),
        }
    }
}

/// 16 random bytes, hex encoded.
pub fn new_state() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

/// Characters allowed in a cookie value without quoting.
fn is_cookie_octet(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, '"' | ',' | ';' | '\\')
}

/// `Set-Cookie` value for a handshake cookie. `None` when `value` would
/// need quoting or could smuggle extra attributes.
pub fn handshake_cookie(name: &str, value: &str) -> Option<String> {
    if value.is_empty() || !value.chars().all(is_cookie_octet) {
        return None;
    }
    Some(format!(
        "{name}={value}; HttpOnly; Max-Age={COOKIE_MAX_AGE_SECS}; Path=/; SameSite=Lax"
    ))
}

/// `Set-Cookie` value that removes a handshake cookie.
pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; HttpOnly; Max-Age=0; Path=/; SameSite=Lax")
}

/// First non-empty value of cookie `name` across every `Cookie` header;
/// HTTP/2 clients send one header per cookie. Quotes are stripped.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .filter(|(k, _)| k.trim() == name)
        .map(|(_, v)| {
            let v = v.trim();
            v.strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(v)
        })
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Clone)]
pub struct LinkedInClient {
    http: reqwest::Client,
    config: LinkedInConfig,
}

impl LinkedInClient {
    pub fn new(http: reqwest::Client, config: LinkedInConfig) -> Self {
        Self { http, config }
    }

    fn credentials(&self) -> MarketResult<(&str, &str)> {
        match (
            self.config.client_id.as_deref(),
            self.config.redirect_uri.as_deref(),
        ) {
            (Some(id), Some(redirect)) => Ok((id, redirect)),
            _ => Err(MarketError::Internal(
                "LinkedIn client id or redirect uri not configured".into(),
            )),
        }
    }

    pub fn authorization_url(&self, state: &str) -> MarketResult<String> {
        let (client_id, redirect_uri) = self.credentials()?;
        let url = Url::parse_with_params(
            &self.config.authorization_endpoint,
            &[
                ("response_type", "code"),
                ("client_id", client_id),
                ("redirect_uri", redirect_uri),
                ("state", state),
                ("scope", SCOPES),
            ],
        )
        .map_err(|e| MarketError::Internal(format!("authorization endpoint: {e}")))?;
        Ok(url.into())
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> MarketResult<String> {
        let (client_id, redirect_uri) = self.credentials()?;
        let client_secret = self.config.client_secret.as_deref().unwrap_or_default();

        let response = self
            .http
            .post(&self.config.token_endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| MarketError::Gateway(format!("linkedin token exchange: {e}")))?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| MarketError::Gateway(format!("decode linkedin token: {e}")))?;
        Ok(token.access_token)
    }

    pub async fn user_info(&self, access_token: &str) -> MarketResult<UserInfo> {
        self.http
            .get(&self.config.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| MarketError::Gateway(format!("linkedin userinfo: {e}")))?
            .json()
            .await
            .map_err(|e| MarketError::Gateway(format!("decode linkedin userinfo: {e}")))
    }

    /// Scheme, host and port of the freelancer form URL.
    pub fn frontend_origin(&self) -> MarketResult<String> {
        let url = Url::parse(&self.config.form_url)
            .map_err(|e| MarketError::Internal(format!("freelancer form url: {e}")))?;
        Ok(url.origin().ascii_serialization())
    }

    /// Where to send a user whose profile still needs completing.
    pub fn form_redirect(&self, profile_url: &str) -> MarketResult<String> {
        let mut url = Url::parse(&self.config.form_url)
            .map_err(|e| MarketError::Internal(format!("freelancer form url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("status", "success")
            .append_pair("linkedin", profile_url);
        Ok(url.into())
    }
}
