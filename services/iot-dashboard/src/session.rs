//! Session state derived from the persisted bearer token
//!
//! The browser keeps the token in a cookie (`token` by default). A
//! [`SessionContext`] is rebuilt from that cookie on every request and handed
//! to guards and pages; nothing about the session is held server-side.
//! The token's payload is decoded for identity and role but never verified
//! here, the backend remains the authority on every request.

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::config::SessionConfig;
use crate::model::{Credentials, Role, User};
use crate::DashboardError;

/// Well-known storage key of the session token
pub const TOKEN_KEY: &str = "token";

/// Current user as seen by guards and pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub is_authenticated: bool,
    pub role: Role,
    pub id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for a present token; undecodable tokens give a plain user
    pub fn from_token(token: &str) -> Self {
        let claims = decode_claims(token).unwrap_or_default();
        Self {
            is_authenticated: true,
            role: claims.role().unwrap_or_default(),
            id: claims.id(),
            username: claims.username(),
            email: claims.email(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated && self.role == Role::Admin
    }

    /// Fill identity fields the token did not carry from a user record
    fn enrich(&mut self, user: &User) {
        if self.id.is_none() {
            self.id = Some(user.id.clone());
        }
        if self.username.is_none() {
            self.username = Some(user.username.clone());
        }
        if self.email.is_none() && !user.email.is_empty() {
            self.email = Some(user.email.clone());
        }
    }

    /// Initial shown in the avatar circle
    pub fn initial(&self) -> char {
        self.username
            .as_deref()
            .and_then(|name| name.chars().next())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }
}

/// Token payload fields the dashboard understands
#[derive(Debug, Default, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<serde_json::Value>,
    #[serde(default, rename = "userId")]
    user_id: Option<serde_json::Value>,
    #[serde(default)]
    sub: Option<serde_json::Value>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    user: Option<Box<TokenClaims>>,
}

impl TokenClaims {
    fn id(&self) -> Option<String> {
        [&self.id, &self.mongo_id, &self.user_id, &self.sub]
            .into_iter()
            .flatten()
            .find_map(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .or_else(|| self.user.as_ref().and_then(|u| u.id()))
    }

    fn username(&self) -> Option<String> {
        self.username
            .clone()
            .or_else(|| self.user.as_ref().and_then(|u| u.username()))
    }

    fn email(&self) -> Option<String> {
        self.email
            .clone()
            .or_else(|| self.user.as_ref().and_then(|u| u.email()))
    }

    fn role(&self) -> Option<Role> {
        self.role.or_else(|| self.user.as_ref().and_then(|u| u.role()))
    }
}

/// Read the payload without checking the signature or expiry
fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_aud = false;

    match jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!("Token payload not readable: {}", e);
            None
        }
    }
}

/// Per-request session: the persisted token and the session derived from it
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    token: Option<String>,
    session: Session,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_token(token: Option<String>) -> Self {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => Self {
                session: Session::from_token(&token),
                token: Some(token),
            },
            None => Self::anonymous(),
        }
    }

    pub fn from_cookies(jar: &CookieJar, cookie_name: &str) -> Self {
        Self::from_token(jar.get(cookie_name).map(|c| c.value().to_string()))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Backend client acting on behalf of this session
    pub fn api(&self, api: &ApiClient) -> ApiClient {
        api.with_token(self.token())
    }

    /// Authenticate against the backend; the caller persists the result
    pub async fn login(api: &ApiClient, credentials: &Credentials) -> crate::Result<Self> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(DashboardError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let response = api.auth().login(credentials).await?;
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or(DashboardError::InvalidCredentials)?;

        let token_role = decode_claims(&token).and_then(|claims| claims.role());
        let mut context = Self::from_token(Some(token));
        if let Some(user) = &response.user {
            context.session.enrich(user);
            if token_role.is_none() {
                context.session.role = user.role;
            }
        }
        tracing::info!(
            "Signed in {} as {}",
            context.session.email.as_deref().unwrap_or(&credentials.email),
            context.session.role
        );
        Ok(context)
    }

    /// Write the token to the browser's cookie jar
    pub fn persist(&self, jar: CookieJar, config: &SessionConfig) -> CookieJar {
        match &self.token {
            Some(token) => jar.add(
                Cookie::build((config.cookie_name.clone(), token.clone()))
                    .path("/")
                    .http_only(true)
                    .secure(config.secure_cookie)
                    .same_site(SameSite::Lax),
            ),
            None => jar,
        }
    }

    /// Tear the session down, clearing the persisted token
    pub fn logout(self, jar: CookieJar, config: &SessionConfig) -> (Self, CookieJar) {
        tracing::info!(
            "Signed out {}",
            self.session.email.as_deref().unwrap_or("anonymous session")
        );
        let jar = jar.remove(Cookie::build((config.cookie_name.clone(), "")).path("/"));
        (Self::anonymous(), jar)
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    SessionConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = SessionConfig::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self::from_cookies(&jar, &config.cookie_name))
    }
}

/// Sign the given claims as an HS256 JWT
pub fn encode_token(claims: &serde_json::Value, secret: &[u8]) -> crate::Result<String> {
    Ok(jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret),
    )?)
}
