//! Route guards keyed on the session's role
//!
//! [`allows`] is the single capability check; the navigation shell, pages
//! and both guard extractors call it rather than inspecting the role.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::Redirect;

use crate::config::SessionConfig;
use crate::model::Role;
use crate::session::{Session, SessionContext};

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";

/// What a route or action requires of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Authenticated,
    Admin,
}

/// Outcome of evaluating a guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(&'static str),
}

pub fn allows(session: &Session, capability: Capability) -> bool {
    match capability {
        Capability::Authenticated => session.is_authenticated,
        Capability::Admin => session.is_authenticated && session.role == Role::Admin,
    }
}

/// Unauthenticated sessions go to login, under-privileged ones go home
pub fn check(session: &Session, capability: Capability) -> Access {
    if allows(session, capability) {
        Access::Granted
    } else if !session.is_authenticated {
        Access::Redirect(LOGIN_ROUTE)
    } else {
        Access::Redirect(HOME_ROUTE)
    }
}

fn enforce(context: SessionContext, capability: Capability) -> Result<SessionContext, Redirect> {
    match check(context.session(), capability) {
        Access::Granted => Ok(context),
        Access::Redirect(to) => {
            tracing::debug!("{:?} required, redirecting to {}", capability, to);
            Err(Redirect::to(to))
        }
    }
}

async fn session_from_parts<S>(parts: &mut Parts, state: &S) -> SessionContext
where
    SessionConfig: FromRef<S>,
    S: Send + Sync,
{
    match SessionContext::from_request_parts(parts, state).await {
        Ok(context) => context,
        Err(never) => match never {},
    }
}

/// Extractor admitting any authenticated session
#[derive(Debug, Clone)]
pub struct AuthGuard(pub SessionContext);

impl<S> FromRequestParts<S> for AuthGuard
where
    SessionConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = session_from_parts(parts, state).await;
        enforce(context, Capability::Authenticated).map(AuthGuard)
    }
}

/// Extractor admitting only admin sessions
#[derive(Debug, Clone)]
pub struct AdminGuard(pub SessionContext);

impl<S> FromRequestParts<S> for AdminGuard
where
    SessionConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = session_from_parts(parts, state).await;
        enforce(context, Capability::Admin).map(AdminGuard)
    }
}
