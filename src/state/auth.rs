//! Authorization facts derived from the session record.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the route guard before every navigation and by the HTTP transport
//! before every request. Nothing here is cached: expiry can elapse mid-session
//! without any clear event, so callers derive again on each check.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use super::session::SessionRecord;
use crate::net::types::Role;

/// True iff token, user, and expiry are all present and `now_ms` is before
/// the expiry.
#[must_use]
pub fn is_authenticated(record: &SessionRecord, now_ms: i64) -> bool {
    match (&record.token, &record.user, record.expires_at) {
        (Some(token), Some(_), Some(expires_at)) => !token.is_empty() && now_ms < expires_at,
        _ => false,
    }
}

/// The bearer token, but only while the session is still valid.
#[must_use]
pub fn effective_token(record: &SessionRecord, now_ms: i64) -> Option<&str> {
    if is_authenticated(record, now_ms) {
        record.token.as_deref()
    } else {
        None
    }
}

/// Guest mode counts only when there is no real authentication.
#[must_use]
pub fn is_guest_session(record: &SessionRecord, now_ms: i64) -> bool {
    record.guest && !is_authenticated(record, now_ms)
}

/// Whether the stored user carries `role`. False when no user is stored.
#[must_use]
pub fn has_role(record: &SessionRecord, role: &Role) -> bool {
    record.user.as_ref().is_some_and(|user| user.role() == role)
}

/// Point-in-time snapshot of the facts the route guard consumes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthFacts {
    pub authenticated: bool,
    pub guest: bool,
    /// Role of the authenticated user; `None` when not authenticated.
    pub role: Option<Role>,
}

impl AuthFacts {
    #[must_use]
    pub fn derive(record: &SessionRecord, now_ms: i64) -> Self {
        let authenticated = is_authenticated(record, now_ms);
        let role = if authenticated { record.user.as_ref().map(|user| user.role().clone()) } else { None };
        Self { authenticated, guest: record.guest && !authenticated, role }
    }

    /// No login and no guest mode.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A guest browsing without an account.
    #[must_use]
    pub fn guest() -> Self {
        Self { authenticated: false, guest: true, role: None }
    }

    /// A live login with the given role.
    #[must_use]
    pub fn signed_in(role: Role) -> Self {
        Self { authenticated: true, guest: false, role: Some(role) }
    }
}
