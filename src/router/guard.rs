//! Route authorization guard.
//!
//! Evaluated once per navigation attempt. Rules, first match wins:
//!
//! 1. Authentication: a route requiring auth, visited without a live login,
//!    sends the visitor to the auth entry route. Guests pass only where the
//!    route opts in with `allow_guest`.
//! 2. Authorization: a route with a role allow-set sends an authenticated
//!    user of another role to their role-home.
//! 3. Guest-only routes send authenticated users to their role-home.
//! 4. Otherwise proceed.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::location::{AuthMode, Location, auth_redirect};
use super::routes::{RouteDecl, role_home, same_path};
use crate::state::auth::AuthFacts;

/// Outcome of one guard evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    /// Go to the auth entry route; the location carries `redirect` and `mode`.
    RedirectToAuth(Location),
    /// Go to the session role's home route.
    RedirectToRoleHome(Location),
}

impl GuardDecision {
    /// Where the guard wants to send the visitor instead, if anywhere.
    #[must_use]
    pub fn redirect(&self) -> Option<&Location> {
        match self {
            Self::Proceed => None,
            Self::RedirectToAuth(location) | Self::RedirectToRoleHome(location) => Some(location),
        }
    }
}

#[must_use]
pub fn evaluate(route: &RouteDecl, target: &Location, facts: &AuthFacts, auth_entry: &str) -> GuardDecision {
    if route.requires_auth && !facts.authenticated && !same_path(&target.path, auth_entry) {
        if facts.guest && route.allow_guest {
            return GuardDecision::Proceed;
        }
        let location = auth_redirect(auth_entry, target, AuthMode::for_target(target));
        tracing::debug!(route = route.name, to = %location, "auth required");
        return GuardDecision::RedirectToAuth(location);
    }

    if facts.authenticated && !route.admits(facts.role.as_ref()) {
        let home = role_home(facts.role.as_ref());
        tracing::debug!(route = route.name, role = ?facts.role, to = home, "role not allowed");
        return GuardDecision::RedirectToRoleHome(Location::new(home));
    }

    if route.guest_only && facts.authenticated {
        let home = role_home(facts.role.as_ref());
        // An unknown role's home is the guest-only entry route itself.
        if !same_path(home, &target.path) {
            tracing::debug!(route = route.name, to = home, "guest-only route");
            return GuardDecision::RedirectToRoleHome(Location::new(home));
        }
    }

    GuardDecision::Proceed
}
