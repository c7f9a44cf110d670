//! Navigation: route table, authorization guard, and the navigator seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`Router::navigate`] is the single entry point for moving between views.
//! It derives the session's authorization facts once, runs the guard against
//! the resolved route, follows redirects, and commits the final location
//! through the injected [`Navigator`].


pub mod guard;
pub mod location;
pub mod navigator;
pub mod routes;

use std::sync::Arc;

pub use guard::GuardDecision;
pub use location::{AuthMode, Location};
pub use navigator::{MemoryNavigator, Navigator};
pub use routes::{RouteDecl, RouteTable};

use crate::state::auth::AuthFacts;
use crate::state::session::SessionHandle;

/// Upper bound on guard-issued redirects followed for one navigation.
const MAX_REDIRECTS: usize = 5;

/// Result of a navigation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    /// Guard verdict for the requested target's route.
    pub decision: GuardDecision,
    /// Where the navigation finally landed.
    pub location: Location,
}

pub struct Router {
    table: RouteTable,
    navigator: Arc<dyn Navigator>,
}

impl Router {
    pub fn new(table: RouteTable, navigator: Arc<dyn Navigator>) -> Self {
        Self { table, navigator }
    }

    /// Decide where a navigation to `target` ends up, without committing it.
    #[must_use]
    pub fn resolve(&self, target: &Location, facts: &AuthFacts) -> Navigation {
        let mut current = target.clone();
        let mut first = None;

        for _ in 0..=MAX_REDIRECTS {
            let Some(route) = self.table.resolve(&current.path) else {
                if current.path == self.table.fallback() {
                    break;
                }
                tracing::debug!(path = %current.path, "no route; using fallback");
                current = Location::new(self.table.fallback());
                continue;
            };

            let decision = guard::evaluate(route, &current, facts, self.table.auth_entry());
            let next = decision.redirect().cloned();
            first.get_or_insert(decision);

            match next {
                Some(next) if next.path != current.path => current = next,
                _ => break,
            }
        }

        Navigation { decision: first.unwrap_or(GuardDecision::Proceed), location: current }
    }

    /// Navigate to `target` (path + query) under the session's current facts.
    pub fn navigate(&self, session: &SessionHandle, target: &str) -> Navigation {
        let facts = session.lock().facts();
        let navigation = self.resolve(&Location::parse(target), &facts);
        self.navigator.force_navigate(&navigation.location.full_path());
        navigation
    }
}
