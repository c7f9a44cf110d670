//! Declarative route table for the marketplace client.
//!
//! DESIGN
//! ======
//! Each navigable path carries its access requirements. Patterns are matched
//! segment by segment; `:name` segments match any single non-empty segment.
//! Paths with no declaration fall back to the home route.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use crate::net::types::Role;

pub const HOME_PATH: &str = "/";
/// Login/registration entry route.
pub const AUTH_ENTRY_PATH: &str = "/login";
pub const ADMIN_HOME_PATH: &str = "/admin/overview";
pub const SUPPLIER_HOME_PATH: &str = "/supplier/workbench";
pub const CONSUMER_HOME_PATH: &str = "/consumer/dashboard";

/// Access requirements for one navigable path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDecl {
    pub name: &'static str,
    pub path: &'static str,
    /// Defaults to `true`.
    pub requires_auth: bool,
    /// Guests (after an explicit `enter_guest_mode`) may pass the auth check.
    pub allow_guest: bool,
    /// Only for visitors without a login (e.g. the login page itself).
    pub guest_only: bool,
    /// Allowed roles; `None` admits any authenticated role.
    pub roles: Option<Vec<Role>>,
}

impl RouteDecl {
    #[must_use]
    pub fn new(name: &'static str, path: &'static str) -> Self {
        Self { name, path, requires_auth: true, allow_guest: false, guest_only: false, roles: None }
    }

    #[must_use]
    pub fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    #[must_use]
    pub fn allow_guest(mut self) -> Self {
        self.allow_guest = true;
        self
    }

    #[must_use]
    pub fn guest_only(mut self) -> Self {
        self.guest_only = true;
        self
    }

    #[must_use]
    pub fn for_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = Some(roles.into_iter().collect());
        self
    }

    /// Whether `path` (no query) matches this route's pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let mut pattern = segments(self.path);
        let mut actual = segments(path);
        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return true,
                (Some(p), Some(a)) if p.starts_with(':') || p == a => {}
                _ => return false,
            }
        }
    }

    /// Whether an authenticated `role` satisfies the allow-set.
    #[must_use]
    pub fn admits(&self, role: Option<&Role>) -> bool {
        match (&self.roles, role) {
            (None, _) => true,
            (Some(allowed), Some(role)) => allowed.contains(role),
            (Some(_), None) => false,
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Whether two concrete paths name the same location, ignoring empty
/// segments (`/login/` and `//login` are `/login`).
#[must_use]
pub fn same_path(a: &str, b: &str) -> bool {
    segments(a).eq(segments(b))
}

/// Canonical landing route for an authenticated role.
#[must_use]
pub fn role_home(role: Option<&Role>) -> &'static str {
    match role {
        Some(Role::Admin) => ADMIN_HOME_PATH,
        Some(Role::Supplier) => SUPPLIER_HOME_PATH,
        Some(Role::Consumer) => CONSUMER_HOME_PATH,
        Some(Role::Other(_)) | None => AUTH_ENTRY_PATH,
    }
}

/// Pick where to land after a successful login.
///
/// Preference: the `redirect` hint carried by the login page, then the
/// server's `redirectUrl`, then the role-home. Hints must be same-origin
/// absolute paths and must not point back at the auth entry route.
#[must_use]
pub fn post_login_landing(redirect_hint: Option<&str>, server_redirect: Option<&str>, role: Option<&Role>) -> String {
    [redirect_hint, server_redirect]
        .into_iter()
        .flatten()
        .find(|hint| is_local_path(hint) && !targets_auth_entry(hint))
        .map_or_else(|| role_home(role).to_owned(), str::to_owned)
}

fn is_local_path(hint: &str) -> bool {
    hint.starts_with('/') && !hint.starts_with("//")
}

fn targets_auth_entry(hint: &str) -> bool {
    let path = hint.split(['?', '#']).next().unwrap_or(hint);
    same_path(path, AUTH_ENTRY_PATH)
}

/// Ordered set of route declarations plus the fallback for unknown paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteDecl>,
    auth_entry: &'static str,
    fallback: &'static str,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<RouteDecl>, auth_entry: &'static str, fallback: &'static str) -> Self {
        Self { routes, auth_entry, fallback }
    }

    /// The marketplace's routes.
    #[must_use]
    pub fn marketplace() -> Self {
        let routes = vec![
            RouteDecl::new("home", HOME_PATH).public(),
            RouteDecl::new("about", "/about").public(),
            RouteDecl::new("products", "/products").public(),
            RouteDecl::new("product-detail", "/products/:id").public(),
            RouteDecl::new("login", AUTH_ENTRY_PATH).public().guest_only(),
            RouteDecl::new("cart", "/cart").allow_guest().for_roles([Role::Consumer]),
            RouteDecl::new("checkout", "/checkout").for_roles([Role::Consumer]),
            RouteDecl::new("orders", "/orders").for_roles([Role::Consumer]),
            RouteDecl::new("consumer-dashboard", CONSUMER_HOME_PATH).for_roles([Role::Consumer]),
            RouteDecl::new("supplier-workbench", SUPPLIER_HOME_PATH).for_roles([Role::Supplier]),
            RouteDecl::new("admin-overview", ADMIN_HOME_PATH).for_roles([Role::Admin]),
        ];
        Self::new(routes, AUTH_ENTRY_PATH, HOME_PATH)
    }

    /// First declaration matching `path`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteDecl> {
        self.routes.iter().find(|route| route.matches(path))
    }

    #[must_use]
    pub fn auth_entry(&self) -> &'static str {
        self.auth_entry
    }

    /// Destination for paths with no declaration.
    #[must_use]
    pub fn fallback(&self) -> &'static str {
        self.fallback
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDecl> {
        self.routes.iter()
    }
}
