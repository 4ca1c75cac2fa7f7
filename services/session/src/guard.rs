//! Route gating for authenticated and public-only routes

use std::sync::Arc;

use common::ClientConfig;

use crate::store::SessionStore;

/// Kind of route being entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only reachable with a valid credential
    Protected,
    /// Only reachable without one (login, signup)
    PublicOnly,
}

/// Outcome of a route check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectTo(String),
}

/// Redirect targets used by the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePaths {
    pub login: String,
    pub home: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            home: "/".to_string(),
        }
    }
}

impl RoutePaths {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            login: config.login_path.clone(),
            home: config.home_path.clone(),
        }
    }
}

/// Something that can move the user to another route
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Decide whether a route may be entered
pub fn guard_route(access: Access, authenticated: bool, paths: &RoutePaths) -> Decision {
    match (access, authenticated) {
        (Access::Protected, true) | (Access::PublicOnly, false) => Decision::Allow,
        (Access::Protected, false) => Decision::RedirectTo(paths.login.clone()),
        (Access::PublicOnly, true) => Decision::RedirectTo(paths.home.clone()),
    }
}

/// Route guard bound to a session store
#[derive(Clone)]
pub struct RouteGuard {
    store: Arc<SessionStore>,
    paths: RoutePaths,
}

impl RouteGuard {
    pub fn new(store: Arc<SessionStore>, paths: RoutePaths) -> Self {
        Self { store, paths }
    }

    /// Check the credential as it is right now and decide
    pub fn authorize(&self, access: Access) -> Decision {
        guard_route(access, self.store.is_authenticated(), &self.paths)
    }

    /// Log out and send the user to the login route
    pub fn logout(&self, navigator: &dyn Navigator) {
        self.store.logout(navigator, &self.paths.login);
    }

    pub fn paths(&self) -> &RoutePaths {
        &self.paths
    }
}
