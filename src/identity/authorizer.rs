//! Route admission. Every check is a pure function of a `SessionState`
//! snapshot; nothing here mutates the store or touches the network.

use serde::Serialize;

use super::principal::Role;
use super::session::{SessionState, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Redirect {
    Login,
    Home,
}

impl Redirect {
    pub fn path(&self) -> &'static str {
        match self {
            Redirect::Login => "/login",
            Redirect::Home => "/home",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Admission {
    Allow,
    Redirect(Redirect),
}

impl Admission {
    pub fn is_allowed(&self) -> bool { matches!(self, Admission::Allow) }

    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            Admission::Allow => None,
            Admission::Redirect(r) => Some(*r),
        }
    }
}

/// Base guard: any logged session.
pub fn require_authenticated(state: &SessionState) -> Admission {
    if state.logged { Admission::Allow } else { Admission::Redirect(Redirect::Login) }
}

/// Logged session whose role is in `allowed`. A logged session without a
/// role is sent home rather than treated as an error.
pub fn require_roles(state: &SessionState, allowed: &[Role]) -> Admission {
    if !state.logged {
        return Admission::Redirect(Redirect::Login);
    }
    let Some(role) = state.role else { return Admission::Redirect(Redirect::Home); };
    if allowed.contains(&role) { Admission::Allow } else { Admission::Redirect(Redirect::Home) }
}

pub const ADMIN_ROLES: &[Role] = &[Role::Admin];
pub const SELLER_ROLES: &[Role] = &[Role::Seller, Role::Business, Role::Admin];
pub const BUYER_ROLES: &[Role] = &[Role::User, Role::Seller];

/// Named admission policies used by the storefront routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteGuard {
    Authenticated,
    Admin,
    Seller,
    Buyer,
    /// Buyers only; every rejection goes home, including anonymous visitors.
    Cart,
    Roles(Vec<Role>),
}

impl RouteGuard {
    pub fn check(&self, state: &SessionState) -> Admission {
        match self {
            RouteGuard::Authenticated => require_authenticated(state),
            RouteGuard::Admin => require_roles(state, ADMIN_ROLES),
            RouteGuard::Seller => require_roles(state, SELLER_ROLES),
            RouteGuard::Buyer => require_roles(state, BUYER_ROLES),
            RouteGuard::Cart => match require_roles(state, BUYER_ROLES) {
                Admission::Allow => Admission::Allow,
                Admission::Redirect(_) => Admission::Redirect(Redirect::Home),
            },
            RouteGuard::Roles(allowed) => require_roles(state, allowed),
        }
    }

    /// Check against whatever the store holds right now. An operation still in
    /// flight is not waited for.
    pub fn admit(&self, store: &SessionStore) -> Admission { self.check(&store.snapshot()) }
}
