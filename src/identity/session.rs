use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::tprintln;

use super::principal::{AccountStatus, Identity, Role};

/// Client-side view of the authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub logged: bool,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn anonymous() -> Self { Self::default() }

    fn from_identity(identity: &Identity) -> Self {
        Self {
            logged: true,
            user_id: identity.id.clone(),
            username: Some(identity.username.clone()),
            role: identity.role,
            status: identity.status,
            loading: false,
            error: None,
        }
    }

    /// `logged == false` implies no identity field is set.
    pub fn is_consistent(&self) -> bool {
        self.logged
            || (self.user_id.is_none() && self.username.is_none() && self.role.is_none() && self.status.is_none())
    }

    /// Identity carried by a logged session, `None` when anonymous.
    pub fn identity(&self) -> Option<Identity> {
        if !self.logged { return None; }
        Some(Identity {
            id: self.user_id.clone(),
            username: self.username.clone().unwrap_or_default(),
            role: self.role,
            status: self.status,
        })
    }

    pub fn has_role(&self, role: Role) -> bool { self.logged && self.role == Some(role) }
}

static GLOBAL: Lazy<SessionStore> = Lazy::new(SessionStore::new);

/// Observable container for the single `SessionState`.
///
/// Cloning is cheap and every clone refers to the same value. Writes are
/// whole-value replacements made only through `set_anonymous`,
/// `apply_identity`, `set_loading` and `set_error`; subscribers are notified
/// after each one.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("state", &*self.tx.borrow()).finish()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::anonymous());
        Self { tx: Arc::new(tx) }
    }

    /// Process-wide store, created anonymous on first use.
    pub fn global() -> SessionStore { GLOBAL.clone() }

    pub fn snapshot(&self) -> SessionState { self.tx.borrow().clone() }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> { self.tx.subscribe() }

    pub fn set_anonymous(&self) {
        self.tx.send_replace(SessionState::anonymous());
        debug!(target: "storefront::session", "session anonymized");
    }

    pub fn apply_identity(&self, identity: &Identity) {
        self.tx.send_replace(SessionState::from_identity(identity));
        tprintln!("session.apply user={} role={:?} status={:?}", identity.username, identity.role, identity.status);
        debug!(target: "storefront::session", "session applied: user={} role={:?}", identity.username, identity.role);
    }

    pub fn set_loading(&self, loading: bool) {
        self.tx.send_modify(|s| s.loading = loading);
    }

    pub fn set_error<S: Into<String>>(&self, message: S) {
        let message = message.into();
        debug!(target: "storefront::session", "session error: {}", message);
        self.tx.send_modify(|s| {
            s.loading = false;
            s.error = Some(message);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seller() -> Identity {
        Identity::new("shop", Role::Seller, AccountStatus::Active).with_id("s-1")
    }

    #[test]
    fn starts_anonymous() {
        let store = SessionStore::new();
        assert_eq!(store.snapshot(), SessionState::anonymous());
        assert!(store.snapshot().is_consistent());
    }

    #[test]
    fn apply_then_anonymize_resets_everything() {
        let store = SessionStore::new();
        store.set_loading(true);
        store.apply_identity(&seller());
        let s = store.snapshot();
        assert!(s.logged);
        assert_eq!(s.user_id.as_deref(), Some("s-1"));
        assert_eq!(s.username.as_deref(), Some("shop"));
        assert_eq!(s.role, Some(Role::Seller));
        assert_eq!(s.status, Some(AccountStatus::Active));
        assert!(!s.loading);

        store.set_error("boom");
        store.set_anonymous();
        assert_eq!(store.snapshot(), SessionState::anonymous());
    }

    #[test]
    fn invariant_holds_across_mixed_sequences() {
        let store = SessionStore::new();
        let ids = [
            seller(),
            Identity::new("a", Role::Admin, AccountStatus::Banned),
            Identity { id: None, username: "n".into(), role: None, status: None },
        ];
        for round in 0..24usize {
            match round % 5 {
                0 | 3 => store.apply_identity(&ids[round % ids.len()]),
                1 => store.set_anonymous(),
                2 => store.set_error(format!("e{}", round)),
                _ => store.set_loading(round % 2 == 0),
            }
            assert!(store.snapshot().is_consistent(), "round {} broke the invariant", round);
        }
    }

    #[test]
    fn set_error_keeps_identity_and_clears_loading() {
        let store = SessionStore::new();
        store.apply_identity(&seller());
        store.set_loading(true);
        store.set_error("refresh failed");
        let s = store.snapshot();
        assert!(s.logged);
        assert_eq!(s.username.as_deref(), Some("shop"));
        assert!(!s.loading);
        assert_eq!(s.error.as_deref(), Some("refresh failed"));
    }

    #[test]
    fn set_loading_touches_only_loading() {
        let store = SessionStore::new();
        store.apply_identity(&seller());
        let before = store.snapshot();
        store.set_loading(true);
        let after = store.snapshot();
        assert!(after.loading);
        assert_eq!(SessionState { loading: false, ..after }, before);
    }

    #[tokio::test]
    async fn subscribers_see_replacements() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();
        store.apply_identity(&seller());
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().logged);
        store.set_anonymous();
        rx.changed().await.unwrap();
        assert!(!rx.borrow().logged);
    }

    #[test]
    fn identity_round_trips_through_state() {
        let store = SessionStore::new();
        assert_eq!(store.snapshot().identity(), None);
        store.apply_identity(&seller());
        assert_eq!(store.snapshot().identity(), Some(seller()));
    }

    #[test]
    fn clones_share_state() {
        let a = SessionStore::new();
        let b = a.clone();
        a.apply_identity(&seller());
        assert!(b.snapshot().logged);
        assert!(b.snapshot().has_role(Role::Seller));
    }
}
