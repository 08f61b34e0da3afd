use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::error::{AuthError, AuthResult};

use super::principal::{Credentials, Identity};
use super::retry::{with_auth_retry, RefreshOutcome, SessionRefresher};
use super::session::SessionStore;

pub const DEFAULT_LOGIN_ERROR: &str = "login failed";
pub const DEFAULT_LOGOUT_ERROR: &str = "logout failed";
pub const DEFAULT_REFRESH_ERROR: &str = "session refresh failed";
pub const MISSING_CREDENTIALS: &str = "account and password are required";

/// Backend auth contract. Credentials are attached by the transport itself
/// (cookie jar); implementations never hand a token back to the caller.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> AuthResult<Identity>;
    async fn logout(&self) -> AuthResult<()>;
    async fn refresh(&self) -> AuthResult<Identity>;
}

/// Login, logout and refresh against a transport, reflected into a store.
pub struct SessionOps<T> {
    transport: T,
    store: SessionStore,
}

impl<T: AuthTransport> SessionOps<T> {
    pub fn new(transport: T, store: SessionStore) -> Self { Self { transport, store } }

    pub fn store(&self) -> &SessionStore { &self.store }

    pub fn transport(&self) -> &T { &self.transport }

    fn begin(&self) {
        self.store.set_anonymous();
        self.store.set_loading(true);
    }

    pub async fn login(&self, credentials: &Credentials) -> AuthResult<Identity> {
        self.begin();
        if !credentials.is_complete() {
            self.store.set_error(MISSING_CREDENTIALS);
            return Err(AuthError::client(400, MISSING_CREDENTIALS));
        }
        match self.transport.login(credentials).await {
            Ok(identity) => {
                self.store.apply_identity(&identity);
                info!(target: "storefront::session", "login ok: user={} role={:?}", identity.username, identity.role);
                Ok(identity)
            }
            Err(e) => {
                // Already anonymous from begin(); only record the failure.
                warn!(target: "storefront::session", "login failed for account={}: {}", credentials.account, e);
                self.store.set_error(e.message_or(DEFAULT_LOGIN_ERROR));
                Err(e)
            }
        }
    }

    /// Best effort: the client ends up anonymous whether or not the server
    /// acknowledged the logout. A failure is still recorded in `error`.
    pub async fn logout(&self) -> AuthResult<()> {
        self.begin();
        match self.transport.logout().await {
            Ok(()) => {
                self.store.set_anonymous();
                info!(target: "storefront::session", "logout ok");
                Ok(())
            }
            Err(e) => {
                warn!(target: "storefront::session", "logout request failed, client session cleared anyway: {}", e);
                self.store.set_error(e.message_or(DEFAULT_LOGOUT_ERROR));
                Err(e)
            }
        }
    }

    /// A server fault leaves the pre-refresh identity in place; any other
    /// failure leaves the store anonymous.
    pub async fn refresh(&self) -> RefreshOutcome {
        let prior = self.store.snapshot().identity();
        self.begin();
        match self.transport.refresh().await {
            Ok(identity) => {
                self.store.apply_identity(&identity);
                info!(target: "storefront::session", "session refreshed: user={}", identity.username);
                RefreshOutcome::Valid
            }
            Err(e) => {
                if e.is_server_fault() {
                    // Session status unknown; do not declare the user logged out.
                    warn!(target: "storefront::session", "refresh hit a server fault: {}", e);
                    if let Some(identity) = prior {
                        self.store.apply_identity(&identity);
                    }
                } else {
                    self.store.set_anonymous();
                    info!(target: "storefront::session", "session invalid: {}", e);
                }
                self.store.set_error(e.message_or(DEFAULT_REFRESH_ERROR));
                RefreshOutcome::Invalid
            }
        }
    }

    /// Startup probe. With no backend configured the store is left alone and
    /// the probe reports `Valid`.
    pub async fn initialize(&self, config: &SessionConfig) -> RefreshOutcome {
        if config.is_local() {
            info!(target: "storefront::session", "no backend configured; skipping session probe");
            return RefreshOutcome::Valid;
        }
        self.refresh().await
    }

    /// Run an authenticated request with one refresh-and-retry on `Unauthorized`.
    pub async fn authorized<R, F, Fut>(&self, make_request: F) -> AuthResult<R>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = AuthResult<R>>,
    {
        with_auth_retry(make_request, self).await
    }
}

#[async_trait]
impl<T: AuthTransport> SessionRefresher for SessionOps<T> {
    async fn refresh(&self) -> RefreshOutcome { SessionOps::<T>::refresh(self).await }
}
