//! Session authentication core: the process-wide identity store, the
//! operations that drive it, the refresh-and-retry wrapper and route guards.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;
mod provider;
mod retry;
mod authorizer;

pub use principal::{AccountStatus, Credentials, Identity, Role};
pub use session::{SessionState, SessionStore};
pub use provider::{
    AuthTransport, SessionOps, DEFAULT_LOGIN_ERROR, DEFAULT_LOGOUT_ERROR, DEFAULT_REFRESH_ERROR, MISSING_CREDENTIALS,
};
pub use retry::{with_auth_retry, RefreshOutcome, RetryPhase, SessionRefresher};
pub use authorizer::{
    require_authenticated, require_roles, Admission, Redirect, RouteGuard, ADMIN_ROLES, BUYER_ROLES, SELLER_ROLES,
};
