//! One-shot refresh-and-retry for authenticated requests.
//!
//! A wrapped call walks `FirstAttempt -> Refreshing -> SecondAttempt` at most
//! once. Only an `Unauthorized` failure on the first attempt moves it into
//! `Refreshing`; a second `Unauthorized` is terminal.

use std::future::Future;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Valid,
    Invalid,
}

impl RefreshOutcome {
    pub fn is_valid(self) -> bool { matches!(self, RefreshOutcome::Valid) }
}

/// Anything able to re-establish the session before a retry.
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    async fn refresh(&self) -> RefreshOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    FirstAttempt,
    Refreshing,
    SecondAttempt,
    Success,
    Failed,
}

fn enter(phase: RetryPhase) {
    debug!(target: "storefront::retry", "phase={:?}", phase);
}

/// Run `make_request`; on `Unauthorized`, refresh once and retry once.
///
/// Any other failure, or a refresh that reports `Invalid`, returns the
/// original error. The outcome of the second attempt is returned as-is.
pub async fn with_auth_retry<T, F, Fut, R>(mut make_request: F, refresher: &R) -> Result<T, AuthError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AuthError>>,
    R: SessionRefresher + ?Sized,
{
    enter(RetryPhase::FirstAttempt);
    let first = match make_request().await {
        Ok(v) => {
            enter(RetryPhase::Success);
            return Ok(v);
        }
        Err(e) => e,
    };
    if !first.is_unauthorized() {
        enter(RetryPhase::Failed);
        return Err(first);
    }

    enter(RetryPhase::Refreshing);
    if !refresher.refresh().await.is_valid() {
        warn!(target: "storefront::retry", "refresh rejected; returning original failure: {}", first);
        enter(RetryPhase::Failed);
        return Err(first);
    }

    enter(RetryPhase::SecondAttempt);
    match make_request().await {
        Ok(v) => {
            enter(RetryPhase::Success);
            Ok(v)
        }
        Err(e) => {
            warn!(target: "storefront::retry", "retry after refresh failed: {}", e);
            enter(RetryPhase::Failed);
            Err(e)
        }
    }
}
