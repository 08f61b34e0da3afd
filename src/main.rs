use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use storefront_session::config::SessionConfig;
use storefront_session::identity::{Credentials, RouteGuard, SessionOps, SessionStore};
use storefront_session::HttpTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("invalid log filter")?;
    fmt().with_env_filter(filter).init();

    let cfg = SessionConfig::from_env()?;
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "storefront",
        "session probe starting: RUST_LOG='{}', api_url={}, timeout_ms={}",
        rust_log,
        cfg.api_url.as_ref().map(|u| u.as_str()).unwrap_or("<local>"),
        cfg.timeout.as_millis()
    );

    if cfg.is_local() {
        info!(target: "storefront", "local mode: no backend to probe");
        return Ok(());
    }

    let transport = HttpTransport::from_config(&cfg)?;
    let ops = SessionOps::new(transport, SessionStore::global());
    let outcome = ops.initialize(&cfg).await;
    info!(target: "storefront", "startup refresh: {:?}", outcome);

    let account = std::env::var("STOREFRONT_ACCOUNT").unwrap_or_default();
    let password = std::env::var("STOREFRONT_PASSWORD").unwrap_or_default();
    if !outcome.is_valid() && !account.is_empty() {
        if let Err(e) = ops.login(&Credentials::new(account, password)).await {
            warn!(target: "storefront", "login failed: {}", e);
        }
    }

    let state = ops.store().snapshot();
    info!(target: "storefront", "session: {}", serde_json::to_string(&state)?);
    for (name, guard) in [
        ("account", RouteGuard::Authenticated),
        ("admin", RouteGuard::Admin),
        ("seller", RouteGuard::Seller),
        ("cart", RouteGuard::Cart),
    ] {
        let admission = guard.check(&state);
        match admission.redirect() {
            None => info!(target: "storefront", "route {}: allow", name),
            Some(r) => info!(target: "storefront", "route {}: redirect {}", name, cfg.redirect_path(r)),
        }
    }
    Ok(())
}
