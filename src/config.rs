//! Environment-driven settings for the session core.
//!
//! - `STOREFRONT_API_URL`: backend base URL. Unset or empty runs in local mode
//!   (no startup session probe).
//! - `STOREFRONT_HTTP_TIMEOUT_MS`: per-request transport timeout (default 10000).
//! - `STOREFRONT_LOGIN_PATH` / `STOREFRONT_HOME_PATH`: guard redirect targets.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Url;

use crate::identity::Redirect;

pub const ENV_API_URL: &str = "STOREFRONT_API_URL";
pub const ENV_HTTP_TIMEOUT_MS: &str = "STOREFRONT_HTTP_TIMEOUT_MS";
pub const ENV_LOGIN_PATH: &str = "STOREFRONT_LOGIN_PATH";
pub const ENV_HOME_PATH: &str = "STOREFRONT_HOME_PATH";

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub api_url: Option<Url>,
    pub timeout: Duration,
    pub login_path: String,
    pub home_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            login_path: Redirect::Login.path().to_string(),
            home_path: Redirect::Home.path().to_string(),
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Result<Self> { Self::from_lookup(|k| std::env::var(k).ok()) }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = SessionConfig::default();
        if let Some(raw) = get(ENV_API_URL) {
            let url = Url::parse(&raw).with_context(|| format!("invalid {}: '{}'", ENV_API_URL, raw))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(anyhow!("{} must be http(s), got '{}'", ENV_API_URL, url.scheme()));
            }
            cfg.api_url = Some(url);
        }
        if let Some(raw) = get(ENV_HTTP_TIMEOUT_MS) {
            let ms: u64 = raw.parse().with_context(|| format!("invalid {}: '{}'", ENV_HTTP_TIMEOUT_MS, raw))?;
            cfg.timeout = Duration::from_millis(ms.max(1));
        }
        if let Some(p) = get(ENV_LOGIN_PATH) { cfg.login_path = p; }
        if let Some(p) = get(ENV_HOME_PATH) { cfg.home_path = p; }
        Ok(cfg)
    }

    /// No backend configured.
    pub fn is_local(&self) -> bool { self.api_url.is_none() }

    pub fn redirect_path(&self, target: Redirect) -> &str {
        match target {
            Redirect::Login => &self.login_path,
            Redirect::Home => &self.home_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| m.get(k).cloned()
    }

    #[test]
    fn defaults_are_local() {
        let cfg = SessionConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, SessionConfig::default());
        assert!(cfg.is_local());
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.redirect_path(Redirect::Login), "/login");
        assert_eq!(cfg.redirect_path(Redirect::Home), "/home");
    }

    #[test]
    fn reads_all_keys() {
        let cfg = SessionConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://shop.example/api"),
            (ENV_HTTP_TIMEOUT_MS, "2500"),
            (ENV_LOGIN_PATH, "/sign-in"),
            (ENV_HOME_PATH, "/"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_url.as_ref().map(|u| u.as_str()), Some("https://shop.example/api"));
        assert_eq!(cfg.timeout, Duration::from_millis(2500));
        assert_eq!(cfg.redirect_path(Redirect::Login), "/sign-in");
        assert_eq!(cfg.redirect_path(Redirect::Home), "/");
    }

    #[test]
    fn blank_url_means_local() {
        let cfg = SessionConfig::from_lookup(lookup(&[(ENV_API_URL, "   ")])).unwrap();
        assert!(cfg.is_local());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SessionConfig::from_lookup(lookup(&[(ENV_API_URL, "not a url")])).is_err());
        assert!(SessionConfig::from_lookup(lookup(&[(ENV_API_URL, "ftp://shop.example")])).is_err());
        assert!(SessionConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_MS, "soon")])).is_err());
    }
}
