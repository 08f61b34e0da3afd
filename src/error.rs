//! Error model for the session core and every request routed through it.
//! Failures are categorised by what the caller may do about them: only
//! `Unauthorized` is eligible for the refresh-and-retry path, and only
//! `ServerFault` is treated as "session state unknown" during a refresh.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Coarse failure category, independent of the carried status and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Unauthorized,
    ServerFault,
    ClientError,
    NetworkFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthError {
    /// Ambient credential missing, expired or rejected (401).
    Unauthorized { status: u16, message: String },
    /// Backend-side failure (5xx).
    ServerFault { status: u16, message: String },
    /// Any other rejected request: validation, not-found, forbidden-by-role.
    ClientError { status: u16, message: String },
    /// The transport could not complete the exchange.
    NetworkFailure { message: String },
}

impl AuthError {
    /// Classify a non-2xx HTTP status. 401 is the only status mapped to
    /// `Unauthorized`; 403 stays a `ClientError`.
    pub fn from_status<S: Into<String>>(status: u16, message: S) -> Self {
        let message = message.into();
        match status {
            401 => AuthError::Unauthorized { status, message },
            500..=599 => AuthError::ServerFault { status, message },
            _ => AuthError::ClientError { status, message },
        }
    }

    pub fn unauthorized<S: Into<String>>(msg: S) -> Self { AuthError::Unauthorized { status: 401, message: msg.into() } }
    pub fn server_fault<S: Into<String>>(msg: S) -> Self { AuthError::ServerFault { status: 500, message: msg.into() } }
    pub fn client<S: Into<String>>(status: u16, msg: S) -> Self { AuthError::ClientError { status, message: msg.into() } }
    pub fn network<S: Into<String>>(msg: S) -> Self { AuthError::NetworkFailure { message: msg.into() } }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AuthError::Unauthorized { .. } => ErrorCategory::Unauthorized,
            AuthError::ServerFault { .. } => ErrorCategory::ServerFault,
            AuthError::ClientError { .. } => ErrorCategory::ClientError,
            AuthError::NetworkFailure { .. } => ErrorCategory::NetworkFailure,
        }
    }

    pub fn is_unauthorized(&self) -> bool { matches!(self, AuthError::Unauthorized { .. }) }

    pub fn is_server_fault(&self) -> bool { matches!(self, AuthError::ServerFault { .. }) }

    /// Message as reported by the backend or transport. May be empty when the
    /// response carried no message field.
    pub fn message(&self) -> &str {
        match self {
            AuthError::Unauthorized { message, .. }
            | AuthError::ServerFault { message, .. }
            | AuthError::ClientError { message, .. }
            | AuthError::NetworkFailure { message } => message.as_str(),
        }
    }

    /// Backend message, or `fallback` when none was provided.
    pub fn message_or(&self, fallback: &str) -> String {
        let m = self.message().trim();
        if m.is_empty() { fallback.to_string() } else { m.to_string() }
    }

    /// HTTP status that produced this error; `None` for transport failures.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AuthError::Unauthorized { status, .. }
            | AuthError::ServerFault { status, .. }
            | AuthError::ClientError { status, .. } => Some(*status),
            AuthError::NetworkFailure { .. } => None,
        }
    }
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Unauthorized => "unauthorized",
            ErrorCategory::ServerFault => "server_fault",
            ErrorCategory::ClientError => "client_error",
            ErrorCategory::NetworkFailure => "network_failure",
        };
        f.write_str(s)
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.http_status() {
            Some(code) => write!(f, "{} ({}): {}", self.category(), code, self.message()),
            None => write!(f, "{}: {}", self.category(), self.message()),
        }
    }
}

impl std::error::Error for AuthError {}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AuthError::from_status(status.as_u16(), err.to_string()),
            None => AuthError::NetworkFailure { message: err.to_string() },
        }
    }
}

/// Pull a human-readable message out of an error response body.
/// Looks at `message`, then `error` (string or `{ message }`), else empty.
pub fn extract_error_message(body: &str) -> String {
    let Ok(v) = serde_json::from_str::<serde_json::Value>(body) else { return String::new(); };
    if let Some(m) = v.get("message").and_then(|m| m.as_str()) { return m.to_string(); }
    match v.get("error") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(obj) => obj.get("message").and_then(|m| m.as_str()).unwrap_or("").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(AuthError::from_status(401, "x").category(), ErrorCategory::Unauthorized);
        assert_eq!(AuthError::from_status(403, "x").category(), ErrorCategory::ClientError);
        assert_eq!(AuthError::from_status(404, "x").category(), ErrorCategory::ClientError);
        assert_eq!(AuthError::from_status(422, "x").category(), ErrorCategory::ClientError);
        assert_eq!(AuthError::from_status(500, "x").category(), ErrorCategory::ServerFault);
        assert_eq!(AuthError::from_status(503, "x").category(), ErrorCategory::ServerFault);
        assert!(AuthError::from_status(401, "").is_unauthorized());
        assert!(!AuthError::from_status(403, "").is_unauthorized());
    }

    #[test]
    fn message_fallback_and_status() {
        let e = AuthError::unauthorized("");
        assert_eq!(e.message_or("login failed"), "login failed");
        assert_eq!(e.http_status(), Some(401));
        let e = AuthError::client(400, "bad account");
        assert_eq!(e.message_or("login failed"), "bad account");
        assert_eq!(AuthError::network("refused").http_status(), None);
    }

    #[test]
    fn display_includes_category_and_code() {
        assert_eq!(AuthError::server_fault("db down").to_string(), "server_fault (500): db down");
        assert_eq!(AuthError::network("timed out").to_string(), "network_failure: timed out");
    }

    #[test]
    fn serde_tagged_shape() {
        let v = serde_json::to_value(AuthError::unauthorized("expired")).unwrap();
        assert_eq!(v["type"], "unauthorized");
        assert_eq!(v["status"], 401);
        assert_eq!(v["message"], "expired");
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(extract_error_message(r#"{"message":"bad password"}"#), "bad password");
        assert_eq!(extract_error_message(r#"{"error":"no such account"}"#), "no such account");
        assert_eq!(extract_error_message(r#"{"error":{"message":"nested"}}"#), "nested");
        assert_eq!(extract_error_message("<html>oops</html>"), "");
        assert_eq!(extract_error_message(r#"{"status":"error"}"#), "");
    }
}
