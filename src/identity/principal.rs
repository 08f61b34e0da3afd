use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Role {
    User,
    Seller,
    Business,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Seller, Role::Business, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Seller => "seller",
            Role::Business => "business",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "seller" => Ok(Role::Seller),
            "business" => Ok(Role::Business),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum AccountStatus {
    PendingVerification,
    Active,
    Inactive,
    Banned,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::PendingVerification => "pending-verification",
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Banned => "banned",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = String;
    // Backends are not consistent about casing; normalise before matching.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending-verification" => Ok(AccountStatus::PendingVerification),
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            "banned" => Ok(AccountStatus::Banned),
            other => Err(format!("unknown account status '{}'", other)),
        }
    }
}

impl TryFrom<String> for AccountStatus {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Account summary returned by the login and refresh endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<AccountStatus>,
}

// Values this client does not know about decode as unset instead of failing the payload.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.parse().ok()))
}

impl Identity {
    pub fn new<S: Into<String>>(username: S, role: Role, status: AccountStatus) -> Self {
        Self { id: None, username: username.into(), role: Some(role), status: Some(status) }
    }

    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub account: String,
    pub password: String,
}

impl Credentials {
    pub fn new<A: Into<String>, P: Into<String>>(account: A, password: P) -> Self {
        Self { account: account.into(), password: password.into() }
    }

    pub fn is_complete(&self) -> bool {
        !self.account.is_empty() && !self.password.is_empty()
    }
}

// Never print the password.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("account", &self.account).field("password", &"***").finish()
    }
}
