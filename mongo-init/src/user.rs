//! User record types sent to the administrative namespace

use serde::Serialize;
use std::fmt;

/// Database holding the user registry.
pub const ADMIN_NAMESPACE: &str = "admin";

/// Role granting read and write access to one database.
pub const READ_WRITE: &str = "readWrite";

/// A string that never shows up in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// A (role, database) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleBinding {
    pub role: String,
    pub db: String,
}

impl RoleBinding {
    pub fn read_write(db: &str) -> Self {
        Self {
            role: READ_WRITE.to_string(),
            db: db.to_string(),
        }
    }
}

/// Document passed to `createUser`.
///
/// Field names match the server's command document so it serializes as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSpec {
    pub user: String,
    pub pwd: Secret,
    pub roles: Vec<RoleBinding>,
}

impl UserSpec {
    /// Names of the databases this user is bound to.
    pub fn databases(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.db.as_str()).collect()
    }
}
