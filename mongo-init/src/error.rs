//! Error taxonomy for user initialization

use thiserror::Error;

/// Everything the initialization routine can fail with.
///
/// None of these are recovered locally; the binary logs them and exits non-zero.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InitError {
    /// A required value was absent or empty.
    #[error("{name} must be set and non-empty")]
    ConfigurationMissing { name: String },

    /// The server already holds a user of this name in the namespace.
    #[error("user \"{user}\" already exists in \"{namespace}\"")]
    UserAlreadyExists { user: String, namespace: String },

    /// Any other rejection from the administrative collaborator, unmodified.
    #[error("{0}")]
    CollaboratorFailure(String),

    /// The optional YAML credentials file could not be used.
    #[error("invalid config file {path}: {reason}")]
    InvalidConfigFile { path: String, reason: String },
}

impl InitError {
    pub fn missing(name: &str) -> Self {
        Self::ConfigurationMissing {
            name: name.to_string(),
        }
    }

    /// Phase label used when logging a failure.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::ConfigurationMissing { .. } | Self::InvalidConfigFile { .. } => "read_config",
            Self::UserAlreadyExists { .. } | Self::CollaboratorFailure(_) => "create_user",
        }
    }
}
