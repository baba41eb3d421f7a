//! Configuration for mongo-init
//!
//! Values are read once in `main` into explicit structs and passed down by value.
//! Application credentials come from the environment (or `<NAME>_FILE` secrets),
//! with an optional YAML file filling whatever the environment leaves unset.

use crate::error::InitError;
use crate::user::Secret;
use common::ConfigExt;
use serde::Deserialize;
use std::time::Duration;

pub const USER_VAR: &str = "MONGODB_SMARTER_USER";
pub const PASSWORD_VAR: &str = "MONGODB_SMARTER_PASS";
pub const DATABASE_VAR: &str = "MONGO_INITDB_DATABASE";

/// Path of an optional YAML file with an `app_user` section.
pub const CONFIG_FILE_VAR: &str = "MONGO_INIT_CONFIG";

pub const ROOT_USER_VAR: &str = "MONGO_INITDB_ROOT_USERNAME";
pub const ROOT_PASSWORD_VAR: &str = "MONGO_INITDB_ROOT_PASSWORD";

/// Partial config file - only the section we need
#[derive(Deserialize)]
struct InitFile {
    #[serde(default)]
    app_user: AppUser,
}

#[derive(Deserialize, Default)]
struct AppUser {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    database: String,
}

/// Credentials and target database of the user to create.
#[derive(Debug, Clone)]
pub struct InitConfig {
    pub user: String,
    pub password: Secret,
    pub database: String,
}

impl InitConfig {
    pub fn new(user: &str, password: &str, database: &str) -> Self {
        Self {
            user: user.to_string(),
            password: Secret::new(password),
            database: database.to_string(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, InitError> {
        let file = match String::env_nonempty(CONFIG_FILE_VAR) {
            Some(path) => read_app_user(&path)?,
            None => AppUser::default(),
        };

        let config = Self {
            user: secret_or(USER_VAR, file.username)?,
            password: Secret::new(secret_or(PASSWORD_VAR, file.password)?),
            database: secret_or(DATABASE_VAR, file.database)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Every value must be present and non-empty, checked in declaration order.
    pub fn validate(&self) -> Result<(), InitError> {
        if self.user.is_empty() {
            return Err(InitError::missing(USER_VAR));
        }
        if self.password.is_empty() {
            return Err(InitError::missing(PASSWORD_VAR));
        }
        if self.database.is_empty() {
            return Err(InitError::missing(DATABASE_VAR));
        }
        Ok(())
    }
}

/// How to reach the server through its shell.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub shell: String,
    pub host: String,
    pub port: u16,
    pub root_user: Option<String>,
    pub root_password: Option<Secret>,
    pub wait_retries: u32,
    pub wait_delay: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            shell: "mongosh".to_string(),
            host: "127.0.0.1".to_string(),
            port: 27017,
            root_user: None,
            root_password: None,
            wait_retries: 0,
            wait_delay: Duration::from_secs(1),
        }
    }
}

impl ConnectionConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, InitError> {
        Ok(Self {
            shell: String::env_or("MONGO_SHELL", "mongosh"),
            host: String::env_or("MONGO_HOST", "127.0.0.1"),
            port: u16::env_parse("MONGO_PORT", 27017),
            root_user: optional_secret(ROOT_USER_VAR)?,
            root_password: optional_secret(ROOT_PASSWORD_VAR)?.map(Secret::new),
            wait_retries: u32::env_parse("MONGO_INIT_WAIT_RETRIES", 0),
            wait_delay: Duration::from_secs(u64::env_parse("MONGO_INIT_WAIT_DELAY", 1)),
        })
    }

    /// Root credentials, only when both halves are configured.
    pub fn root_credentials(&self) -> Option<(&str, &Secret)> {
        match (&self.root_user, &self.root_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass)),
            _ => None,
        }
    }
}

fn read_app_user(path: &str) -> Result<AppUser, InitError> {
    let invalid = |reason: String| InitError::InvalidConfigFile {
        path: path.to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let file: InitFile = serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?;

    Ok(file.app_user)
}

fn optional_secret(name: &str) -> Result<Option<String>, InitError> {
    String::env_secret(name).map_err(|e| InitError::InvalidConfigFile {
        path: format!("${}_FILE", name),
        reason: format!("{:#}", e),
    })
}

fn secret_or(name: &str, fallback: String) -> Result<String, InitError> {
    Ok(optional_secret(name)?.unwrap_or(fallback))
}
