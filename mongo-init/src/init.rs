//! The initialization routine
//!
//! Creates the application user in the administrative namespace with a single
//! `readWrite` binding on the target database. Runs once per fresh data
//! directory; a second run is rejected by the server as a duplicate.

use crate::admin::UserAdmin;
use crate::config::InitConfig;
use crate::error::InitError;
use crate::user::{RoleBinding, UserSpec, ADMIN_NAMESPACE};
use tracing::{info, instrument};

/// Validate `config` and create its user through `admin`.
///
/// Returns the created user. No collaborator call is made when a value is
/// missing, and collaborator errors are returned unmodified.
#[instrument(skip_all, fields(user = %config.user, database = %config.database))]
pub async fn run_init(config: InitConfig, admin: &impl UserAdmin) -> Result<UserSpec, InitError> {
    config.validate()?;

    let spec = UserSpec {
        user: config.user,
        pwd: config.password,
        roles: vec![RoleBinding::read_write(&config.database)],
    };

    info!(namespace = ADMIN_NAMESPACE, "Creating user");
    admin.create_user(ADMIN_NAMESPACE, &spec).await?;

    Ok(spec)
}
