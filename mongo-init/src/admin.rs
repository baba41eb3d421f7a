//! Seam between the initialization routine and the database server

use crate::error::InitError;
use crate::user::UserSpec;

/// Administrative operations the routine needs from the server.
///
/// Implementations own duplicate detection, credential hashing and
/// persistence; callers do no existence checks of their own.
#[allow(async_fn_in_trait)]
pub trait UserAdmin {
    /// Create `user` in the user registry of `namespace`.
    ///
    /// Fails with `UserAlreadyExists` on a duplicate name and with
    /// `CollaboratorFailure` for any other rejection.
    async fn create_user(&self, namespace: &str, user: &UserSpec) -> Result<(), InitError>;
}
