//! In-process user registry
//!
//! Follows the server's rules for what this tool touches: duplicate names are
//! rejected per namespace and role bindings must name a valid database.

use crate::admin::UserAdmin;
use crate::error::InitError;
use crate::user::{UserSpec, READ_WRITE};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Characters the server refuses in database names.
const INVALID_DB_CHARS: &[char] = &['/', '\\', '.', ' ', '"', '$', '\0'];

/// Users keyed by (namespace, name).
#[derive(Default)]
pub struct InMemoryAdmin {
    users: Mutex<BTreeMap<(String, String), UserSpec>>,
}

impl InMemoryAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    /// All users registered in `namespace`, ordered by name.
    pub fn users(&self, namespace: &str) -> Vec<UserSpec> {
        self.lock()
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, spec)| spec.clone())
            .collect()
    }

    /// Whether `user` exists in `namespace` with password `pwd`.
    pub fn authenticate(&self, namespace: &str, user: &str, pwd: &str) -> bool {
        self.lock()
            .get(&(namespace.to_string(), user.to_string()))
            .is_some_and(|spec| spec.pwd.expose() == pwd)
    }

    /// Whether `user` of `namespace` holds `readWrite` on `db`.
    pub fn can_read_write(&self, namespace: &str, user: &str, db: &str) -> bool {
        self.lock()
            .get(&(namespace.to_string(), user.to_string()))
            .is_some_and(|spec| {
                spec.roles
                    .iter()
                    .any(|binding| binding.role == READ_WRITE && binding.db == db)
            })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<(String, String), UserSpec>> {
        // A panic while holding the lock leaves the map intact.
        self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn check_db_name(db: &str) -> Result<(), InitError> {
    if db.is_empty() {
        return Err(InitError::CollaboratorFailure(
            "Database name cannot be empty".to_string(),
        ));
    }
    if let Some(c) = db.chars().find(|c| INVALID_DB_CHARS.contains(c)) {
        return Err(InitError::CollaboratorFailure(format!(
            "Invalid database name {:?}: contains {:?}",
            db, c
        )));
    }
    Ok(())
}

impl UserAdmin for InMemoryAdmin {
    async fn create_user(&self, namespace: &str, user: &UserSpec) -> Result<(), InitError> {
        check_db_name(namespace)?;
        if user.user.is_empty() {
            return Err(InitError::CollaboratorFailure(
                "User name must be non-empty".to_string(),
            ));
        }
        for binding in &user.roles {
            check_db_name(&binding.db)?;
        }

        let mut users = self.lock();
        let key = (namespace.to_string(), user.user.clone());
        if users.contains_key(&key) {
            return Err(InitError::UserAlreadyExists {
                user: user.user.clone(),
                namespace: namespace.to_string(),
            });
        }
        users.insert(key, user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{RoleBinding, Secret, ADMIN_NAMESPACE};

    fn spec(user: &str, db: &str) -> UserSpec {
        UserSpec {
            user: user.to_string(),
            pwd: Secret::new("pw"),
            roles: vec![RoleBinding::read_write(db)],
        }
    }

    #[tokio::test]
    async fn test_duplicates_are_per_namespace() {
        let admin = InMemoryAdmin::new();
        admin.create_user(ADMIN_NAMESPACE, &spec("u", "appdb")).await.unwrap();
        admin.create_user("other", &spec("u", "appdb")).await.unwrap();

        assert!(matches!(
            admin.create_user(ADMIN_NAMESPACE, &spec("u", "appdb")).await,
            Err(InitError::UserAlreadyExists { .. })
        ));
        assert_eq!(admin.users(ADMIN_NAMESPACE).len(), 1);
        assert_eq!(admin.users("other").len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_database_name_is_rejected() {
        let admin = InMemoryAdmin::new();

        for db in ["app.db", "app db", "app$db", "a/b"] {
            assert!(matches!(
                admin.create_user(ADMIN_NAMESPACE, &spec("u", db)).await,
                Err(InitError::CollaboratorFailure(_))
            ));
        }
        assert!(admin.users(ADMIN_NAMESPACE).is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_checks_password() {
        let admin = InMemoryAdmin::new();
        admin.create_user(ADMIN_NAMESPACE, &spec("u", "appdb")).await.unwrap();

        assert!(admin.authenticate(ADMIN_NAMESPACE, "u", "pw"));
        assert!(!admin.authenticate(ADMIN_NAMESPACE, "u", "wrong"));
        assert!(!admin.authenticate("appdb", "u", "pw"));
    }
}
