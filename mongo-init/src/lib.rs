//! Bootstrap of the application user in MongoDB
//!
//! Runs once from the container's init lifecycle: reads the application
//! credentials, then creates the user in the `admin` namespace with
//! `readWrite` on the target database.

pub mod admin;
pub mod config;
pub mod error;
pub mod init;
pub mod memory;
pub mod mongosh;
pub mod user;

pub use admin::UserAdmin;
pub use config::{ConnectionConfig, InitConfig};
pub use error::InitError;
pub use init::run_init;
pub use memory::InMemoryAdmin;
pub use mongosh::{wait_for_server, MongoShell};
pub use user::{RoleBinding, Secret, UserSpec, ADMIN_NAMESPACE, READ_WRITE};
