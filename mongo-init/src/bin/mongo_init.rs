//! MongoDB init script
//!
//! Runs ONCE from docker-entrypoint-initdb.d on a fresh data directory, while
//! the server only listens locally. Creates the application user in `admin`
//! with readWrite on the target database. Exits non-zero on any failure so
//! container startup aborts.

use common::init_logging;
use mongo_init::{run_init, wait_for_server, ConnectionConfig, InitConfig, InitError, MongoShell};
use std::time::Instant;
use tracing::{error, info};

fn fail(err: &InitError, phase: &str) -> ! {
    error!(error = %err, phase, "mongo-init failed");
    std::process::exit(1);
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _guard = init_logging("mongo-init");

    let start = Instant::now();
    info!("mongo-init starting...");

    let connection = ConnectionConfig::from_env().unwrap_or_else(|e| fail(&e, e.phase()));
    let config = InitConfig::from_env().unwrap_or_else(|e| fail(&e, e.phase()));

    info!(
        shell = %connection.shell,
        host = %connection.host,
        port = connection.port,
        user = %config.user,
        database = %config.database,
        "Configuration loaded"
    );

    let shell = MongoShell::new(connection);

    if let Err(e) = wait_for_server(&shell).await {
        fail(&e, "wait_for_server");
    }

    let created = match run_init(config, &shell).await {
        Ok(spec) => spec,
        Err(e) => fail(&e, e.phase()),
    };

    info!(
        user = %created.user,
        databases = ?created.databases(),
        duration_ms = start.elapsed().as_millis() as u64,
        "User created"
    );
}
