//! Exit status of the mongo-init binary

use serial_test::serial;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Shell stand-in that swallows its script and runs `body`.
fn fake_shell(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("mongosh");
    fs::write(&path, format!("#!/bin/sh\ncat > /dev/null\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn mongo_init(envs: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mongo-init"))
        .env_clear()
        .env("PATH", std::env::var("PATH").unwrap_or_default())
        .envs(envs.iter().copied())
        .output()
        .unwrap()
}

fn app_env<'a>(shell: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("MONGO_SHELL", shell),
        ("MONGODB_SMARTER_USER", "svc_app"),
        ("MONGODB_SMARTER_PASS", "s3cr3t"),
        ("MONGO_INITDB_DATABASE", "appdb"),
    ]
}

#[test]
#[serial]
fn test_missing_configuration_exits_1() {
    let output = mongo_init(&[
        ("MONGODB_SMARTER_USER", "svc_app"),
        ("MONGODB_SMARTER_PASS", "s3cr3t"),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let logs = String::from_utf8_lossy(&output.stdout);
    assert!(logs.contains("MONGO_INITDB_DATABASE"), "{}", logs);
    assert!(!logs.contains("s3cr3t"), "{}", logs);
}

#[test]
#[serial]
fn test_created_user_exits_0() {
    let dir = TempDir::new().unwrap();
    let shell = fake_shell(&dir, "echo 'test> MONGO_INIT_REPLY:{\"ok\":1}'");
    let shell = shell.to_string_lossy();

    let output = mongo_init(&app_env(&shell));

    assert_eq!(output.status.code(), Some(0));
}

#[test]
#[serial]
fn test_duplicate_user_exits_1() {
    let dir = TempDir::new().unwrap();
    let shell = fake_shell(
        &dir,
        "echo 'MONGO_INIT_REPLY:{\"ok\":0,\"code\":51003,\"errmsg\":\"User already exists\"}'\nexit 2",
    );
    let shell = shell.to_string_lossy();

    let output = mongo_init(&app_env(&shell));

    assert_eq!(output.status.code(), Some(1));
    let logs = String::from_utf8_lossy(&output.stdout);
    assert!(logs.contains("already exists"), "{}", logs);
}

#[test]
#[serial]
fn test_unreachable_server_exits_1() {
    let dir = TempDir::new().unwrap();
    let shell = fake_shell(&dir, "echo 'connect ECONNREFUSED' >&2\nexit 1");
    let shell = shell.to_string_lossy();

    let output = mongo_init(&app_env(&shell));

    assert_eq!(output.status.code(), Some(1));
    let logs = String::from_utf8_lossy(&output.stdout);
    assert!(logs.contains("ECONNREFUSED"), "{}", logs);
}
