//! MongoDB shell client
//!
//! Drives `mongosh` (or the legacy `mongo` shell) as a subprocess. Scripts are
//! fed on stdin so credentials never reach the process table, and every value
//! is embedded as a JSON literal. Each script prints a JSON reply behind
//! `REPLY_MARKER`, which is found anywhere on a line since a piped shell may
//! prefix output with prompts or echoed input.

use crate::admin::UserAdmin;
use crate::config::ConnectionConfig;
use crate::error::InitError;
use crate::user::{UserSpec, ADMIN_NAMESPACE};
use common::{run_with_input, CommandOutput};
use serde::Deserialize;
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Server error code for `createUser` on an existing name.
pub const DUPLICATE_USER_CODE: i32 = 51003;

/// Prefix of the reply line printed by every script.
pub const REPLY_MARKER: &str = "MONGO_INIT_REPLY:";

/// Exit status of a script that caught a server error.
const SCRIPT_ERROR_EXIT: i32 = 2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShellReply {
    ok: i32,
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    code_name: Option<String>,
    #[serde(default)]
    errmsg: Option<String>,
}

/// `UserAdmin` backed by the MongoDB shell binary.
pub struct MongoShell {
    config: ConnectionConfig,
}

impl MongoShell {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn args(&self) -> Vec<String> {
        vec![
            "--quiet".to_string(),
            "--host".to_string(),
            self.config.host.clone(),
            "--port".to_string(),
            self.config.port.to_string(),
        ]
    }

    /// Wrap `body` with optional root authentication and reply printing.
    fn render_script(&self, body: &str) -> String {
        let auth = match self.config.root_credentials() {
            Some((user, pass)) => format!(
                "  if (!db.getSiblingDB({ns}).auth({user}, {pass})) {{ throw new Error(\"root authentication failed\"); }}\n",
                ns = json!(ADMIN_NAMESPACE),
                user = json!(user),
                pass = json!(pass.expose()),
            ),
            None => String::new(),
        };

        format!(
            "try {{\n{auth}  {body}\n  print({marker} + JSON.stringify({{ ok: 1 }}));\n}} catch (e) {{\n  print({marker} + JSON.stringify({{ ok: 0, code: e.code, codeName: e.codeName, errmsg: e.message }}));\n  quit({exit});\n}}\n",
            auth = auth,
            body = body,
            marker = json!(REPLY_MARKER),
            exit = SCRIPT_ERROR_EXIT,
        )
    }

    /// Script that creates `user` in `namespace`.
    pub fn create_user_script(&self, namespace: &str, user: &UserSpec) -> String {
        let body = format!(
            "db.getSiblingDB({}).createUser({});",
            json!(namespace),
            json!(user),
        );
        self.render_script(&body)
    }

    /// Script that round-trips a `ping` command.
    pub fn ping_script(&self) -> String {
        self.render_script(&format!(
            "db.getSiblingDB({}).runCommand({{ ping: 1 }});",
            json!(ADMIN_NAMESPACE)
        ))
    }

    async fn eval(&self, script: &str) -> Result<CommandOutput, InitError> {
        let args = self.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        run_with_input(&self.config.shell, &args, script)
            .await
            .map_err(|e| InitError::CollaboratorFailure(format!("{:#}", e)))
    }

    /// Check that the server answers.
    pub async fn ping(&self) -> Result<(), InitError> {
        let output = self.eval(&self.ping_script()).await?;
        interpret(&self.config.shell, &output, None)
    }
}

impl UserAdmin for MongoShell {
    async fn create_user(&self, namespace: &str, user: &UserSpec) -> Result<(), InitError> {
        debug!(
            host = %self.config.host,
            port = self.config.port,
            authenticated = self.config.root_credentials().is_some(),
            "Issuing createUser"
        );

        let output = self.eval(&self.create_user_script(namespace, user)).await?;
        interpret(&self.config.shell, &output, Some((user.user.as_str(), namespace)))
    }
}

/// Ping the server until it answers, at most `config.wait_retries` times.
///
/// Zero retries means no ping at all.
pub async fn wait_for_server(shell: &MongoShell) -> Result<(), InitError> {
    let retries = shell.config().wait_retries;
    let delay = shell.config().wait_delay;

    if retries == 0 {
        return Ok(());
    }

    for attempt in 1..=retries {
        match shell.ping().await {
            Ok(()) => {
                info!(attempt, "Server is ready");
                return Ok(());
            }
            Err(e) => {
                warn!(attempt, max_attempts = retries, error = %e, "Server not ready");
                if attempt < retries {
                    sleep(delay).await;
                }
            }
        }
    }

    Err(InitError::CollaboratorFailure(format!(
        "server at {}:{} did not answer after {} attempts",
        shell.config().host,
        shell.config().port,
        retries
    )))
}

/// Last reply printed behind `REPLY_MARKER`.
///
/// Echoed script source also contains the marker, but what follows it there
/// is not JSON and is skipped.
fn last_reply(stdout: &str) -> Option<ShellReply> {
    stdout.lines().rev().find_map(|line| {
        line.rmatch_indices(REPLY_MARKER)
            .find_map(|(at, _)| {
                let rest = &line[at + REPLY_MARKER.len()..];
                serde_json::Deserializer::from_str(rest)
                    .into_iter::<ShellReply>()
                    .next()
                    .and_then(Result::ok)
            })
    })
}

/// Map shell output to the error taxonomy.
///
/// `target` is the (user, namespace) being created, if any; it enables
/// duplicate detection.
fn interpret(
    shell: &str,
    output: &CommandOutput,
    target: Option<(&str, &str)>,
) -> Result<(), InitError> {
    match last_reply(&output.stdout) {
        Some(reply) if reply.ok == 1 && output.success => Ok(()),
        Some(reply) if reply.ok != 1 => {
            let message = reply
                .errmsg
                .unwrap_or_else(|| "unknown server error".to_string());

            let duplicate = reply.code == Some(DUPLICATE_USER_CODE)
                || message.contains("already exists");

            match target {
                Some((user, namespace)) if duplicate => Err(InitError::UserAlreadyExists {
                    user: user.to_string(),
                    namespace: namespace.to_string(),
                }),
                _ => Err(InitError::CollaboratorFailure(match reply.code_name {
                    Some(code_name) => format!("{} ({})", message, code_name),
                    None => message,
                })),
            }
        }
        _ => {
            let detail = if output.stderr.is_empty() {
                &output.stdout
            } else {
                &output.stderr
            };
            Err(InitError::CollaboratorFailure(format!(
                "{} failed (exit {}): {}",
                shell,
                output.exit_label(),
                detail
            )))
        }
    }
}
