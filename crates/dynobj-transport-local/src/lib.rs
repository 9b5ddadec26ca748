// # Local Shell Transport
//
// Runs the gateway command line through `/bin/sh -c` on the local machine,
// for deployments where this tool runs on the gateway itself.
//
// The command line needs a real shell: `&&` chaining and the `|| echo`
// sentinel branch are shell constructs. Injection safety comes from the
// protocol layer's token validation, which rejects every shell
// metacharacter before a line is ever built.
//
// A non-zero exit status is not an error here; the sentinel in stdout is
// the only failure signal the engine looks at.

use async_trait::async_trait;
use dynobj_core::error::{Error, Result};
use dynobj_core::traits::{ExecOutput, Transport};
use tokio::process::Command;
use tracing::debug;

const SHELL: &str = "/bin/sh";

/// Transport executing command lines in a local shell.
#[derive(Debug, Default, Clone)]
pub struct LocalTransport;

impl LocalTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn execute(&self, command_line: &str) -> Result<ExecOutput> {
        debug!(command = %command_line, "running local shell command");

        let output = Command::new(SHELL)
            .arg("-c")
            .arg(command_line)
            .output()
            .await
            .map_err(|e| Error::transport(format!("failed to spawn {SHELL}: {e}")))?;

        Ok(ExecOutput::from_raw(
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        ))
    }
}
