// # Transport Trait
//
// Defines the single remote-execution contract consumed by the command
// protocol.
//
// ## Implementations
//
// - SSH: `dynobj-transport-ssh` crate
// - Vendor remote-exec (cprid): `dynobj-transport-cprid` crate
// - Local shell: `dynobj-transport-local` crate
//
// A transport executes exactly one shell-level command line and hands back
// whatever the remote side printed. Failure of the *remote command* is not
// the transport's business: the protocol layer detects it through the
// sentinel token in stdout, because exit codes do not survive every
// transport. A transport errors only when it could not run the command at
// all (connection lost, process failed to spawn).
//
// No transport is required to support cancellation, timeouts, or concurrent
// calls; the engine issues at most one call at a time per instance.

use crate::error::Result;
use async_trait::async_trait;

/// Captured output of one remote command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Stdout, split into lines in arrival order
    pub stdout_lines: Vec<String>,
    /// Stderr, split into lines in arrival order
    pub stderr_lines: Vec<String>,
}

impl ExecOutput {
    /// Split raw captured streams into line vectors.
    pub fn from_raw(stdout: &str, stderr: &str) -> Self {
        Self {
            stdout_lines: stdout.lines().map(str::to_owned).collect(),
            stderr_lines: stderr.lines().map(str::to_owned).collect(),
        }
    }
}

/// Trait for remote-execution transport implementations
///
/// # Contract
///
/// - Execute `command_line` through a shell on the target, synchronously
///   from the caller's perspective.
/// - Capture stdout and stderr completely before returning.
/// - **Must not fail on a non-zero remote exit status** — the sentinel in
///   stdout is the only portable failure signal.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one command line and return its captured output.
    async fn execute(&self, command_line: &str) -> Result<ExecOutput>;
}
