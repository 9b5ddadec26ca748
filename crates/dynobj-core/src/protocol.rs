//! Remote command protocol
//!
//! Turns a sequence of chained gateway invocations into exactly one text
//! command line, executes it through the injected [`Transport`], and
//! interprets the captured output.
//!
//! The gateway CLI has no structured success/failure channel that survives
//! all three transports, so the built line is suffixed with
//! `|| echo __ERROR__`: a non-zero exit anywhere in the chain becomes a
//! sentinel token observable in stdout. Tokens are interpolated into a shell
//! command line, so every one of them must pass the safety pattern
//! `[a-zA-Z0-9_.-]+` before the line is assembled.

use crate::error::{Error, Result};
use crate::traits::Transport;
use tracing::debug;

/// Name of the gateway CLI tool.
pub const BASE_COMMAND: &str = "dynamic_objects";

/// Sentinel echoed into stdout when any stage of the chain exits non-zero.
pub const ERROR_TOKEN: &str = "__ERROR__";

/// The gateway's way of saying "no objects exist yet".
const FILE_IS_EMPTY: &str = "File is empty";

/// Listing flag, checked for the empty-gateway special case.
const LIST_FLAG: &str = "-l";

/// Validate a token against the shell-safety pattern `[a-zA-Z0-9_.-]+`.
pub fn validate_token(token: &str) -> Result<()> {
    let safe = !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'));
    if safe {
        Ok(())
    } else {
        Err(Error::invalid_name(token))
    }
}

/// Build one sentinel-terminated command line from chained token groups.
///
/// Each group is prefixed with the base command name; successive groups are
/// joined with a literal `&&`. Every caller-supplied token is validated; the
/// `&&`/`||`/`echo`/sentinel control tokens are inserted by this function
/// itself and are exempt.
pub fn build_command_line(groups: &[Vec<String>]) -> Result<String> {
    let mut words: Vec<&str> = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            words.push("&&");
        }
        words.push(BASE_COMMAND);
        for token in group {
            validate_token(token)?;
            words.push(token);
        }
    }
    words.extend(["||", "echo", ERROR_TOKEN]);
    Ok(words.join(" "))
}

/// Executes built command lines through a transport and interprets the
/// result.
pub struct CommandRunner {
    transport: Box<dyn Transport>,
}

impl CommandRunner {
    /// Wrap a transport.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Execute one chained command and return its stdout lines.
    ///
    /// A `File is empty` response to a listing command is a successful empty
    /// result, not an error. The sentinel token anywhere in stdout fails
    /// with [`Error::RemoteCommandFailed`] carrying both captured streams.
    pub async fn run(&self, groups: &[Vec<String>]) -> Result<Vec<String>> {
        let line = build_command_line(groups)?;
        debug!(command = %line, "executing gateway command");

        let output = self.transport.execute(&line).await?;
        let stdout: Vec<String> = output
            .stdout_lines
            .iter()
            .map(|l| l.trim().to_owned())
            .collect();
        debug!(lines = stdout.len(), "gateway command returned");

        let listing = groups
            .first()
            .and_then(|g| g.first())
            .is_some_and(|t| t == LIST_FLAG);
        if listing && stdout.iter().any(|l| l == FILE_IS_EMPTY) {
            return Ok(Vec::new());
        }
        if stdout.iter().any(|l| l == ERROR_TOKEN) {
            return Err(Error::remote_failed(stdout, output.stderr_lines));
        }
        Ok(stdout)
    }
}
