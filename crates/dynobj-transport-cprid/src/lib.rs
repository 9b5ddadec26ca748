// # Vendor Remote-Exec Transport (cprid)
//
// Executes gateway command lines through the vendor's `cprid_util` remote
// execution utility, for a tool running on a management station that
// already trusts the gateway.
//
// `cprid_util` lives under the product installation directory, named by the
// `CPDIR` environment variable. Captured output is staged in a temporary
// file under that directory because the utility's own stdout interleaves
// diagnostics with the remote command's output. A missing or non-existent
// `CPDIR` is a fatal configuration error for this transport only.

use async_trait::async_trait;
use dynobj_core::error::{Error, Result};
use dynobj_core::traits::{ExecOutput, Transport};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Environment variable naming the product installation directory.
pub const CPDIR_ENV: &str = "CPDIR";

const UTIL_RELATIVE_PATH: &str = "bin/cprid_util";
const REMOTE_SHELL: &str = "/bin/sh";

/// Transport running commands via `cprid_util rexec`.
pub struct CpridTransport {
    gateway: String,
    util: PathBuf,
    stage_dir: PathBuf,
}

impl CpridTransport {
    /// Resolve `cprid_util` under `$CPDIR` and validate the staging
    /// directory.
    pub fn new(gateway: impl Into<String>) -> Result<Self> {
        let base = std::env::var(CPDIR_ENV).map_err(|_| {
            Error::config(format!("{CPDIR_ENV} is not set; is this a management station?"))
        })?;
        let base = PathBuf::from(base);
        if !base.is_dir() {
            return Err(Error::config(format!(
                "{CPDIR_ENV} points to a non-existent directory: {}",
                base.display()
            )));
        }

        let util = base.join(UTIL_RELATIVE_PATH);
        if !util.is_file() {
            return Err(Error::config(format!(
                "remote-exec utility not found: {}",
                util.display()
            )));
        }

        Ok(Self { gateway: gateway.into(), util, stage_dir: base })
    }

    /// Constructor for tests, bypassing the environment lookup.
    #[doc(hidden)]
    pub fn with_paths(gateway: impl Into<String>, util: PathBuf, stage_dir: PathBuf) -> Self {
        Self { gateway: gateway.into(), util, stage_dir }
    }
}

#[async_trait]
impl Transport for CpridTransport {
    async fn execute(&self, command_line: &str) -> Result<ExecOutput> {
        debug!(gateway = %self.gateway, command = %command_line, "running cprid command");

        // remote output is staged in a file under $CPDIR and read back
        let stage = tempfile::NamedTempFile::new_in(&self.stage_dir)
            .map_err(|e| Error::transport(format!("creating staging file: {e}")))?;
        let stage_file = stage
            .reopen()
            .map_err(|e| Error::transport(format!("opening staging file: {e}")))?;

        let output = Command::new(&self.util)
            .arg("-server")
            .arg(&self.gateway)
            .arg("-verbose")
            .arg("rexec")
            .arg("-rcmd")
            .arg(REMOTE_SHELL)
            .arg("-c")
            .arg(command_line)
            .stdout(Stdio::from(stage_file))
            .stderr(Stdio::piped())
            // `output()` would override the staged stdout with a pipe;
            // `spawn` + `wait_with_output` respects the configured stdio
            .spawn()
            .map_err(|e| {
                Error::transport(format!("failed to spawn {}: {e}", self.util.display()))
            })?
            .wait_with_output()
            .await
            .map_err(|e| {
                Error::transport(format!("waiting for {}: {e}", self.util.display()))
            })?;

        let stdout = tokio::fs::read_to_string(stage.path())
            .await
            .map_err(|e| Error::transport(format!("reading staged output: {e}")))?;

        Ok(ExecOutput::from_raw(
            &stdout,
            &String::from_utf8_lossy(&output.stderr),
        ))
    }
}
