// # SSH Transport
//
// Executes gateway command lines over an SSH session, one exec channel per
// command. The session is established once at construction and reused;
// `ssh2` is a blocking library, so each execution is bridged onto the
// blocking thread pool with `spawn_blocking`.
//
// Authentication order: explicit private key if configured, otherwise
// password if configured, otherwise the local SSH agent.
//
// The remote exit status is read only for logging. The engine detects
// command failure through the sentinel token in stdout, because exit codes
// are not observable on every transport.

use async_trait::async_trait;
use dynobj_core::error::{Error, Result};
use dynobj_core::traits::{ExecOutput, Transport};
use ssh2::Session;
use std::io::Read;
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const SSH_PORT: u16 = 22;

/// How to authenticate the SSH session.
#[derive(Debug, Clone)]
pub enum SshAuth {
    /// Password authentication
    Password(String),
    /// Public-key authentication with a private key file
    Identity(PathBuf),
    /// Local SSH agent
    Agent,
}

impl SshAuth {
    /// Pick the auth method from the optional password/identity settings,
    /// key file first, agent as the fallback.
    pub fn from_options(password: Option<&str>, identity: Option<&Path>) -> Self {
        if let Some(path) = identity {
            Self::Identity(path.to_owned())
        } else if let Some(password) = password {
            Self::Password(password.to_owned())
        } else {
            Self::Agent
        }
    }
}

/// Transport running commands through a persistent SSH session.
pub struct SshTransport {
    session: Arc<Mutex<Session>>,
}

impl SshTransport {
    /// Connect and authenticate. Blocks the calling thread; run it before
    /// entering hot async paths or wrap it in `spawn_blocking`.
    pub fn connect(gateway: &str, user: &str, auth: &SshAuth) -> Result<Self> {
        let addr = if gateway.contains(':') {
            gateway.to_owned()
        } else {
            format!("{gateway}:{SSH_PORT}")
        };

        let tcp = TcpStream::connect(&addr)
            .map_err(|e| Error::transport(format!("connecting to {addr}: {e}")))?;

        let mut session = Session::new()
            .map_err(|e| Error::transport(format!("creating SSH session: {e}")))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| Error::transport(format!("SSH handshake with {addr}: {e}")))?;

        match auth {
            SshAuth::Password(password) => session
                .userauth_password(user, password)
                .map_err(|e| Error::transport(format!("password auth for {user}: {e}"))),
            SshAuth::Identity(key) => session
                .userauth_pubkey_file(user, None, key, None)
                .map_err(|e| {
                    Error::transport(format!("key auth with {}: {e}", key.display()))
                }),
            SshAuth::Agent => session
                .userauth_agent(user)
                .map_err(|e| Error::transport(format!("agent auth for {user}: {e}"))),
        }?;

        if !session.authenticated() {
            return Err(Error::transport(format!(
                "SSH authentication failed for {user}@{addr}"
            )));
        }

        info!(gateway = %addr, user, "SSH session established");
        Ok(Self { session: Arc::new(Mutex::new(session)) })
    }

    fn exec_blocking(session: &Session, command_line: &str) -> Result<ExecOutput> {
        let mut channel = session
            .channel_session()
            .map_err(|e| Error::transport(format!("opening SSH channel: {e}")))?;
        channel
            .exec(command_line)
            .map_err(|e| Error::transport(format!("executing remote command: {e}")))?;

        let mut stdout = String::new();
        channel
            .read_to_string(&mut stdout)
            .map_err(|e| Error::transport(format!("reading remote stdout: {e}")))?;

        let mut stderr = String::new();
        channel
            .stderr()
            .read_to_string(&mut stderr)
            .map_err(|e| Error::transport(format!("reading remote stderr: {e}")))?;

        channel
            .wait_close()
            .map_err(|e| Error::transport(format!("waiting for channel close: {e}")))?;

        // informational only; the sentinel carries the failure signal
        if let Ok(status) = channel.exit_status() {
            debug!(status, "remote command finished");
        }

        Ok(ExecOutput::from_raw(&stdout, &stderr))
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn execute(&self, command_line: &str) -> Result<ExecOutput> {
        debug!(command = %command_line, "running SSH command");

        let session = Arc::clone(&self.session);
        let line = command_line.to_owned();
        tokio::task::spawn_blocking(move || {
            let session = session.lock().expect("SSH session lock poisoned");
            Self::exec_blocking(&session, &line)
        })
        .await
        .map_err(|e| Error::transport(format!("SSH executor task failed: {e}")))?
    }
}
