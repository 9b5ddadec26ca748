//! Error types for the dynamic-object synchronization engine
//!
//! Every error is propagated to the immediate caller; the engine performs no
//! retries and no partial-failure recovery. A failed chained command may
//! leave the gateway in an intermediate state, and callers should treat any
//! [`Error::RemoteCommandFailed`] as "state unknown, re-fetch before
//! retrying".

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dynamic-object engine
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed dotted-decimal address text
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// CIDR mask bit-count outside [0, 32]
    #[error("invalid mask bits in {0:?} (must be 0-32)")]
    InvalidMask(String),

    /// Token failed the shell-safety pattern `[a-zA-Z0-9_.-]+`
    #[error("invalid token: {0:?}")]
    InvalidName(String),

    /// Object does not exist on the gateway
    #[error("object does not exist: {0:?}")]
    ObjectNotFound(String),

    /// Object creation refused because the object already exists
    #[error("object already exists: {0:?}")]
    ObjectAlreadyExists(String),

    /// Removal target overlaps none of the object's stored ranges
    #[error("no such address in object {object:?}: {spec}")]
    AddressNotInObject {
        /// Object name
        object: String,
        /// The address spec that matched nothing
        spec: String,
    },

    /// An add operation was given zero address specs
    #[error("empty address list")]
    EmptyAddressList,

    /// The error sentinel was observed in captured stdout
    #[error("remote command failed: {stdout:?} / {stderr:?}")]
    RemoteCommandFailed {
        /// Captured stdout lines, for diagnostics
        stdout: Vec<String>,
        /// Captured stderr lines, for diagnostics
        stderr: Vec<String>,
    },

    /// Unknown transport scheme name
    #[error("unsupported transport scheme: {0:?}")]
    UnsupportedTransport(String),

    /// Transport-level failure before any output was captured
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors (config file, local process spawning)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors from the object-map configuration file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid-address error
    pub fn invalid_address(text: impl Into<String>) -> Self {
        Self::InvalidAddress(text.into())
    }

    /// Create an invalid-token error
    pub fn invalid_name(token: impl Into<String>) -> Self {
        Self::InvalidName(token.into())
    }

    /// Create a remote-command failure carrying captured output
    pub fn remote_failed(stdout: Vec<String>, stderr: Vec<String>) -> Self {
        Self::RemoteCommandFailed { stdout, stderr }
    }

    /// Create a transport-level error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
