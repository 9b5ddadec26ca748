//! Configuration types
//!
//! Two pieces of configuration exist: the JSON object map the caller feeds
//! to the synchronizer, and the transport selection. Transport selection is
//! a configuration-time decision over a small closed set of variants; the
//! front-end matches on the variant once and constructs exactly one
//! concrete transport.

use crate::error::{Error, Result};
use crate::protocol::validate_token;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// JSON configuration mapping object name → hostnames:
///
/// ```json
/// {
///     "dynObj1": ["host1.example.com", "host2.example.com"],
///     "dynObj2": ["host1.example2.com"]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectMap {
    /// Object name → hostnames, in stable iteration order
    pub objects: BTreeMap<String, Vec<String>>,
}

impl ObjectMap {
    /// Load and validate an object map from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let map: Self = serde_json::from_str(&text)?;
        map.validate()?;
        Ok(map)
    }

    /// Check every object name against the token-safety pattern.
    pub fn validate(&self) -> Result<()> {
        for (name, hosts) in &self.objects {
            validate_token(name)?;
            if hosts.is_empty() {
                return Err(Error::config(format!(
                    "object {name:?} has no hostnames"
                )));
            }
        }
        Ok(())
    }
}

/// Transport selection and its per-scheme settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum TransportConfig {
    /// SSH session to the gateway
    Ssh {
        /// Gateway address
        gateway: String,
        /// Admin username
        user: String,
        /// Admin password, if password authentication is used
        password: Option<String>,
        /// Path to a private key file, if key authentication is used
        identity: Option<String>,
    },

    /// Vendor remote-exec utility (`cprid_util`), run from a management
    /// station
    Cprid {
        /// Gateway address
        gateway: String,
    },

    /// Local shell execution, for a tool running on the gateway itself
    Local,
}

impl TransportConfig {
    /// Scheme name, as accepted by [`TransportConfig::from_scheme`].
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Ssh { .. } => "ssh",
            Self::Cprid { .. } => "cprid",
            Self::Local => "local",
        }
    }

    /// Build a transport configuration from a scheme string and the shared
    /// option set. Unknown schemes fail with
    /// [`Error::UnsupportedTransport`]; schemes that reach the gateway over
    /// the network require `gateway`.
    pub fn from_scheme(
        scheme: &str,
        gateway: Option<&str>,
        user: &str,
        password: Option<&str>,
        identity: Option<&str>,
    ) -> Result<Self> {
        let require_gateway = || {
            gateway
                .map(str::to_owned)
                .ok_or_else(|| Error::config(format!("scheme {scheme:?} requires a gateway")))
        };

        match scheme {
            "ssh" => Ok(Self::Ssh {
                gateway: require_gateway()?,
                user: user.to_owned(),
                password: password.map(str::to_owned),
                identity: identity.map(str::to_owned),
            }),
            "cprid" => Ok(Self::Cprid { gateway: require_gateway()? }),
            "local" => Ok(Self::Local),
            other => Err(Error::UnsupportedTransport(other.to_owned())),
        }
    }
}
