// # dynobjctl
//
// Maps domain names onto gateway dynamic objects: reads a JSON file of
// `object name -> hostnames`, resolves the hostnames, and reconciles each
// object on the gateway to exactly the resolved address set.
//
// This binary is a thin integration layer: argument parsing, transport
// construction, and hostname resolution. All object and protocol logic
// lives in dynobj-core.
//
// ## Example
//
// ```bash
// dynobjctl -f objects.json -s ssh -g 192.168.133.99 -u admin -p -
// dynobjctl -f objects.json -s cprid -g 192.168.133.99
// dynobjctl -f objects.json -s local
// ```

mod resolver;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dynobj_core::{AddrSpec, DynObjEngine, ObjectMap, Transport, TransportConfig};
use dynobj_transport_cprid::CpridTransport;
use dynobj_transport_local::LocalTransport;
use dynobj_transport_ssh::{SshAuth, SshTransport};
use resolver::Resolver;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Remote-execution scheme.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scheme {
    /// SSH session to the gateway
    Ssh,
    /// Vendor remote-exec utility from a management station
    Cprid,
    /// Local shell, when running on the gateway itself
    Local,
}

impl Scheme {
    fn as_str(self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Cprid => "cprid",
            Self::Local => "local",
        }
    }
}

/// Manage gateway dynamic objects mapped to domain names.
#[derive(Debug, Parser)]
#[command(name = "dynobjctl", version, about)]
struct Cli {
    /// Read the object-to-hostnames map from FILE (JSON)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: PathBuf,

    /// Method of remote execution
    #[arg(short = 's', long = "scheme", value_enum)]
    scheme: Scheme,

    /// Gateway address (required for ssh and cprid)
    #[arg(short = 'g', long = "gateway")]
    gateway: Option<String>,

    /// Admin username
    #[arg(short = 'u', long = "user", default_value = "admin")]
    user: String,

    /// Admin password; use '-' to read it from the console
    #[arg(short = 'p', long = "password")]
    password: Option<String>,

    /// Admin private key file
    #[arg(short = 'i', long = "identity", value_name = "KEYFILE")]
    identity: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let password = match cli.password.as_deref() {
        Some("-") => Some(
            rpassword::prompt_password("Password: ").context("reading password from console")?,
        ),
        other => other.map(str::to_owned),
    };

    let config = TransportConfig::from_scheme(
        cli.scheme.as_str(),
        cli.gateway.as_deref(),
        &cli.user,
        password.as_deref(),
        cli.identity.as_deref().and_then(Path::to_str),
    )?;

    let objects = ObjectMap::load(&cli.file)
        .with_context(|| format!("loading object map from {}", cli.file.display()))?;
    info!(objects = objects.objects.len(), scheme = config.scheme(), "starting sync");

    let transport = build_transport(config).await?;
    let engine = DynObjEngine::new(transport);
    let mut resolver = Resolver::new();

    for (name, hosts) in &objects.objects {
        let addrs = resolver.resolve_all(hosts).await?;
        let specs: Vec<AddrSpec> =
            addrs.iter().map(|addr| AddrSpec::Single(u32::from(*addr))).collect();

        engine
            .set_addresses(name, &specs)
            .await
            .with_context(|| format!("synchronizing object {name:?}"))?;

        let ranges = engine.get_object(name).await?;
        let rendered: Vec<String> = ranges.iter().map(ToString::to_string).collect();
        info!(object = %name, ranges = ?rendered, "object synchronized");
    }

    Ok(())
}

/// One concrete transport per configuration variant; the selection happens
/// here, once, at startup.
async fn build_transport(config: TransportConfig) -> Result<Box<dyn Transport>> {
    match config {
        TransportConfig::Ssh { gateway, user, password, identity } => {
            // session setup is blocking (ssh2)
            let transport = tokio::task::spawn_blocking(move || {
                let auth = SshAuth::from_options(
                    password.as_deref(),
                    identity.as_deref().map(Path::new),
                );
                SshTransport::connect(&gateway, &user, &auth)
            })
            .await
            .context("SSH connect task failed")??;
            Ok(Box::new(transport))
        }
        TransportConfig::Cprid { gateway } => Ok(Box::new(CpridTransport::new(gateway)?)),
        TransportConfig::Local => Ok(Box::new(LocalTransport::new())),
    }
}
