//! `feature-bridge` command line.
//!
//! ```text
//! feature-bridge inspect --url https://example.com/app/orders?id=7 \
//!     --app-path /app --header "Accept: text/html" --user alice
//! feature-bridge check-config bridge.toml
//! ```
//!
//! `inspect` builds an in-memory legacy request, hosts it, and prints the
//! resulting capability projection as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use url::Url;
use uuid::Uuid;

use feature_bridge::config::{load_config, BridgeConfig};
use feature_bridge::legacy::{GenericPrincipal, LegacyClientCertificate, MemoryContext};
use feature_bridge::observability::logging::init_logging;
use feature_bridge::RequestHost;

#[derive(Parser)]
#[command(name = "feature-bridge")]
#[command(about = "Inspect how a legacy request projects onto the capability registry", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the capability projection of a synthetic request
    Inspect(InspectArgs),
    /// Validate a configuration file
    CheckConfig {
        path: PathBuf,
    },
}

#[derive(clap::Args)]
struct InspectArgs {
    #[arg(long)]
    url: Url,

    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Application virtual path (path base).
    #[arg(long, default_value = "/")]
    app_path: String,

    /// Extra path info appended after the executed resource.
    #[arg(long, default_value = "")]
    path_info: String,

    /// Request header as "Name: value"; repeatable.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Server variable as NAME=VALUE; repeatable.
    #[arg(short = 'V', long = "server-variable", value_parser = parse_variable)]
    server_variables: Vec<(String, String)>,

    /// Client certificate file (PEM or DER).
    #[arg(long)]
    client_cert: Option<PathBuf>,

    /// Authenticated user name.
    #[arg(long)]
    user: Option<String>,

    #[arg(long, default_value = "Basic")]
    auth_type: String,

    /// Role of the user; repeatable.
    #[arg(long = "role")]
    roles: Vec<String>,

    /// Mark the request as coming from the local machine.
    #[arg(long)]
    local: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: value\", got {raw:?}"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn parse_variable(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))?;
    Ok((name.trim().to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Inspect(args) => inspect(config, args).await?,
        Commands::CheckConfig { path } => {
            let checked = load_config(&path)?;
            tracing::info!(path = %path.display(), "configuration is valid");
            println!("{}", toml::to_string_pretty(&checked)?);
        }
    }

    Ok(())
}

async fn inspect(config: BridgeConfig, args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = MemoryContext::builder()
        .method(args.method)
        .url(args.url)
        .app_virtual_path(args.app_path)
        .path_info(args.path_info)
        .local(args.local)
        .trace_identifier(Uuid::new_v4());

    for (name, value) in args.headers {
        builder = builder.header(name, value);
    }
    for (name, value) in &args.server_variables {
        builder = builder.server_variable(name, value.clone());
    }
    if let Some(path) = &args.client_cert {
        let raw = tokio::fs::read(path).await?;
        builder = builder.client_certificate(LegacyClientCertificate::present(raw));
    }
    if let Some(name) = args.user {
        let principal = GenericPrincipal::new(name, args.auth_type).with_roles(args.roles);
        builder = builder.user(Arc::new(principal));
    }

    let host = RequestHost::new(config);
    let snapshot = host.process(Arc::new(builder.build()), |context| context.snapshot());

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
