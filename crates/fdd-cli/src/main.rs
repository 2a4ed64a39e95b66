//! # fdd
//!
//! Command-line front end for the FDD signing client.
//!
//! Credentials come from a JSON config file, the environment, or flags (flags
//! win). Signing is local; only `call` and `three-element` touch the network.
//!
//! # Usage
//!
//! ```bash
//! fdd --config fdd.json endpoints
//! fdd --config fdd.json sign view_contract contract_id=CT1
//! fdd --config fdd.json call contract_status contract_id=CT1
//! fdd --config fdd.json verify notify.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use fdd_api::endpoint::Delivery;
use fdd_api::{ENDPOINTS, FddClient, WireValue};
use fdd_core::config::{FddConfig, load_config};
use fdd_core::{BusinessParams, Timestamp};
use serde_json::{Map, Value};
use tracing::{info, warn};

/// FDD e-contract API signing client.
#[derive(Parser)]
#[command(name = "fdd", about = "FDD e-contract API signing client")]
struct Cli {
    /// Configuration file path (JSON).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Application identifier.
    #[arg(long, env = "FDD_APP_ID", global = true)]
    app_id: Option<String>,

    /// Shared application secret.
    #[arg(long, env = "FDD_APP_SECRET", global = true, hide_env_values = true)]
    app_secret: Option<String>,

    /// Base URL prepended to endpoint paths.
    #[arg(long, env = "FDD_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Fixed outbound timestamp (yyyyMMddHHmmss) instead of the current time.
    #[arg(long, global = true)]
    timestamp: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Optional log directory for file output.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the endpoint catalogue.
    Endpoints,

    /// Sign a request and print it without sending.
    Sign {
        endpoint: String,
        /// Business parameters as key=value.
        params: Vec<String>,
    },

    /// Sign and dispatch a request, printing the response.
    Call {
        endpoint: String,
        /// Business parameters as key=value; image and file fields take a path.
        params: Vec<String>,
    },

    /// Three-element (name, ID card, mobile) identity check.
    ThreeElement {
        #[arg(long)]
        name: String,
        #[arg(long)]
        id_card: String,
        #[arg(long)]
        mobile: String,
    },

    /// Verify the signature of an inbound JSON payload.
    Verify {
        payload: PathBuf,
        /// Treat the payload as a signing callback (`msg_digest`).
        #[arg(long)]
        callback: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    fdd_core::logging::init_logging(&cli.log_level, cli.log_dir.as_deref(), "fdd");

    if let Command::Endpoints = cli.command {
        print_endpoints();
        return Ok(());
    }

    let client = build_client(&cli)?;

    match cli.command {
        Command::Endpoints => {}
        Command::Sign { endpoint, params } => {
            let request = client.sign(&endpoint, parse_params(&params)?)?;
            if request.delivery() == Delivery::Redirect {
                println!("{}", request.redirect_url());
            } else {
                let fields: Map<String, Value> = request
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), wire_json(v)))
                    .collect();
                let signed = serde_json::json!({
                    "method": request.delivery().as_str(),
                    "url": request.url,
                    "fields": fields,
                });
                println!("{}", serde_json::to_string_pretty(&signed)?);
            }
        }
        Command::Call { endpoint, params } => {
            let response = client.call(&endpoint, parse_params(&params)?).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::ThreeElement { name, id_card, mobile } => {
            let response = client.three_element_verify_mobile(&name, &id_card, &mobile).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Verify { payload, callback } => {
            let payload = read_payload(&payload)?;
            let valid = if callback {
                client.verify_callback_signature(&payload)
            } else {
                client.verify_inbound_signature(&payload)
            };
            if !valid {
                warn!("signature mismatch");
                println!("invalid");
                std::process::exit(1);
            }
            println!("valid");
        }
    }
    Ok(())
}

fn build_client(cli: &Cli) -> Result<FddClient> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FddConfig::default(),
    }
    .with_overrides(cli.app_id.clone(), cli.app_secret.clone(), cli.base_url.clone());

    let mut client = FddClient::new(&config)?;
    if let Some(ts) = &cli.timestamp {
        let ts = Timestamp::from_raw(ts.as_str());
        if !ts.is_well_formed() {
            warn!(timestamp = %ts, "timestamp is not yyyyMMddHHmmss");
        }
        client = client.with_timestamp(ts);
    }
    info!(base_url = %config.base_url, timestamp = %client.timestamp(), "client ready");
    Ok(client)
}

fn print_endpoints() {
    for endpoint in ENDPOINTS {
        println!(
            "{:<32} {:<9} {:<18} {}",
            endpoint.name,
            endpoint.delivery.as_str(),
            endpoint.scheme().as_str(),
            endpoint.path,
        );
    }
}

/// `key=value` arguments into business parameters. Values may contain `=`.
fn parse_params(args: &[String]) -> Result<BusinessParams> {
    let mut params = BusinessParams::new();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            bail!("expected key=value, got '{arg}'");
        };
        if key.is_empty() {
            bail!("empty parameter name in '{arg}'");
        }
        params.insert(key, value);
    }
    Ok(params)
}

fn read_payload(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload {}", path.display()))?;
    match serde_json::from_str::<Value>(&content)
        .with_context(|| format!("failed to parse payload {}", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => bail!("payload {} is not a JSON object", path.display()),
    }
}

fn wire_json(value: &WireValue) -> Value {
    match value {
        WireValue::Text(text) => Value::String(text.clone()),
        WireValue::File(path) => Value::String(format!("@{}", path.display())),
    }
}
