//! Basic authenticated cache demo against the fixed demo cache.
//!
//! Run with: cargo run --bin auth-client -- professor professor 11222

use anyhow::Result;
use clap::Parser;
use kv_auth_poc::logging::{self, LogConfig};
use kv_auth_poc::{demo, CacheClient, ClientConfig};
use std::path::PathBuf;

const CACHE_NAME: &str = "futurama";

#[derive(Parser, Debug)]
#[command(name = "auth-client")]
#[command(about = "Authenticated cache demo: put one entry and verify it")]
struct Args {
    /// Username for the PLAIN handshake
    #[arg(default_value = "professor")]
    username: String,

    /// Password; defaults to the username when omitted
    password: Option<String>,

    /// Cache service port
    #[arg(default_value_t = 11222)]
    port: u16,

    /// Cache service host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Verbosity code, one decimal digit per subsystem
    #[arg(long, default_value_t = 2229)]
    log_code: u32,

    /// Duplicate log output into this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(&LogConfig {
        level_code: args.log_code,
        console: true,
        file: args.log_file.clone(),
    })?;

    let password = args
        .password
        .clone()
        .unwrap_or_else(|| args.username.clone());
    let config = ClientConfig::default()
        .with_server(&args.host, args.port)
        .with_credentials(&args.username, &password);

    let client = CacheClient::new(config);
    client.connect().await?;

    let cache = client.cache(CACHE_NAME);
    demo::put_entry(&cache, "test1", "value1").await;
    demo::get_and_verify(&cache, "test1", "value1").await;

    client.stop();
    tracing::info!("Done!");
    Ok(())
}
