//! Role-mapped cache demo: put, verify, then read the cache statistics.
//!
//! Run with: cargo run --bin role-client -- super super secured

use anyhow::Result;
use clap::Parser;
use kv_auth_poc::logging::{self, LogConfig};
use kv_auth_poc::{demo, CacheClient, ClientConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "role-client")]
#[command(about = "Role-based cache demo: put, verify and read cache statistics")]
struct Args {
    /// Username for the PLAIN handshake
    #[arg(default_value = "super")]
    username: String,

    /// Password; defaults to the username when omitted
    password: Option<String>,

    /// Cache to operate on
    #[arg(default_value = "secured")]
    cache: String,

    /// Cache service host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Cache service port
    #[arg(long, default_value_t = 11222)]
    port: u16,

    /// JSON file with a base client configuration; the positional
    /// credentials and --host/--port still take precedence
    #[arg(long)]
    config: Option<PathBuf>,

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

    let base = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    let password = args
        .password
        .clone()
        .unwrap_or_else(|| args.username.clone());
    let config = base
        .with_server(&args.host, args.port)
        .with_credentials(&args.username, &password);

    let client = CacheClient::new(config);
    client.connect().await?;

    let cache = client.cache(&args.cache);
    demo::put_entry(&cache, "test1", "value1").await;
    demo::get_and_verify(&cache, "test1", "value1").await;
    demo::monitor(&cache).await;

    client.stop();
    tracing::info!("Done!");
    Ok(())
}
