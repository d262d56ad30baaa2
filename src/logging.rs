//! Process-wide logging bootstrap.
//!
//! One integer verbosity code configures four subsystems at once: each
//! decimal digit (units, tens, hundreds, thousands) indexes a fixed table
//! of level filters for one subsystem. Initialization happens exactly once,
//! before any cache work; a second call is an error.

use crate::error::SetupError;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Digit value -> level filter. The verbose tail collapses: the ten-step
/// scale maps onto five tracing levels.
pub const LEVELS: [LevelFilter; 10] = [
    LevelFilter::ERROR,
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
    LevelFilter::DEBUG,
    LevelFilter::TRACE,
    LevelFilter::TRACE,
    LevelFilter::TRACE,
    LevelFilter::TRACE,
    LevelFilter::TRACE,
];

/// Subsystems addressed by the verbosity code, least significant digit
/// first.
const SUBSYSTEMS: [&str; 4] = [
    "kv_auth_poc",         // xxx? demo crate
    "kv_auth_poc::client", // xx?x client messages
    "tonic",               // x?xx RPC library
    "h2",                  // ?xxx connection transport
];

/// Logging bootstrap parameters.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Verbosity code, one decimal digit per subsystem
    pub level_code: u32,
    /// Emit to stderr
    pub console: bool,
    /// Duplicate (or, with console off, redirect) output into this file
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_code: 2229,
            console: true,
            file: None,
        }
    }
}

/// Decode a verbosity code into the four subsystem level filters, least
/// significant digit first. Digits beyond the thousands place are ignored.
pub fn decode(level_code: u32) -> [LevelFilter; 4] {
    let mut levels = [LevelFilter::OFF; 4];
    for (place, slot) in levels.iter_mut().enumerate() {
        let digit = (level_code / 10u32.pow(place as u32)) % 10;
        *slot = LEVELS[digit as usize];
    }
    levels
}

/// Filter directives for a verbosity code. Targets outside the four
/// subsystems default to `info`.
fn directives(level_code: u32) -> String {
    let levels = decode(level_code);
    let mut spec = String::from("info");
    for (target, level) in SUBSYSTEMS.iter().zip(levels) {
        spec.push_str(&format!(",{target}={level}"));
    }
    spec
}

/// Install the process-wide subscriber: single-line format with timestamp,
/// level, thread id and target. `RUST_LOG`, when set, overrides the decoded
/// directives.
pub fn init(config: &LogConfig) -> Result<(), SetupError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(config.level_code)));

    let console_layer = config.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_ids(true)
    });

    let file_layer = match &config.file {
        Some(path) => {
            let file = File::create(path).map_err(|e| SetupError::Logging(e.to_string()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_thread_ids(true)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SetupError::Logging(e.to_string()))
}
