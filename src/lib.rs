pub mod client;
pub mod config;
pub mod demo;
pub mod error;
pub mod logging;

// Re-export generated protobuf types
pub mod pb {
    tonic::include_proto!("remote_cache");
}

pub use client::{CacheClient, RemoteCache};
pub use config::{ClientConfig, SaslMechanism};
pub use error::{OpError, SetupError};
