//! Client configuration for the authenticated cache demo.

use crate::error::SetupError;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;

/// Authentication mechanism negotiated with the cache service.
///
/// Only the PLAIN username/password handshake is supported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum SaslMechanism {
    #[default]
    #[serde(rename = "PLAIN")]
    Plain,
}

impl SaslMechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaslMechanism::Plain => "PLAIN",
        }
    }
}

/// Connection configuration, built once per program run.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Cache service host
    pub host: String,
    /// Cache service port
    pub port: u16,
    /// Principal name for the PLAIN handshake
    pub username: String,
    /// Credential; redacted from Debug output and never serialized
    pub password: SecretString,
    /// Authentication mechanism
    pub mechanism: SaslMechanism,
    /// Operation retries on transport errors (0 = fail fast)
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11222,
            username: "professor".to_string(),
            password: SecretString::new("professor".to_string()),
            mechanism: SaslMechanism::Plain,
            max_retries: 0,
        }
    }
}

impl ClientConfig {
    pub fn with_server(mut self, host: &str, port: u16) -> Self {
        self.host = host.to_string();
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = SecretString::new(password.to_string());
        self
    }

    pub fn with_max_retries(mut self, count: u32) -> Self {
        self.max_retries = count;
        self
    }

    /// gRPC endpoint URI for the configured server
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Load a configuration from a JSON file. Missing fields fall back to
    /// the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SetupError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SetupError::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }
}
