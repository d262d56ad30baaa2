//! Remote cache client: a managed connection plus named cache handles.
//!
//! The client opens one channel, authenticates with the PLAIN credentials
//! from its configuration, and hands out [`RemoteCache`] handles bound to
//! that connection. Credentials travel as call metadata on every request.

use crate::config::ClientConfig;
use crate::error::{OpError, SetupError};
use crate::pb::remote_cache_service_client::RemoteCacheServiceClient;
use crate::pb::{AuthRequest, GetRequest, PutRequest, StatsRequest};
use parking_lot::Mutex;
use secrecy::ExposeSecret;
use std::collections::BTreeMap;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::interceptor::InterceptedService;
use tonic::service::Interceptor;
use tonic::transport::Channel;
use tonic::{Request, Status};

fn ascii_value(raw: &str) -> Result<MetadataValue<Ascii>, SetupError> {
    raw.parse()
        .map_err(|e: tonic::metadata::errors::InvalidMetadataValue| {
            SetupError::InvalidCredentials(e.to_string())
        })
}

/// Attaches the PLAIN credentials to every outgoing request.
#[derive(Clone)]
struct AuthInterceptor {
    username: MetadataValue<Ascii>,
    password: MetadataValue<Ascii>,
    mechanism: MetadataValue<Ascii>,
}

impl AuthInterceptor {
    fn new(config: &ClientConfig) -> Result<Self, SetupError> {
        Ok(Self {
            username: ascii_value(&config.username)?,
            password: ascii_value(config.password.expose_secret())?,
            mechanism: ascii_value(config.mechanism.as_str())?,
        })
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let metadata = request.metadata_mut();
        metadata.insert("x-auth-username", self.username.clone());
        metadata.insert("x-auth-password", self.password.clone());
        metadata.insert("x-auth-mechanism", self.mechanism.clone());
        Ok(request)
    }
}

type AuthedGrpc = RemoteCacheServiceClient<InterceptedService<Channel, AuthInterceptor>>;

/// Managed connection to the remote cache service.
///
/// Lifecycle: unconnected after [`new`](Self::new), connected after a
/// successful [`connect`](Self::connect), stopped after [`stop`](Self::stop).
/// There is no way back from stopped.
pub struct CacheClient {
    config: ClientConfig,
    grpc: Mutex<Option<AuthedGrpc>>,
}

impl CacheClient {
    /// Create an unconnected client for the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            grpc: Mutex::new(None),
        }
    }

    /// Open the channel and run the authentication handshake.
    ///
    /// Every failure here is fatal: malformed endpoint, unreachable host,
    /// rejected credentials.
    pub async fn connect(&self) -> Result<(), SetupError> {
        tracing::info!("Connecting to cache service at {}", self.config.endpoint());

        let channel = Channel::from_shared(self.config.endpoint())
            .map_err(|e| SetupError::InvalidEndpoint(e.to_string()))?
            .connect()
            .await?;

        let interceptor = AuthInterceptor::new(&self.config)?;
        let mut grpc = RemoteCacheServiceClient::with_interceptor(channel, interceptor);

        let response = grpc
            .authenticate(AuthRequest {
                mechanism: self.config.mechanism.as_str().to_string(),
            })
            .await
            .map_err(|status| SetupError::Authentication {
                user: self.config.username.clone(),
                message: status.message().to_string(),
            })?
            .into_inner();

        tracing::info!(
            "Authenticated as '{}' with roles {:?}",
            response.principal,
            response.roles
        );

        *self.grpc.lock() = Some(grpc);
        Ok(())
    }

    /// Handle to one named cache on this connection.
    pub fn cache<'a>(&'a self, name: &str) -> RemoteCache<'a> {
        RemoteCache {
            client: self,
            name: name.to_string(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.grpc.lock().is_some()
    }

    pub fn username(&self) -> &str {
        &self.config.username
    }

    /// Release the connection. Safe to call more than once; operations
    /// after the first call fail with [`OpError::NotConnected`].
    pub fn stop(&self) {
        if self.grpc.lock().take().is_some() {
            tracing::info!("Cache connection released");
        }
    }

    fn grpc(&self) -> Result<AuthedGrpc, OpError> {
        self.grpc.lock().clone().ok_or(OpError::NotConnected)
    }
}

/// A named cache bound to one open connection. Entries are string pairs.
pub struct RemoteCache<'a> {
    client: &'a CacheClient,
    name: String,
}

impl RemoteCache<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn username(&self) -> &str {
        self.client.username()
    }

    /// Write one entry.
    pub async fn put(&self, key: &str, value: &str) -> Result<(), OpError> {
        let mut attempt = 0;
        loop {
            let mut grpc = self.client.grpc()?;
            let request = PutRequest {
                cache: self.name.clone(),
                key: key.to_string(),
                value: value.to_string(),
            };
            match grpc.put(request).await {
                Ok(_) => return Ok(()),
                Err(status) => self.retry_or_fail(status, &mut attempt)?,
            }
        }
    }

    /// Read one entry. `Ok(None)` when the key is absent.
    pub async fn get(&self, key: &str) -> Result<Option<String>, OpError> {
        let mut attempt = 0;
        loop {
            let mut grpc = self.client.grpc()?;
            let request = GetRequest {
                cache: self.name.clone(),
                key: key.to_string(),
            };
            match grpc.get(request).await {
                Ok(response) => {
                    let response = response.into_inner();
                    return Ok(response.found.then_some(response.value));
                }
                Err(status) => self.retry_or_fail(status, &mut attempt)?,
            }
        }
    }

    /// Aggregate server-side statistics for this cache, sorted by key.
    pub async fn server_statistics(&self) -> Result<BTreeMap<String, String>, OpError> {
        let mut attempt = 0;
        loop {
            let mut grpc = self.client.grpc()?;
            let request = StatsRequest {
                cache: self.name.clone(),
            };
            match grpc.stats(request).await {
                Ok(response) => return Ok(response.into_inner().stats.into_iter().collect()),
                Err(status) => self.retry_or_fail(status, &mut attempt)?,
            }
        }
    }

    /// `Ok(())` means retry; anything else is the final error. Denials are
    /// never retried.
    fn retry_or_fail(&self, status: Status, attempt: &mut u32) -> Result<(), OpError> {
        let err = OpError::from(status);
        if err.is_retryable() && *attempt < self.client.config.max_retries {
            *attempt += 1;
            tracing::debug!("Retrying after transport failure (attempt {attempt}): {err}");
            Ok(())
        } else {
            Err(err)
        }
    }
}
