//! In-process stub of the remote cache service, used only by the
//! integration tests. It implements the crate's gRPC contract with a fixed
//! principal/role table so authorization outcomes are deterministic. The
//! real cache cluster stays external.

use dashmap::DashMap;
use kv_auth_poc::pb::remote_cache_service_server::{RemoteCacheService, RemoteCacheServiceServer};
use kv_auth_poc::pb::{
    AuthRequest, AuthResponse, GetRequest, GetResponse, PutRequest, PutResponse, StatsRequest,
    StatsResponse,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tonic::{Request, Response, Status};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Permission {
    Read,
    Write,
    Stats,
}

struct Principal {
    name: &'static str,
    password: &'static str,
    permissions: &'static [Permission],
}

/// Fixture principals, password equal to the username: an admin, a writer
/// and a read-only user.
const PRINCIPALS: &[Principal] = &[
    Principal {
        name: "super",
        password: "super",
        permissions: &[Permission::Read, Permission::Write, Permission::Stats],
    },
    Principal {
        name: "professor",
        password: "professor",
        permissions: &[Permission::Read, Permission::Write],
    },
    Principal {
        name: "fry",
        password: "fry",
        permissions: &[Permission::Read],
    },
];

struct StubCacheService {
    /// (cache, key) -> value
    entries: DashMap<(String, String), String>,
    stores: AtomicU64,
    retrievals: AtomicU64,
}

impl StubCacheService {
    fn new() -> Self {
        Self {
            entries: DashMap::new(),
            stores: AtomicU64::new(0),
            retrievals: AtomicU64::new(0),
        }
    }

    fn principal_of<T>(&self, request: &Request<T>) -> Result<&'static Principal, Status> {
        let metadata = request.metadata();
        let field = |key: &str| {
            metadata
                .get(key)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| Status::unauthenticated("missing credentials"))
        };
        let username = field("x-auth-username")?;
        let password = field("x-auth-password")?;
        PRINCIPALS
            .iter()
            .find(|p| p.name == username && p.password == password)
            .ok_or_else(|| {
                Status::unauthenticated(format!("authentication failed for user '{username}'"))
            })
    }

    fn check<T>(
        &self,
        request: &Request<T>,
        needed: Permission,
        cache: &str,
    ) -> Result<&'static Principal, Status> {
        let principal = self.principal_of(request)?;
        if principal.permissions.contains(&needed) {
            Ok(principal)
        } else {
            Err(Status::permission_denied(format!(
                "Unauthorized access: user '{}' lacks {:?} permission on cache '{}'",
                principal.name, needed, cache
            )))
        }
    }
}

#[tonic::async_trait]
impl RemoteCacheService for StubCacheService {
    async fn authenticate(
        &self,
        request: Request<AuthRequest>,
    ) -> Result<Response<AuthResponse>, Status> {
        if request.get_ref().mechanism != "PLAIN" {
            return Err(Status::unimplemented("only the PLAIN mechanism is supported"));
        }
        let principal = self.principal_of(&request)?;
        Ok(Response::new(AuthResponse {
            principal: principal.name.to_string(),
            roles: principal.permissions.iter().map(|p| format!("{p:?}")).collect(),
        }))
    }

    async fn put(&self, request: Request<PutRequest>) -> Result<Response<PutResponse>, Status> {
        let cache = request.get_ref().cache.clone();
        self.check(&request, Permission::Write, &cache)?;
        let req = request.into_inner();
        self.entries.insert((req.cache, req.key), req.value);
        self.stores.fetch_add(1, Ordering::Relaxed);
        Ok(Response::new(PutResponse {}))
    }

    async fn get(&self, request: Request<GetRequest>) -> Result<Response<GetResponse>, Status> {
        let cache = request.get_ref().cache.clone();
        self.check(&request, Permission::Read, &cache)?;
        let req = request.into_inner();
        self.retrievals.fetch_add(1, Ordering::Relaxed);
        match self.entries.get(&(req.cache, req.key)) {
            Some(value) => Ok(Response::new(GetResponse {
                found: true,
                value: value.clone(),
            })),
            None => Ok(Response::new(GetResponse {
                found: false,
                value: String::new(),
            })),
        }
    }

    async fn stats(
        &self,
        request: Request<StatsRequest>,
    ) -> Result<Response<StatsResponse>, Status> {
        let cache = request.get_ref().cache.clone();
        self.check(&request, Permission::Stats, &cache)?;
        let entries = self.entries.iter().filter(|e| e.key().0 == cache).count();
        let mut stats = HashMap::new();
        stats.insert("approximate_entries".to_string(), entries.to_string());
        stats.insert(
            "stores".to_string(),
            self.stores.load(Ordering::Relaxed).to_string(),
        );
        stats.insert(
            "retrievals".to_string(),
            self.retrievals.load(Ordering::Relaxed).to_string(),
        );
        Ok(Response::new(StatsResponse { stats }))
    }
}

/// Running stub service bound to an ephemeral port.
pub struct StubCluster {
    port: u16,
    handle: JoinHandle<()>,
}

impl StubCluster {
    /// Start the stub on a free local port.
    pub async fn start() -> Self {
        let port = find_available_port();
        let addr = format!("127.0.0.1:{port}").parse().unwrap();
        let service = RemoteCacheServiceServer::new(StubCacheService::new());

        let handle = tokio::spawn(async move {
            tonic::transport::Server::builder()
                .add_service(service)
                .serve(addr)
                .await
                .unwrap();
        });

        // Wait for the listener to come up
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self { port, handle }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

/// Find an available port for testing
fn find_available_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
