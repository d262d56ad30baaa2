//! Scripted demo operations shared by the two client binaries.
//!
//! Every operation absorbs authorization and transport failures: the
//! failure is logged and reported through [`Outcome`], and the scripted
//! sequence keeps going. Only setup failures abort the process.

use crate::client::RemoteCache;
use crate::error::OpError;

/// Result of one scripted operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The server performed the operation.
    Completed(T),
    /// The server refused the operation for this principal.
    Denied,
    /// Transport-level failure, including a released connection.
    Failed,
}

/// What `get_and_verify` found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    /// Stored value equals the expected one.
    Ok,
    /// No entry under the key.
    Missing,
    /// An entry exists but differs from the expected value.
    Mismatch { actual: String },
}

/// Write one entry, logging the result instead of raising.
pub async fn put_entry(cache: &RemoteCache<'_>, key: &str, value: &str) -> Outcome<()> {
    tracing::info!("Inserting data into cache: {key} {value}");
    match cache.put(key, value).await {
        Ok(()) => Outcome::Completed(()),
        Err(err) => absorb(&err, cache, "write entries to"),
    }
}

/// Read an entry back and compare it to the expected value.
pub async fn get_and_verify(
    cache: &RemoteCache<'_>,
    key: &str,
    expected: &str,
) -> Outcome<Verification> {
    tracing::info!("Verifying data...");
    tracing::info!("verify key {key}");
    match cache.get(key).await {
        Ok(None) => {
            tracing::info!("No value found!");
            Outcome::Completed(Verification::Missing)
        }
        Ok(Some(value)) if value != expected => {
            tracing::info!("Value '{value}' differs from '{expected}'");
            Outcome::Completed(Verification::Mismatch { actual: value })
        }
        Ok(Some(_)) => {
            tracing::info!("ok");
            Outcome::Completed(Verification::Ok)
        }
        Err(err) => absorb(&err, cache, "read entries from"),
    }
}

/// Fetch and log the server-side statistics for the cache.
pub async fn monitor(cache: &RemoteCache<'_>) -> Outcome<String> {
    tracing::info!("Reading statistics for cache '{}'", cache.name());
    match cache.server_statistics().await {
        Ok(stats) => {
            let line = serde_json::to_string(&stats).unwrap_or_else(|_| format!("{stats:?}"));
            tracing::info!("Server statistics: {line}");
            Outcome::Completed(line)
        }
        Err(err) => absorb(&err, cache, "access statistics for"),
    }
}

/// Soft-fail policy: warn with the underlying message, then an info line
/// naming the user, the refused action and the cache.
fn absorb<T>(err: &OpError, cache: &RemoteCache<'_>, action: &str) -> Outcome<T> {
    tracing::warn!("{err}");
    if err.is_denied() {
        tracing::info!(
            "User '{}' is not allowed to {action} cache '{}'!",
            cache.username(),
            cache.name()
        );
        Outcome::Denied
    } else {
        tracing::info!("Operation on cache '{}' failed, continuing", cache.name());
        Outcome::Failed
    }
}
