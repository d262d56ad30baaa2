//! Authenticated remote cache demo - entry point overview.
//!
//! Two near-identical demo clients connect to a remote cache service with
//! PLAIN credentials, write one entry, read it back and verify it. The
//! role variant additionally reads the server-side cache statistics.
//! Denied operations are logged and absorbed; only setup failures abort.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin auth-client -- professor professor 11222
//! cargo run --bin role-client -- super super secured
//! ```

fn main() {
    println!("Authenticated remote cache demo");
    println!();
    println!("Use the following binaries:");
    println!("  cargo run --bin auth-client -- --help");
    println!("  cargo run --bin role-client -- --help");
}
