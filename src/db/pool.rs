//! Connection pooling.
//!
//! The core runs each logical request over one connection; callers that
//! want to run independent requests (or expand sub-queries) concurrently
//! need a pool instead of a shared client, since the wire protocol does not
//! interleave.

use anyhow::{Context, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

use super::connection::{build_tls_connector, ConnectionConfig, SslMode};

/// Build a deadpool-backed pool from a connection config.
pub fn build_pool(config: &ConnectionConfig, max_size: usize) -> Result<Pool> {
    let pg_config: tokio_postgres::Config = config
        .connection_string()
        .parse()
        .context("Invalid connection configuration")?;

    let mut manager_config = ManagerConfig::default();
    manager_config.recycling_method = RecyclingMethod::Fast;

    let manager = match config.ssl_mode {
        SslMode::Disable => Manager::from_config(pg_config, NoTls, manager_config),
        mode => {
            let strict = matches!(mode, SslMode::VerifyCa | SslMode::VerifyFull);
            let tls = build_tls_connector(config, strict)?;
            Manager::from_config(pg_config, tls, manager_config)
        }
    };

    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .context("Failed to build connection pool")
}
