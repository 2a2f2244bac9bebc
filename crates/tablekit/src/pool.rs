//! Connection pool utilities

use crate::config::ConnectOptions;
use crate::error::{TableError, TableResult};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, PoolBuilder, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool with small default settings.
///
/// Pooled connections implement [`Gateway`](crate::Gateway), so a checked-out
/// connection can back any number of tables:
///
/// ```ignore
/// let pool = tablekit::create_pool(&ConnectOptions::from_env()?)?;
/// let conn = tablekit::checkout(&pool).await?;
/// let people = Table::attach(&conn, "People", fields).await?;
/// ```
pub fn create_pool(options: &ConnectOptions) -> TableResult<Pool> {
    create_pool_with_config(options, 16)
}

/// Create a connection pool holding at most `max_size` connections.
pub fn create_pool_with_config(options: &ConnectOptions, max_size: usize) -> TableResult<Pool> {
    create_pool_with_builder(options, |builder| builder.max_size(max_size))
}

/// Create a connection pool, letting the caller tune the `PoolBuilder`.
pub fn create_pool_with_builder(
    options: &ConnectOptions,
    configure_pool: impl FnOnce(PoolBuilder) -> PoolBuilder,
) -> TableResult<Pool> {
    let manager = Manager::from_config(options.to_pg_config(), NoTls, default_manager_config());
    configure_pool(Pool::builder(manager))
        .build()
        .map_err(|e| TableError::Connect(e.to_string()))
}

/// Take a connection from the pool.
pub async fn checkout(pool: &Pool) -> TableResult<Object> {
    pool.get().await.map_err(|e| TableError::Connect(e.to_string()))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}
