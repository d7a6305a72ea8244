use std::time::Duration;

use sqlx::{
    Connection, Error, Pool, Postgres,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tracing::debug;

use crate::config::DatabaseConfig;

/// Create a PostgreSQL connection pool
///
/// # Parameters
/// - `database`: user, password, database name, host and port of the store
/// - `max_connections`: upper bound on concurrently open connections
/// - `acquire_timeout`: how long a caller waits for a free connection once
///   the pool is exhausted before the acquire fails
pub async fn get_connection(
    database: &DatabaseConfig,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<Pool<Postgres>, Error> {
    let options = PgConnectOptions::new()
        .host(&database.host)
        .port(database.port)
        .username(&database.user)
        .password(&database.password)
        .database(&database.name);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await
}

/// Check that the store is reachable through the pool.
pub async fn ping(pool: &Pool<Postgres>) -> Result<(), Error> {
    let mut conn = pool.acquire().await?;
    conn.ping().await?;
    debug!("Database ping succeeded");
    Ok(())
}
