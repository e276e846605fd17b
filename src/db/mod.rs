use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;

mod clients;
mod phones;
pub(crate) mod query;
mod schema;

/// Shared connection pool for every repository operation
///
/// Acquired once per run and released with [`Database::close`].
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    ///
    /// A single connection attempt is made; failure surfaces as
    /// `RegistryError::Connectivity`.
    pub async fn new(config: &Config) -> Result<Self> {
        let options = config.connect_options()?;
        debug!(max_connections = config.max_connections, "connecting to database");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(self) {
        self.pool.close().await;
        debug!("database connection closed");
    }
}

/// Initialize the database connection pool
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;
    info!("database connection established");
    Ok(db)
}
