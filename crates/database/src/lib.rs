use std::{error::Error, str::FromStr};

use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tours::database::Database;

pub mod data_model;
pub mod queries;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://tour_app.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct DatabaseConnectionInfo {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConnectionInfo {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Process wide handle to the sqlite pool. Cloning shares the pool.
#[derive(Clone)]
pub struct SqliteDatabase {
    connection: SqlitePool,
}

pub struct SqliteDatabaseAutocommit {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Opens (and if necessary creates) the database and applies all pending
    /// migrations.
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let options = SqliteConnectOptions::from_str(&database_connection_info.url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(database_connection_info.max_connections)
            .connect_with(options)
            .await?;

        Self::migrate(pool).await
    }

    /// A private database living as long as the returned handle. All queries
    /// share a single connection, since every sqlite memory connection is a
    /// database of its own.
    pub async fn in_memory() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let migrator = sqlx::migrate!("./migrations");
        migrator.run(&pool).await?;
        info!(
            "Database schema at version {}.",
            migrator
                .iter()
                .map(|migration| migration.version)
                .max()
                .unwrap_or_default()
        );

        Ok(Self { connection: pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.connection
    }
}

impl Database for SqliteDatabase {
    type Autocommit = SqliteDatabaseAutocommit;

    fn auto(&self) -> Self::Autocommit {
        SqliteDatabaseAutocommit {
            pool: self.connection.clone(),
        }
    }
}
