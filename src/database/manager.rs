use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::{error, info};

use crate::components::ComponentError;
use crate::config::DatabaseConfig;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unknown menu scope: {0}")]
    UnknownScope(String),

    #[error("Invalid scope key: {0}")]
    InvalidScopeKey(String),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error("Stored row is unreadable: {0}")]
    CorruptRow(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// Any other storage failure. `context` is the static summary shown to
    /// callers; `source` is only logged.
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DatabaseError {
    /// Build a `map_err` adapter that classifies and logs a sqlx error under a
    /// static summary such as "failed to create component".
    pub fn storage(context: &'static str) -> impl FnOnce(sqlx::Error) -> DatabaseError {
        move |source| Self::classify(context, source)
    }

    fn classify(context: &'static str, source: sqlx::Error) -> DatabaseError {
        if let sqlx::Error::RowNotFound = source {
            return DatabaseError::NotFound(context.to_string());
        }

        if let sqlx::Error::Database(db) = &source {
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    tracing::warn!("{}: unique constraint {:?} violated", context, db.constraint());
                    return DatabaseError::Conflict(format!("{}: entry already exists", context));
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    tracing::warn!("{}: foreign key {:?} violated", context, db.constraint());
                    return DatabaseError::Conflict(format!("{}: entry is still referenced", context));
                }
                _ => {}
            }
        }

        error!(error = %source, "{}", context);
        DatabaseError::Storage { context, source }
    }
}

/// Owns the process-wide connection pool. Cheap to clone.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Build the pool without connecting; the first query opens connections.
    /// Lets the API start (and report degraded health) while the database is down.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let options = Self::connect_options(config)?;
        let pool = Self::pool_options(config).connect_lazy_with(options);
        Ok(Self { pool })
    }

    /// Build the pool and open a first connection immediately
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let options = Self::connect_options(config)?;
        let pool = Self::pool_options(config)
            .connect_with(options)
            .await
            .map_err(DatabaseError::storage("failed to connect to database"))?;
        info!("Connected database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DatabaseError> {
        if config.url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }
        let options =
            PgConnectOptions::from_str(&config.url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        Ok(if config.enable_query_logging {
            options
        } else {
            options.disable_statement_logging()
        })
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DatabaseError> {
        self.pool
            .begin()
            .await
            .map_err(DatabaseError::storage("failed to start transaction"))
    }

    /// Pings the pool, giving up after `timeout`
    pub async fn health_check(&self, timeout: Duration) -> Result<(), DatabaseError> {
        let ping = sqlx::query("SELECT 1").execute(&self.pool);
        match tokio::time::timeout(timeout, ping).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(DatabaseError::Unavailable(e.to_string())),
            Err(_) => Err(DatabaseError::Unavailable(format!(
                "no response within {}ms",
                timeout.as_millis()
            ))),
        }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
