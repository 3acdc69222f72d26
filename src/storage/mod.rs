use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};

use crate::config::StoreConfig;

/// Errors returned by the storage gateway.
///
/// `Unavailable` and `Timeout` mean the store could not be reached or did not
/// answer in time; `Query` means it answered with an error. All three surface
/// as HTTP 500 at the handler boundary.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database connection failed")]
    Unavailable(#[source] sqlx::Error),
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
    #[error("store operation timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// A persisted task, as returned by `list_tasks`.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// A freshly inserted task. `created_at` is assigned by the store and only
/// materialized on the next `list_tasks`; the insert itself stays a single
/// statement.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NewTask {
    pub id: i64,
    pub title: String,
}

/// Storage gateway for the tasks table.
///
/// Holds connection options only. Every call opens a fresh connection,
/// performs exactly one parameterized statement, and releases the connection
/// on every exit path (explicit `close()` on success sends a clean quit;
/// dropping the connection on failure closes the socket).
#[derive(Clone)]
pub struct Storage {
    opts: MySqlConnectOptions,
    query_timeout: Duration,
}

impl Storage {
    pub fn new(cfg: &StoreConfig, query_timeout: Duration, slow_query_ms: u64) -> Self {
        let mut opts = MySqlConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port)
            .database(&cfg.database)
            .username(&cfg.user)
            .password(&cfg.password);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                Duration::from_millis(slow_query_ms),
            );
        }

        Self {
            opts,
            query_timeout,
        }
    }

    /// Open a fresh connection, bounded by the query timeout so a hung store
    /// fails the request instead of hanging it.
    async fn connect(&self) -> Result<MySqlConnection, StorageError> {
        match tokio::time::timeout(self.query_timeout, self.opts.connect()).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(StorageError::Unavailable(e)),
            Err(_) => Err(StorageError::Timeout(self.query_timeout)),
        }
    }

    /// Execute a statement future with the standard query timeout.
    async fn with_timeout<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, StorageError> {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StorageError::Query(e)),
            Err(_) => Err(StorageError::Timeout(self.query_timeout)),
        }
    }

    /// Create the tasks table if it does not exist. Idempotent; retried at
    /// startup by the schema initializer, never called per-request.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        let mut conn = self.connect().await?;
        self.with_timeout(
            sqlx::query(
                "CREATE TABLE IF NOT EXISTS tasks (
                     id BIGINT AUTO_INCREMENT PRIMARY KEY,
                     title VARCHAR(255) NOT NULL,
                     created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                 )",
            )
            .execute(&mut conn),
        )
        .await?;
        let _ = conn.close().await;
        Ok(())
    }

    /// All tasks, newest first.
    pub async fn list_tasks(&self) -> Result<Vec<TaskRow>, StorageError> {
        let mut conn = self.connect().await?;
        let rows = self
            .with_timeout(
                sqlx::query_as::<_, TaskRow>(
                    "SELECT id, title, created_at FROM tasks ORDER BY id DESC",
                )
                .fetch_all(&mut conn),
            )
            .await?;
        let _ = conn.close().await;
        Ok(rows)
    }

    /// Insert one task and return its store-assigned id.
    ///
    /// Not idempotent: repeated calls with the same title insert duplicate
    /// rows with distinct ids. The caller has already validated that `title`
    /// is non-empty.
    pub async fn create_task(&self, title: &str) -> Result<NewTask, StorageError> {
        let mut conn = self.connect().await?;
        let result = self
            .with_timeout(
                sqlx::query("INSERT INTO tasks (title) VALUES (?)")
                    .bind(title)
                    .execute(&mut conn),
            )
            .await?;
        let _ = conn.close().await;
        Ok(NewTask {
            id: result.last_insert_id() as i64,
            title: title.to_string(),
        })
    }
}
