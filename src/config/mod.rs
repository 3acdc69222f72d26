use std::time::Duration;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DB_HOST: &str = "tasks-db";
const DEFAULT_DB_PORT: u16 = 3306;
const DEFAULT_DB_NAME: &str = "tasks_db";
const DEFAULT_DB_USER: &str = "root";
const DEFAULT_DB_PASSWORD: &str = "password";
const DEFAULT_SCHEMA_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_SCHEMA_RETRY_DELAY: Duration = Duration::from_secs(2);
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_SLOW_QUERY_MS: u64 = 100;

fn default_bind_address() -> String {
    // The service fronts a browser UI from other hosts; CORS is permissive,
    // so there is no point hiding behind loopback.
    "0.0.0.0".to_string()
}

/// Connection settings for the MySQL store.
///
/// Built once at startup and handed to the storage gateway; never read from
/// ambient globals after that.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store host (DB_HOST env var, default: "tasks-db").
    pub host: String,
    /// Store port (DB_PORT env var, default: 3306).
    pub port: u16,
    /// Database name (DB_NAME env var, default: "tasks_db").
    pub database: String,
    /// Store user (DB_USER env var, default: "root").
    pub user: String,
    /// Store password (DB_PASSWORD env var, default: "password").
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port (TASKD_PORT env var, default: 5000).
    pub port: u16,
    /// HTTP bind address (TASKD_BIND env var, default: "0.0.0.0").
    pub bind_address: String,
    /// Log level filter string, e.g. "debug", "info,taskd=trace" (default: "info").
    pub log: String,
    /// Log output format: "pretty" (default) | "json" (structured for log aggregators).
    pub log_format: String,
    /// MySQL connection settings.
    pub store: StoreConfig,
    /// Startup schema-init retry budget: total attempts including the first.
    pub schema_max_attempts: u32,
    /// Fixed delay between schema-init attempts.
    pub schema_retry_delay: Duration,
    /// Upper bound on any single store operation (connect or statement).
    pub query_timeout: Duration,
    /// Statements slower than this are logged at WARN. 0 disables.
    pub slow_query_threshold_ms: u64,
}

impl AppConfig {
    /// Build config from CLI/env args.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI flag / env var — passed as `Some(value)` from clap
    ///   2. Built-in default
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        port: Option<u16>,
        bind_address: Option<String>,
        log: Option<String>,
        log_format: Option<String>,
        db_host: Option<String>,
        db_port: Option<u16>,
        db_name: Option<String>,
        db_user: Option<String>,
        db_password: Option<String>,
    ) -> Self {
        let store = StoreConfig {
            host: db_host.unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            port: db_port.unwrap_or(DEFAULT_DB_PORT),
            database: db_name.unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            user: db_user.unwrap_or_else(|| DEFAULT_DB_USER.to_string()),
            password: db_password.unwrap_or_else(|| DEFAULT_DB_PASSWORD.to_string()),
        };

        Self {
            port: port.unwrap_or(DEFAULT_PORT),
            bind_address: bind_address.unwrap_or_else(default_bind_address),
            log: log.unwrap_or_else(|| "info".to_string()),
            log_format: log_format.unwrap_or_else(|| "pretty".to_string()),
            store,
            schema_max_attempts: DEFAULT_SCHEMA_MAX_ATTEMPTS,
            schema_retry_delay: DEFAULT_SCHEMA_RETRY_DELAY,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            slow_query_threshold_ms: DEFAULT_SLOW_QUERY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let cfg = AppConfig::new(None, None, None, None, None, None, None, None, None);
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.bind_address, "0.0.0.0");
        assert_eq!(cfg.log, "info");
        assert_eq!(cfg.log_format, "pretty");
        assert_eq!(cfg.store.host, "tasks-db");
        assert_eq!(cfg.store.port, 3306);
        assert_eq!(cfg.store.database, "tasks_db");
        assert_eq!(cfg.store.user, "root");
        assert_eq!(cfg.store.password, "password");
        assert_eq!(cfg.schema_max_attempts, 10);
        assert_eq!(cfg.schema_retry_delay, Duration::from_secs(2));
    }

    #[test]
    fn explicit_values_win_over_defaults() {
        let cfg = AppConfig::new(
            Some(8080),
            Some("127.0.0.1".to_string()),
            Some("debug".to_string()),
            Some("json".to_string()),
            Some("db.internal".to_string()),
            Some(3307),
            Some("tasks_test".to_string()),
            Some("svc".to_string()),
            Some("hunter2".to_string()),
        );
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.bind_address, "127.0.0.1");
        assert_eq!(cfg.log_format, "json");
        assert_eq!(cfg.store.host, "db.internal");
        assert_eq!(cfg.store.port, 3307);
        assert_eq!(cfg.store.database, "tasks_test");
        assert_eq!(cfg.store.user, "svc");
        assert_eq!(cfg.store.password, "hunter2");
    }
}
