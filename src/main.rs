use anyhow::{Context as _, Result};
use clap::Parser;
use std::sync::Arc;
use taskd::{
    config::AppConfig,
    rest,
    retry::{retry_fixed, RetryConfig},
    storage::Storage,
    AppContext,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "taskd",
    about = "Minimal HTTP task service backed by MySQL",
    version
)]
struct Args {
    /// HTTP listen port
    #[arg(long, env = "TASKD_PORT")]
    port: Option<u16>,

    /// Bind address for the HTTP server (default: 0.0.0.0)
    #[arg(long, env = "TASKD_BIND")]
    bind_address: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKD_LOG")]
    log: Option<String>,

    /// Log output format: "pretty" (default) or "json"
    #[arg(long, env = "TASKD_LOG_FORMAT")]
    log_format: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "TASKD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,

    /// MySQL store host
    #[arg(long, env = "DB_HOST")]
    db_host: Option<String>,

    /// MySQL store port
    #[arg(long, env = "DB_PORT")]
    db_port: Option<u16>,

    /// Database name
    #[arg(long, env = "DB_NAME")]
    db_name: Option<String>,

    /// MySQL user
    #[arg(long, env = "DB_USER")]
    db_user: Option<String>,

    /// MySQL password
    #[arg(long, env = "DB_PASSWORD")]
    db_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Arc::new(AppConfig::new(
        args.port,
        args.bind_address,
        args.log,
        args.log_format,
        args.db_host,
        args.db_port,
        args.db_name,
        args.db_user,
        args.db_password,
    ));

    let _guard = setup_logging(&config.log, args.log_file.as_deref(), &config.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        store_host = %config.store.host,
        database = %config.store.database,
        "taskd starting"
    );

    let storage = Storage::new(
        &config.store,
        config.query_timeout,
        config.slow_query_threshold_ms,
    );

    // The table must exist before the listener accepts traffic; the handlers
    // assume it does. Exhausting the retry budget is a startup failure, not
    // a log line.
    let retry_cfg = RetryConfig {
        max_attempts: config.schema_max_attempts,
        delay: config.schema_retry_delay,
    };
    retry_fixed(&retry_cfg, || storage.ensure_schema())
        .await
        .context("schema initialization exhausted its retry budget")?;
    info!("database schema ready");

    let ctx = Arc::new(AppContext { config, storage });
    rest::start_rest_server(ctx).await
}

/// Initialize the tracing subscriber.
/// If `log_file` is set, logs go to both stdout and a daily-rolling file.
/// Returns a `WorkerGuard` that must stay alive for the process lifetime.
///
/// `log_format` may be `"pretty"` (default, human-readable compact format) or
/// `"json"` (structured JSON for log aggregators).
///
/// If the log directory cannot be created, falls back to stdout-only logging
/// with a warning; never panics.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("taskd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e}, falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }

        Some(guard)
    } else if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        None
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}
