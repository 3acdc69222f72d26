pub mod config;
pub mod rest;
pub mod retry;
pub mod storage;

use std::sync::Arc;

use config::AppConfig;
use storage::Storage;

/// Shared application state passed to every request handler.
///
/// Cheap to clone: the config is behind an `Arc` and the storage gateway only
/// holds connection options. Nothing in here is mutated after startup, so
/// handlers share it without locks.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub storage: Storage,
}
