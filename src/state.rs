//! Shared application state injected into handlers and middleware.

use crate::{config::Config, db::DbPool};

/// Cloned per request by axum; the pool is internally reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
}
