pub mod config;
pub mod db;
pub mod models;
pub mod statistics;

pub use db::DatabaseError;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the embedding application (GUI shell or tooling).
///
/// Respects `RUST_LOG` when set, otherwise falls back to the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("previcitas v{}", config::APP_VERSION);
}
