use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Previcitas";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> &'static str {
    "previcitas=info,warn"
}

/// Get the application data directory
/// ~/Previcitas/ on all platforms (user-visible, per clinic requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Previcitas")
}

/// Get the path of the clinic database
pub fn database_path() -> PathBuf {
    app_data_dir().join("citas.db")
}
