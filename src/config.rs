use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "DocSpot";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("DocSpot")
}

/// Default location of the scheduling database
pub fn database_path() -> PathBuf {
    app_data_dir().join("docspot.db")
}

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> String {
    "docspot=info".into()
}
