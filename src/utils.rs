use std::path::PathBuf;

/// Get the data directory from the environment variable or use the default
pub fn get_data_dir() -> PathBuf {
    std::env::var("MSE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}
