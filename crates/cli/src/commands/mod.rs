pub mod call;
pub mod init;
pub mod probe;
pub mod serve;
pub mod status;

use mcpgate_config::AppConfig;
use std::path::{Path, PathBuf};

/// Load configuration from `--config` or the default location, with
/// environment overrides applied.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load_with_env(&config_file(path))
        .map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(config)
}

pub fn config_file(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path)
}
