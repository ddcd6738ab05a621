use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `[data] dir`.
pub const DATA_DIR_ENV: &str = "SALES_DATA_DIR";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Directory holding the sample CSV extracts
    pub dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[data]
dir = "data/sample"

[server]
port = 3000
"#;

/// Load configuration from config.toml
///
/// Search order:
/// 1. Next to the executable
/// 2. Current working directory
/// 3. Embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    for candidate in config_candidates() {
        if candidate.exists() {
            tracing::info!("Loading config from: {}", candidate.display());
            let contents = std::fs::read_to_string(&candidate)?;
            let config: Config = toml::from_str(&contents)?;
            return Ok(config);
        }
        tracing::debug!("config.toml not found at: {}", candidate.display());
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.push(exe_dir.join("config.toml"));
        }
    }
    candidates.push(PathBuf::from("config.toml"));
    candidates
}

/// Resolve the sample data directory.
///
/// `SALES_DATA_DIR` wins over the config file. Relative paths resolve against
/// the executable directory when that location exists, else the current
/// directory.
pub fn get_data_dir(config: &Config) -> PathBuf {
    let configured = std::env::var(DATA_DIR_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| config.data.dir.clone());
    resolve_data_dir(&configured)
}

fn resolve_data_dir(dir: &str) -> PathBuf {
    let path = Path::new(dir);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let resolved = exe_dir.join(path);
            if resolved.is_dir() {
                return resolved;
            }
        }
    }

    PathBuf::from(dir)
}
