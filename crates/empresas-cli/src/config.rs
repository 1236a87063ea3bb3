//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$EMPRESAS_CONFIG` environment variable
//! 2. `~/.config/empresas/config.toml`
//! 3. Built-in defaults (everything is optional)
//!
//! `HOST`, `PORT`, `DATA_PATH` and `ADMIN_PASSWORD` in the environment take
//! precedence over the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub store: StoreConfig,
    pub admin: AdminConfig,
}

/// HTTP listener settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

/// Data file settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON data file. Parent directories are created on demand.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret expected in the body of every `/admin/*` request.
    pub password: String,
}

// --- Defaults ---

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("dados.json"),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: "admin123".into(),
        }
    }
}

/// Load config from disk and the environment. Returns defaults if no config
/// file exists.
pub fn load_config() -> Result<Config> {
    let mut config = match config_path() {
        Some(p) if p.exists() => load_file(&p)?,
        _ => Config::default(),
    };
    apply_env(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn load_file(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn apply_env(config: &mut Config, var: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(host) = var("HOST") {
        config.server.host = host;
    }
    if let Some(port) = var("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("invalid PORT: {port}"))?;
    }
    if let Some(path) = var("DATA_PATH") {
        config.store.path = PathBuf::from(path);
    }
    if let Some(password) = var("ADMIN_PASSWORD") {
        config.admin.password = password;
    }
    Ok(())
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    // 1. Environment variable
    if let Ok(p) = std::env::var("EMPRESAS_CONFIG") {
        return Some(PathBuf::from(p));
    }

    // 2. ~/.config/empresas/config.toml
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("empresas")
            .join("config.toml")
    })
}

/// Show the active config path (for `empresas config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
