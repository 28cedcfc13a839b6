//! Application configuration for DraftForge.
//!
//! User config lives at `~/.draftforge/draftforge.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored in the file; the config names the env vars
//! that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DraftForgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "draftforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".draftforge";

// ---------------------------------------------------------------------------
// Config structs (matching draftforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Search-data API settings.
    #[serde(default)]
    pub serp: SerpConfig,

    /// Generative-text API settings.
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding the article database.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Search location used when none is given on the command line.
    #[serde(default = "default_location")]
    pub location: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            location: default_location(),
        }
    }
}

fn default_data_dir() -> String {
    "~/.draftforge".into()
}
fn default_location() -> String {
    "United States".into()
}

/// `[serp]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpConfig {
    /// Base URL of the search-data API.
    #[serde(default = "default_serp_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_serp_api_key_env")]
    pub api_key_env: String,
}

impl Default for SerpConfig {
    fn default() -> Self {
        Self {
            base_url: default_serp_base_url(),
            api_key_env: default_serp_api_key_env(),
        }
    }
}

fn default_serp_base_url() -> String {
    "https://api.valueserp.com".into()
}
fn default_serp_api_key_env() -> String {
    "VALUESERP_API_KEY".into()
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the generative-text API.
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key.
    #[serde(default = "default_generation_api_key_env")]
    pub api_key_env: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            api_key_env: default_generation_api_key_env(),
        }
    }
}

fn default_generation_base_url() -> String {
    "https://api.textcraft.dev".into()
}
fn default_generation_api_key_env() -> String {
    "TEXTCRAFT_API_KEY".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.draftforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DraftForgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.draftforge/draftforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DraftForgeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DraftForgeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DraftForgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DraftForgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DraftForgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read an API key from the env var named in config.
pub fn api_key_from_env(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(DraftForgeError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Check that both API key env vars are set and non-empty.
pub fn validate_api_keys(config: &AppConfig) -> Result<()> {
    api_key_from_env(&config.serp.api_key_env)?;
    api_key_from_env(&config.generation.api_key_env)?;
    Ok(())
}
