//! Application configuration for ShipQuote.
//!
//! User config lives at `~/.shipquote/shipquote.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ShipQuoteError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "shipquote.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".shipquote";

// ---------------------------------------------------------------------------
// Config structs (matching shipquote.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// VIN decoder settings.
    #[serde(default)]
    pub vin: VinConfig,

    /// Lead submission settings.
    #[serde(default)]
    pub submission: SubmissionConfig,

    /// Where the wizard's form configuration comes from.
    #[serde(default)]
    pub form: FormConfigSection,
}

/// `[vin]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VinConfig {
    /// Base URL of the vPIC-compatible decode API.
    #[serde(default = "default_vin_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_vin_timeout")]
    pub timeout_secs: u64,
}

impl Default for VinConfig {
    fn default() -> Self {
        Self {
            base_url: default_vin_base_url(),
            timeout_secs: default_vin_timeout(),
        }
    }
}

fn default_vin_base_url() -> String {
    "https://vpic.nhtsa.dot.gov/api/vehicles".into()
}
fn default_vin_timeout() -> u64 {
    10
}

/// `[submission]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Endpoint that receives the lead as JSON. Unset until the operator configures it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_submission_timeout")]
    pub timeout_secs: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_submission_timeout(),
        }
    }
}

fn default_submission_timeout() -> u64 {
    15
}

/// `[form]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfigSection {
    /// File path or http(s) URL of the form configuration payload.
    /// Built-in defaults are used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Timeout in seconds when the source is fetched over HTTP.
    #[serde(default = "default_form_timeout")]
    pub timeout_secs: u64,
}

impl Default for FormConfigSection {
    fn default() -> Self {
        Self {
            source: None,
            timeout_secs: default_form_timeout(),
        }
    }
}

fn default_form_timeout() -> u64 {
    5
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.shipquote/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ShipQuoteError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.shipquote/shipquote.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| ShipQuoteError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ShipQuoteError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ShipQuoteError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ShipQuoteError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ShipQuoteError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that a lead submission endpoint is configured and is an http(s) URL.
pub fn validate_endpoint(config: &AppConfig) -> Result<Url> {
    let raw = config
        .submission
        .endpoint
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ShipQuoteError::config(format!(
                "no submission endpoint configured. Set [submission] endpoint in {CONFIG_FILE_NAME}"
            ))
        })?;

    let url = Url::parse(raw)
        .map_err(|e| ShipQuoteError::config(format!("invalid submission endpoint '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ShipQuoteError::config(format!(
            "submission endpoint must be http or https, got '{other}'"
        ))),
    }
}
