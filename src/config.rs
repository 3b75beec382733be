// ⚙️ Configuration - optional TOML file, every field defaulted

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::clock::{parse_timezone, DEFAULT_TIMEZONE};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub static_site: StaticSiteConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the HTTP server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// IANA zone used when a request names none.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            default_timezone: default_timezone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticSiteConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_year_span")]
    pub years_before: u16,
    #[serde(default = "default_year_span")]
    pub years_after: u16,
}

impl Default for StaticSiteConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            years_before: default_year_span(),
            years_after: default_year_span(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}
fn default_year_span() -> u16 {
    10
}

impl AppConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&toml_str)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        parse_timezone(&self.server.default_timezone)
            .context("[server].default_timezone is not a valid IANA timezone")?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
