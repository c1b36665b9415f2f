//! Configuration for discovery, rendering, and output settings.
//!
//! Load order: `.kdep/config.toml` → environment variables → defaults.

use crate::discover::DiscoveryFilter;
use crate::render::CommandRenderer;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const CONFIG_DIR: &str = ".kdep";
const CONFIG_FILE: &str = "config.toml";

/// Top-level kdep configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KdepConfig {
    pub discovery: DiscoveryConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
}

/// Unit directory filtering, as regular expressions over the walked path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub include: Option<String>,
    pub exclude: Option<String>,
}

/// External build tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Executable to run; the unit directory is appended to `args`.
    pub executable: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        let renderer = CommandRenderer::default();
        Self {
            executable: renderer.executable,
            args: renderer.args,
        }
    }
}

impl RenderConfig {
    pub fn renderer(&self) -> CommandRenderer {
        CommandRenderer::new(self.executable.clone(), self.args.clone())
    }
}

impl DiscoveryConfig {
    pub fn filter(&self) -> crate::error::Result<DiscoveryFilter> {
        DiscoveryFilter::from_patterns(self.include.as_deref(), self.exclude.as_deref())
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

fn env_override_opt(var: &str, target: &mut Option<String>) {
    if let Ok(v) = std::env::var(var) {
        *target = if v.is_empty() { None } else { Some(v) };
    }
}

impl KdepConfig {
    /// Load config from `.kdep/config.toml` under `root`, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(root: &Path) -> Result<Self> {
        let mut config = Self::load_file(root)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read `.kdep/config.toml` under `root` only. Environment variables are
    /// not consulted and nothing is validated.
    pub fn load_file(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", config_path.display()))
    }

    fn apply_env_overrides(&mut self) {
        env_override_opt("KDEP_INCLUDE", &mut self.discovery.include);
        env_override_opt("KDEP_EXCLUDE", &mut self.discovery.exclude);
        env_override("KDEP_KUSTOMIZE_PATH", &mut self.render.executable);
        env_override("KDEP_OUTPUT_FORMAT", &mut self.output.format);
    }

    pub fn validate(&self) -> Result<()> {
        self.discovery.filter()?;
        if self.render.executable.trim().is_empty() {
            anyhow::bail!("render.executable must not be empty");
        }
        Ok(())
    }
}
