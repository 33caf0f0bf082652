mod init;
mod schema;
mod validation;

pub use init::{write_starter_config, STARTER_CONFIG};
pub use schema::{Config, DataConfig, OutputConfig};
pub use validation::validate_config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::SourcePaths;
use crate::query::ReasonOptions;
use crate::scoring::EnginePolicy;

/// Get the config directory path (~/.config/sector-scout/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("sector-scout")
}

/// Get the default config file path (~/.config/sector-scout/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/sector-scout/config.yaml)
///
/// Relative data paths are rewritten to be relative to the config file's directory.
///
/// # Errors
///
/// Returns an error if:
/// - The config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run `sector-scout init` to create one",
            config_path.display()
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let mut config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    config.data.resolve_relative_to(base);

    Ok(config)
}

impl DataConfig {
    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.values,
            &mut self.directions,
            &mut self.weights,
            &mut self.registry,
        ] {
            if path.is_relative() && !path.as_os_str().is_empty() {
                *path = base.join(&*path);
            }
        }
    }

    pub fn source_paths(&self) -> SourcePaths {
        SourcePaths {
            values: self.values.clone(),
            directions: self.directions.clone(),
            weights: self.weights.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl Config {
    pub fn effective_policy(&self) -> EnginePolicy {
        self.policy.unwrap_or_default()
    }

    pub fn effective_output(&self) -> OutputConfig {
        let defaults = OutputConfig::default();
        match &self.output {
            None => defaults,
            Some(output) => OutputConfig {
                top: output.top.or(defaults.top),
                reasons: output.reasons.or(defaults.reasons),
                include_risk: output.include_risk.or(defaults.include_risk),
            },
        }
    }

    pub fn reason_options(&self) -> ReasonOptions {
        let output = self.effective_output();
        let defaults = ReasonOptions::default();
        ReasonOptions {
            strengths: output.reasons.unwrap_or(defaults.strengths),
            include_risk: output.include_risk.unwrap_or(defaults.include_risk),
        }
    }

    pub fn default_top(&self) -> usize {
        self.effective_output().top.unwrap_or(5)
    }
}
