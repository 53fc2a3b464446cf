//! Optional `text2site.toml` configuration.
//!
//! Looked up in the working directory and its parents unless a path is given
//! explicitly. Every field is optional; command-line flags override it.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::render::Variant;

pub const CONFIG_FILENAME: &str = "text2site.toml";

pub const DEFAULT_STYLESHEET: &str = "https://cdn.jsdelivr.net/npm/tailwindcss@2.2.19/dist/tailwind.min.css";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyChoice {
    #[default]
    Auto,
    Fixed,
    Dynamic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterChoice {
    #[default]
    Auto,
    Simple,
    Strict,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub generate: GenerateConfig,
    /// Path the config was loaded from.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Default title and description when none is given on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub policy: PolicyChoice,
    pub filter: FilterChoice,
    pub variant: Variant,
    /// Seed for the fallback categorization; entropy when absent.
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
    pub stylesheet: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            policy: PolicyChoice::Auto,
            filter: FilterChoice::Auto,
            variant: Variant::Interactive,
            seed: None,
            output_dir: PathBuf::from("."),
            stylesheet: DEFAULT_STYLESHEET.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Load from `path`, or from the nearest `text2site.toml`, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        match Self::discover() {
            Some(found) => Self::load_from_file(&found),
            None => Ok(Self::default()),
        }
    }

    fn discover() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // relative output_dir is relative to the config file
        if config.generate.output_dir.is_relative() {
            let base = path.parent().unwrap_or(Path::new("."));
            config.generate.output_dir = base.join(&config.generate.output_dir);
        }
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.generate.policy, PolicyChoice::Auto);
        assert_eq!(config.generate.filter, FilterChoice::Auto);
        assert_eq!(config.generate.variant, Variant::Interactive);
        assert_eq!(config.generate.seed, None);
        assert_eq!(config.generate.stylesheet, DEFAULT_STYLESHEET);
        assert!(config.site.title.is_none());
    }

    #[test]
    fn parses_all_fields() {
        let toml = r#"
[site]
title = "一人企业复利商业化"
description = "读书笔记"

[generate]
policy = "dynamic"
filter = "strict"
variant = "static"
seed = 42
output_dir = "dist"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.site.title.as_deref(), Some("一人企业复利商业化"));
        assert_eq!(config.generate.policy, PolicyChoice::Dynamic);
        assert_eq!(config.generate.filter, FilterChoice::Strict);
        assert_eq!(config.generate.variant, Variant::Static);
        assert_eq!(config.generate.seed, Some(42));
        assert_eq!(config.generate.output_dir, PathBuf::from("dist"));
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = toml::from_str::<Config>("[generate]\npolicy = \"smart\"").unwrap_err();
        assert!(err.to_string().contains("smart"));
    }

    #[test]
    fn load_resolves_output_dir_next_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[generate]\noutput_dir = \"site\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.generate.output_dir, dir.path().join("site"));
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/text2site.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
