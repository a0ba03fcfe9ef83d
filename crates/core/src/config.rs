use crate::runner::default_workers;
use crate::task::ConflictPolicy;
use crate::DEFAULT_TEMPLATE;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub template: String,
    pub conflict: ConflictPolicy,
    pub parallel: bool,
    pub workers: usize,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            conflict: ConflictPolicy::Skip,
            parallel: true,
            workers: default_workers(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "thumbstamp", "thumbstamp")
        .context("could not resolve the OS config directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    if !paths.config_path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(&paths.config_path).with_context(|| {
        format!(
            "could not read config file: {}",
            paths.config_path.display()
        )
    })?;

    let config = toml::from_str::<AppConfig>(&raw).context("could not parse config file")?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let paths = app_paths()?;
    fs::create_dir_all(&paths.config_dir).with_context(|| {
        format!(
            "could not create config directory: {}",
            paths.config_dir.display()
        )
    })?;
    let body = toml::to_string_pretty(config).context("could not serialize config")?;
    fs::write(&paths.config_path, body).with_context(|| {
        format!(
            "could not write config file: {}",
            paths.config_path.display()
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use crate::task::ConflictPolicy;

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.template, "{name}-thumb");
        assert!(matches!(config.conflict, ConflictPolicy::Skip));
        assert!(config.parallel);
        assert!(config.workers >= 1);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = AppConfig::default();
        config.conflict = ConflictPolicy::Rename;
        config.workers = 3;

        let body = toml::to_string_pretty(&config).expect("serialize");
        let parsed = toml::from_str::<AppConfig>(&body).expect("parse");
        assert!(matches!(parsed.conflict, ConflictPolicy::Rename));
        assert_eq!(parsed.workers, 3);
        assert_eq!(parsed.template, config.template);
    }
}
