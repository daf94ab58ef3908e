// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent CLI settings stored as TOML

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use quoridor_core::Player;

/// Side the tablebase oracle plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AiSide {
    /// Player 1, moving first
    Player1,
    /// Player 2
    Player2,
}

impl From<AiSide> for Player {
    fn from(side: AiSide) -> Self {
        match side {
            AiSide::Player1 => Player::Player1,
            AiSide::Player2 => Player::Player2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_board_size")]
    pub board_size: u8,
    #[serde(default = "default_wall_budget")]
    pub wall_budget: u8,
    /// Directory holding `{N}x{N}_{B}w_{layer}.bin` tables
    #[serde(default)]
    pub table_dir: Option<PathBuf>,
    #[serde(default)]
    pub ai_player: Option<AiSide>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_board_size() -> u8 {
    5
}

fn default_wall_budget() -> u8 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            board_size: default_board_size(),
            wall_budget: default_wall_budget(),
            table_dir: None,
            ai_player: None,
            log_level: default_log_level(),
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("io", "quoridor", "quoridor")
        .context("Failed to determine config directory")?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Load the config at the default location, writing the defaults there if missing
pub fn load_config() -> Result<CliConfig> {
    let config_path = get_config_path()?;
    load_or_create(&config_path)
}

/// Load the config at `path`, writing the defaults there if missing
pub fn load_or_create(path: &Path) -> Result<CliConfig> {
    if !path.exists() {
        tracing::info!("Config file not found, creating default at: {}", path.display());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let default_config = CliConfig::default();
        save_config(path, &default_config)?;
        return Ok(default_config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str::<CliConfig>(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn save_config(path: &Path, config: &CliConfig) -> Result<()> {
    let toml_content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, toml_content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    tracing::debug!("Saved config to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.board_size, 5);
        assert_eq!(config.wall_budget, 2);
        assert_eq!(config.table_dir, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = load_or_create(&config_path)?;
        assert_eq!(config, CliConfig::default());
        assert!(config_path.exists());
        assert_eq!(load_or_create(&config_path)?, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            "board_size = 7\ntable_dir = \"/srv/tables\"\nai_player = \"player2\"\n",
        )?;

        let config = load_or_create(&config_path)?;
        assert_eq!(config.board_size, 7);
        assert_eq!(config.wall_budget, 2);
        assert_eq!(config.table_dir, Some(PathBuf::from("/srv/tables")));
        assert_eq!(config.ai_player, Some(AiSide::Player2));
        Ok(())
    }

    #[test]
    fn test_bad_file_reports_path() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "board_size = \"big\"").unwrap();

        let err = load_or_create(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
