// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client configuration, stored as TOML in the platform config directory

use crate::dto::Search;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub ai_move: AiMoveSettings,
    /// Where the session keys live; a temp-dir file when unset
    #[serde(default)]
    pub session_file: Option<PathBuf>,
    #[serde(default)]
    pub selfplay: SelfPlayConfig,
}

/// Payload of the one-shot AI move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiMoveSettings {
    pub max_depth: u32,
    pub time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Ab,
    Mcts,
}

impl Algorithm {
    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Ab => "AB",
            Algorithm::Mcts => "MCTS",
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ab" => Ok(Algorithm::Ab),
            "mcts" => Ok(Algorithm::Mcts),
            other => Err(format!("unknown algorithm '{}', expected ab or mcts", other)),
        }
    }
}

/// Search settings for one side during self-play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideParams {
    pub algo: Algorithm,
    /// Depth for alpha-beta, simulation count for MCTS
    pub value: u32,
}

impl SideParams {
    pub fn search(self) -> Search {
        match self.algo {
            Algorithm::Ab => Search::AlphaBeta(self.value),
            Algorithm::Mcts => Search::Mcts(self.value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfPlayConfig {
    pub red: SideParams,
    pub black: SideParams,
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    #[serde(default = "default_pause_poll_ms")]
    pub pause_poll_ms: u64,
    #[serde(default = "default_selfplay_time_ms")]
    pub time_ms: u64,
}

impl SelfPlayConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn pause_poll(&self) -> Duration {
        Duration::from_millis(self.pause_poll_ms)
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout_ms() -> u64 {
    65_000
}

fn default_step_delay_ms() -> u64 {
    500
}

fn default_pause_poll_ms() -> u64 {
    500
}

fn default_selfplay_time_ms() -> u64 {
    60_000
}

impl Default for AiMoveSettings {
    fn default() -> Self {
        Self {
            max_depth: 2,
            time_ms: 5000,
        }
    }
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            red: SideParams {
                algo: Algorithm::Ab,
                value: 4,
            },
            black: SideParams {
                algo: Algorithm::Mcts,
                value: 800,
            },
            step_delay_ms: default_step_delay_ms(),
            pause_poll_ms: default_pause_poll_ms(),
            time_ms: default_selfplay_time_ms(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_ms: default_request_timeout_ms(),
            ai_move: AiMoveSettings::default(),
            session_file: None,
            selfplay: SelfPlayConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Session file path, falling back to the temp directory so the
    /// session ends when the OS clears it
    pub fn session_path(&self) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("xionghan").join("session.json"))
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("io", "xionghan", "xionghan")
        .context("Failed to determine config directory")?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Load the config from the default location, writing defaults on first use
pub fn load_config() -> Result<ClientConfig> {
    let config_path = get_config_path().context("Failed to determine config path")?;
    load_from(&config_path)
}

pub fn save_config(config: &ClientConfig) -> Result<()> {
    let config_path = get_config_path().context("Failed to determine config path")?;
    save_to(config, &config_path)
}

/// Load the config at `path`, creating it with defaults if it does not exist
pub fn load_from(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        tracing::info!("Config file not found, creating default at: {}", path.display());
        let default_config = ClientConfig::default();
        save_to(&default_config, path)?;
        return Ok(default_config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str::<ClientConfig>(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn save_to(config: &ClientConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let toml_content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, toml_content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    tracing::info!("Saved config to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, "http://127.0.0.1:8080");
        assert_eq!(config.ai_move.max_depth, 2);
        assert_eq!(config.ai_move.time_ms, 5000);
        assert_eq!(config.selfplay.time_ms, 60_000);
        assert_eq!(config.selfplay.step_delay(), Duration::from_millis(500));
        assert!(config.request_timeout() > Duration::from_millis(config.selfplay.time_ms));
        assert!(config.session_path().ends_with("xionghan/session.json"));
    }

    #[test]
    fn test_side_params_search() {
        let ab = SideParams {
            algo: Algorithm::Ab,
            value: 5,
        };
        assert_eq!(ab.search(), Search::AlphaBeta(5));

        let mcts = SideParams {
            algo: Algorithm::Mcts,
            value: 1200,
        };
        assert_eq!(mcts.search(), Search::Mcts(1200));
        assert_eq!("MCTS".parse::<Algorithm>(), Ok(Algorithm::Mcts));
        assert!("minimax".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
server_url = "http://game.example:9000"

[selfplay.red]
algo = "mcts"
value = 300

[selfplay.black]
algo = "ab"
value = 3
"#,
        )
        .unwrap();
        assert_eq!(config.server_url, "http://game.example:9000");
        assert_eq!(config.request_timeout_ms, 65_000);
        assert_eq!(config.selfplay.red.algo, Algorithm::Mcts);
        assert_eq!(config.selfplay.pause_poll_ms, 500);
        assert_eq!(config.ai_move, AiMoveSettings::default());
    }

    #[test]
    fn test_load_creates_default_then_reads_back() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let created = load_from(&config_path)?;
        assert!(config_path.exists());
        assert_eq!(created, ClientConfig::default());

        let mut changed = created.clone();
        changed.selfplay.step_delay_ms = 50;
        changed.session_file = Some(temp_dir.path().join("session.json"));
        save_to(&changed, &config_path)?;

        assert_eq!(load_from(&config_path)?, changed);
        Ok(())
    }

    #[test]
    fn test_malformed_config_is_error() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "server_url = [")?;
        assert!(load_from(&config_path).is_err());
        Ok(())
    }
}
