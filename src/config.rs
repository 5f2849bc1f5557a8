//! Command-line arguments and the TOML configuration file
//!
//! Precedence: command-line flag, then config file, then built-in default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::error::{PlayerError, Result};

const APP_DIR: &str = "voice-player";
const CONFIG_FILE: &str = "config.toml";

/// Command-line arguments for voice-player
#[derive(Parser, Debug, Default)]
#[command(name = "voice-player")]
#[command(about = "Terminal music player with voice commands")]
#[command(version)]
pub struct Args {
    /// Path to the config file (default: <config dir>/voice-player/config.toml)
    #[arg(short, long, env = "VOICE_PLAYER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Library file with tracks, playlists and voice aliases
    #[arg(short, long, env = "VOICE_PLAYER_LIBRARY")]
    pub library: Option<PathBuf>,

    /// JSON-lines file or FIFO delivering voice command payloads
    #[arg(long, env = "VOICE_PLAYER_VOICE_FEED")]
    pub voice_feed: Option<PathBuf>,

    /// Directory for log files
    #[arg(long, env = "VOICE_PLAYER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Values read from `config.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    library: Option<PathBuf>,
    voice_feed: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    load_delay_ms: Option<u64>,
    progress_step: Option<f32>,
    tween_ms: Option<u64>,
    start_expanded: Option<bool>,
}

/// Resolved application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub library: Option<PathBuf>,
    pub voice_feed: Option<PathBuf>,
    pub log_dir: PathBuf,
    /// Simulated track load time of the local engine
    pub load_delay: Duration,
    /// Panel progress change per PageUp/PageDown
    pub progress_step: f32,
    /// Duration of the expand/collapse animation
    pub tween: Duration,
    pub start_expanded: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library: None,
            voice_feed: None,
            log_dir: PathBuf::from(".logs"),
            load_delay: Duration::from_millis(300),
            progress_step: 5.0,
            tween: Duration::from_millis(300),
            start_expanded: false,
        }
    }
}

impl AppConfig {
    /// Resolve from CLI args, reading the config file if one exists
    pub fn load(args: &Args) -> Result<Self> {
        let path = match &args.config {
            Some(path) => {
                if !path.exists() {
                    return Err(PlayerError::Config(format!("config file not found: {}", path.display())));
                }
                Some(path.clone())
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        let file = match path {
            Some(path) => Self::read_file(&path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    fn read_file(path: &Path) -> Result<FileConfig> {
        let content = std::fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&content)?;
        Ok(file)
    }

    fn merge(args: &Args, file: FileConfig) -> Result<Self> {
        let defaults = Self::default();

        let progress_step = file.progress_step.unwrap_or(defaults.progress_step);
        if !(progress_step > 0.0 && progress_step <= 100.0) {
            return Err(PlayerError::Config(format!(
                "progress_step must be in (0, 100], got {progress_step}"
            )));
        }

        Ok(Self {
            library: args.library.clone().or(file.library),
            voice_feed: args.voice_feed.clone().or(file.voice_feed),
            log_dir: args.log_dir.clone().or(file.log_dir).unwrap_or(defaults.log_dir),
            load_delay: file.load_delay_ms.map(Duration::from_millis).unwrap_or(defaults.load_delay),
            progress_step,
            tween: file.tween_ms.map(Duration::from_millis).unwrap_or(defaults.tween),
            start_expanded: file.start_expanded.unwrap_or(defaults.start_expanded),
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}
