//! Configuration: `config.toml`, then `ERA_PLAYER_*` environment variables,
//! then command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "era-player";
const CONFIG_FILE: &str = "config.toml";

pub const ENV_SERVER: &str = "ERA_PLAYER_SERVER";
pub const ENV_STATE_FILE: &str = "ERA_PLAYER_STATE_FILE";
pub const ENV_DEBOUNCE_MS: &str = "ERA_PLAYER_DEBOUNCE_MS";

#[derive(Parser, Debug, Default)]
#[command(name = "era-player")]
#[command(version, about = "Terminal player for an era-grouped track catalog", long_about = None)]
pub struct Cli {
    /// Share link (or bare `?track=<id>` query) to open on startup
    pub link: Option<String>,

    /// Track id to open on startup
    #[arg(short, long)]
    pub track: Option<String>,

    /// Catalog server base URL
    #[arg(short, long)]
    pub server: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Session state file
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Directory for log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Do not register with the OS media controls
    #[arg(long)]
    pub no_media_controls: bool,
}

impl Cli {
    /// The deep link given on the command line; `--track` wins over a link.
    pub fn deep_link(&self) -> Option<&str> {
        self.track.as_deref().or(self.link.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_artist")]
    pub default_artist: String,

    #[serde(default = "default_enabled")]
    pub media_controls: bool,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            state_file: default_state_file(),
            log_dir: default_log_dir(),
            search_debounce_ms: default_search_debounce_ms(),
            default_artist: default_artist(),
            media_controls: default_enabled(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Loads the configuration for this invocation.
    pub fn load(cli: &Cli) -> Result<Self> {
        let path = cli.config.clone().or_else(default_config_path);
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_cli(cli);
        Ok(config)
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("invalid config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(server) = var(ENV_SERVER).filter(|s| !s.trim().is_empty()) {
            self.server_url = server;
        }
        if let Some(path) = var(ENV_STATE_FILE).filter(|s| !s.trim().is_empty()) {
            self.state_file = PathBuf::from(path);
        }
        if let Some(raw) = var(ENV_DEBOUNCE_MS) {
            match raw.trim().parse() {
                Ok(ms) => self.search_debounce_ms = ms,
                Err(e) => tracing::warn!(error = %e, var = ENV_DEBOUNCE_MS, value = %raw, "Ignoring invalid search debounce"),
            }
        }
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(server) = &cli.server {
            self.server_url = server.clone();
        }
        if let Some(path) = &cli.state_file {
            self.state_file = path.clone();
        }
        if let Some(dir) = &cli.log_dir {
            self.log_dir = dir.clone();
        }
        if cli.no_media_controls {
            self.media_controls = false;
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{APP_DIR}")))
}

// Default values
fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_state_file() -> PathBuf {
    data_dir().join("session.json")
}

fn default_log_dir() -> PathBuf {
    data_dir().join("logs")
}

fn default_search_debounce_ms() -> u64 {
    250
}

fn default_artist() -> String {
    "Unknown Artist".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}
