//! Application configuration.
//!
//! Everything is read from environment variables (a `.env` file is loaded
//! first when present) into one struct that `main` hands out to the adapters.

use crate::process::CommandLine;
use hatbox_core::session::SessionSettings;
use secrecy::SecretString;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_BRIDGE_URL: &str = "ws://127.0.0.1:8765";
pub const DEFAULT_MARKET: &str = "US";
pub const DEFAULT_PLAYER_COMMAND: &str = "cvlc --play-and-exit --no-video --quiet";
pub const DEFAULT_RESOLVER_COMMAND: &str = "yt-dlp -f bestaudio";
pub const DEFAULT_TTS_COMMAND: &str = "pico2wave -l en-US";
pub const DEFAULT_POWER_OFF_COMMAND: &str = "sudo shutdown now";
pub const DEFAULT_REBOOT_COMMAND: &str = "sudo reboot";
pub const DEFAULT_VOLUME_STEP: u8 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 20;

#[derive(Debug)]
pub struct Config {
    pub bridge_url: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: SecretString,
    pub spotify_market: String,
    pub player_command: CommandLine,
    pub resolver_command: CommandLine,
    pub tts_command: CommandLine,
    pub power_off_command: CommandLine,
    pub reboot_command: CommandLine,
    pub volume_step: u8,
    pub poll_interval: Duration,
    pub lookup_timeout: Duration,
    pub log_level: Level,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// * `BRIDGE_URL`: assistant bridge WebSocket, defaults to `ws://127.0.0.1:8765`.
    /// * `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`: required catalog credentials.
    /// * `SPOTIFY_MARKET`: market for artist top tracks, defaults to `US`.
    /// * `PLAYER_COMMAND`, `RESOLVER_COMMAND`, `TTS_COMMAND`: external programs.
    /// * `POWER_OFF_COMMAND`, `REBOOT_COMMAND`: default to the `sudo` forms.
    /// * `VOLUME_STEP` (1-100), `POLL_INTERVAL_MS`, `LOOKUP_TIMEOUT_SECS`.
    /// * `RUST_LOG`: `TRACE`, `DEBUG`, `INFO`, `WARN` or `ERROR`, defaults to `INFO`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required =
            |name: &str| var(name).ok_or_else(|| ConfigError::MissingVar(name.to_string()));

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        let volume_step: u8 = parse_or(&var, "VOLUME_STEP", DEFAULT_VOLUME_STEP)?;
        if !(1..=100).contains(&volume_step) {
            return Err(invalid("VOLUME_STEP", volume_step.to_string()));
        }
        let poll_ms: u64 = parse_or(&var, "POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        if poll_ms == 0 {
            return Err(invalid("POLL_INTERVAL_MS", "0".to_string()));
        }
        let lookup_secs: u64 =
            parse_or(&var, "LOOKUP_TIMEOUT_SECS", DEFAULT_LOOKUP_TIMEOUT_SECS)?;
        if lookup_secs == 0 {
            return Err(invalid("LOOKUP_TIMEOUT_SECS", "0".to_string()));
        }

        let command = |name: &str, default: &str| {
            let line = var(name).unwrap_or_else(|| default.to_string());
            CommandLine::parse(&line).ok_or_else(|| invalid(name, line))
        };

        Ok(Self {
            bridge_url: var("BRIDGE_URL").unwrap_or_else(|| DEFAULT_BRIDGE_URL.to_string()),
            spotify_client_id: required("SPOTIFY_CLIENT_ID")?,
            spotify_client_secret: SecretString::from(required("SPOTIFY_CLIENT_SECRET")?),
            spotify_market: var("SPOTIFY_MARKET").unwrap_or_else(|| DEFAULT_MARKET.to_string()),
            player_command: command("PLAYER_COMMAND", DEFAULT_PLAYER_COMMAND)?,
            resolver_command: command("RESOLVER_COMMAND", DEFAULT_RESOLVER_COMMAND)?,
            tts_command: command("TTS_COMMAND", DEFAULT_TTS_COMMAND)?,
            power_off_command: command("POWER_OFF_COMMAND", DEFAULT_POWER_OFF_COMMAND)?,
            reboot_command: command("REBOOT_COMMAND", DEFAULT_REBOOT_COMMAND)?,
            volume_step,
            poll_interval: Duration::from_millis(poll_ms),
            lookup_timeout: Duration::from_secs(lookup_secs),
            log_level,
        })
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            poll_interval: self.poll_interval,
            lookup_timeout: self.lookup_timeout,
        }
    }
}

fn invalid(name: &str, value: String) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        value,
    }
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        Some(value) => value.trim().parse().map_err(|_| invalid(name, value)),
        None => Ok(default),
    }
}
