//! Application-level configuration loading: credentials, session cookie, clock presets.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::game::{DEFAULT_GAME_TIMER, DEFAULT_SHOT_CLOCK};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCOREBOARD_BACK_CONFIG_PATH";
/// Default control surface login.
const DEFAULT_USERNAME: &str = "admin";
/// Default control surface password.
const DEFAULT_PASSWORD: &str = "password";
/// Session cookie lifetime: one day.
const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24;
/// Fixed delay between two reconnection attempts of the sync channel.
const DEFAULT_RECONNECT_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    username: String,
    password: String,
    session_max_age_secs: u64,
    secure_cookie: bool,
    initial_game_timer: String,
    initial_shot_clock: String,
    reconnect_delay: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        game_timer = %app_config.initial_game_timer,
                        shot_clock = %app_config.initial_shot_clock,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Whether the submitted credentials exactly match the configured ones.
    pub fn credentials_match(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }

    /// Lifetime of the session cookie, in seconds.
    pub fn session_max_age_secs(&self) -> u64 {
        self.session_max_age_secs
    }

    /// Whether the session cookie carries the `Secure` attribute.
    pub fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }

    /// Game clock value used at session start and on reset.
    pub fn initial_game_timer(&self) -> &str {
        &self.initial_game_timer
    }

    /// Shot clock value used at session start and on reset.
    pub fn initial_shot_clock(&self) -> &str {
        &self.initial_shot_clock
    }

    /// Delay between two reconnection attempts of a sync channel.
    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
///
/// Every field is optional; missing ones take the built-in default.
struct RawConfig {
    username: Option<String>,
    password: Option<String>,
    session_max_age_secs: Option<u64>,
    secure_cookie: Option<bool>,
    initial_game_timer: Option<String>,
    initial_shot_clock: Option<String>,
    reconnect_delay_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            username: value.username.unwrap_or_else(|| DEFAULT_USERNAME.into()),
            password: value.password.unwrap_or_else(|| DEFAULT_PASSWORD.into()),
            session_max_age_secs: value
                .session_max_age_secs
                .unwrap_or(DEFAULT_SESSION_MAX_AGE_SECS),
            secure_cookie: value.secure_cookie.unwrap_or(false),
            initial_game_timer: value
                .initial_game_timer
                .unwrap_or_else(|| DEFAULT_GAME_TIMER.into()),
            initial_shot_clock: value
                .initial_shot_clock
                .unwrap_or_else(|| DEFAULT_SHOT_CLOCK.into()),
            reconnect_delay: Duration::from_millis(
                value
                    .reconnect_delay_ms
                    .unwrap_or(DEFAULT_RECONNECT_DELAY_MS),
            ),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
