use std::str::FromStr;

use serde::Deserialize;

use couchparty_core::physics::PlayField;
use couchparty_core::session::GameKind;

pub const CONFIG_FILE: &str = "couchparty-display.toml";

/// Upper bound on the simulation rate; keeps the tick period well above zero.
pub const MAX_TICK_RATE_HZ: f32 = 1000.0;

/// Whether this display drives the round or only shows it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayRole {
    /// Pushes scores, vibrations and round results to the server.
    #[default]
    Primary,
    /// Simulates and renders only.
    Mirror,
}

impl FromStr for DisplayRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "mirror" => Ok(Self::Mirror),
            other => Err(format!("unknown display role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub server_url: String,
    pub role: DisplayRole,
    pub field: FieldConfig,
    pub tick_rate_hz: f32,
    /// Game to start as soon as every player is ready.
    pub auto_start: Option<GameKind>,
    /// Return to the lobby this long after results are shown.
    pub results_hold_secs: Option<u64>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:3000/ws".to_string(),
            role: DisplayRole::Primary,
            field: FieldConfig::default(),
            tick_rate_hz: 60.0,
            auto_start: None,
            results_hold_secs: None,
        }
    }
}

/// Canvas size in pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl FieldConfig {
    pub fn play_field(&self) -> PlayField {
        PlayField::new(self.width, self.height)
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.server_url.starts_with("ws://") || self.server_url.starts_with("wss://")) {
            return Err(format!(
                "server_url {:?} must start with ws:// or wss://",
                self.server_url
            ));
        }
        if !(self.field.width > 0.0 && self.field.height > 0.0) {
            return Err("field width and height must be > 0".to_string());
        }
        if !(self.tick_rate_hz > 0.0 && self.tick_rate_hz <= MAX_TICK_RATE_HZ) {
            return Err(format!(
                "tick_rate_hz must be in (0, {MAX_TICK_RATE_HZ}], got {}",
                self.tick_rate_hz
            ));
        }
        Ok(())
    }

    /// Load config from `couchparty-display.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => match toml::from_str::<DisplayConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from {CONFIG_FILE}");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {CONFIG_FILE}: {e}, using defaults");
                    DisplayConfig::default()
                },
            },
            Err(_) => DisplayConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("COUCHPARTY_SERVER_URL")
            && !url.is_empty()
        {
            self.server_url = url;
        }
        if let Some(role) = var("COUCHPARTY_DISPLAY_ROLE") {
            match role.parse() {
                Ok(role) => self.role = role,
                Err(e) => tracing::warn!("Ignoring COUCHPARTY_DISPLAY_ROLE: {e}"),
            }
        }
        if let Some(game) = var("COUCHPARTY_AUTO_START") {
            if game.trim().is_empty() || game.trim().eq_ignore_ascii_case("none") {
                self.auto_start = None;
            } else {
                match game.parse() {
                    Ok(kind) => self.auto_start = Some(kind),
                    Err(e) => tracing::warn!("Ignoring COUCHPARTY_AUTO_START: {e}"),
                }
            }
        }
        if let Some(val) = var("COUCHPARTY_TICK_RATE")
            && let Ok(hz) = val.parse::<f32>()
        {
            self.tick_rate_hz = hz;
        }
        if let Some(val) = var("COUCHPARTY_RESULTS_HOLD_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            self.results_hold_secs = Some(secs);
        }
    }
}
