use serde::Deserialize;

use couchparty_core::session::SessionSettings;

/// Config file read from the working directory when present.
pub const CONFIG_FILE: &str = "couchparty.toml";

/// Top-level server configuration, loaded from `couchparty.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub web_root: String,
    /// Base URL phones should open, e.g. `http://192.168.1.20:3000`. When
    /// unset the request's Host header is used.
    pub public_url: Option<String>,
    pub session: SessionConfig,
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            web_root: "public".to_string(),
            public_url: None,
            session: SessionConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Roster and round settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_players: usize,
    pub round_duration_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let settings = SessionSettings::default();
        Self {
            max_players: settings.max_players,
            round_duration_secs: settings.round_duration_secs,
        }
    }
}

impl SessionConfig {
    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            max_players: self.max_players,
            round_duration_secs: self.round_duration_secs,
        }
    }
}

/// Connection caps, buffer sizes and rate limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_ws_connections: usize,
    /// Inbound frames per second per connection (token bucket, same burst).
    pub ws_rate_limit_per_sec: f64,
    pub outbound_buffer: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_ws_connections: 64,
            ws_rate_limit_per_sec: 120.0,
            outbound_buffer: 256,
        }
    }
}

impl ServerConfig {
    /// Check the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "listen_addr {:?} is not a valid socket address",
                self.listen_addr
            ));
        }
        if let Some(url) = &self.public_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(format!("public_url {url:?} must start with http:// or https://"));
        }
        if self.session.max_players == 0 {
            return Err("session.max_players must be > 0".to_string());
        }
        if self.session.round_duration_secs == 0 {
            return Err("session.round_duration_secs must be > 0".to_string());
        }
        if self.limits.max_ws_connections == 0 {
            return Err("limits.max_ws_connections must be > 0".to_string());
        }
        if self.limits.ws_rate_limit_per_sec <= 0.0 {
            return Err("limits.ws_rate_limit_per_sec must be > 0".to_string());
        }
        if self.limits.outbound_buffer == 0 {
            return Err("limits.outbound_buffer must be > 0".to_string());
        }
        Ok(())
    }

    /// Load config from `couchparty.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from {CONFIG_FILE}");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {CONFIG_FILE}: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {CONFIG_FILE} found, using defaults");
                ServerConfig::default()
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = var("COUCHPARTY_LISTEN_ADDR")
            && !addr.is_empty()
        {
            self.listen_addr = addr;
        } else if let Some(port) = var("PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            self.listen_addr = format!("0.0.0.0:{port}");
        }
        if let Some(root) = var("COUCHPARTY_WEB_ROOT")
            && !root.is_empty()
        {
            self.web_root = root;
        }
        if let Some(url) = var("COUCHPARTY_PUBLIC_URL")
            && !url.is_empty()
        {
            self.public_url = Some(url);
        }
        if let Some(val) = var("COUCHPARTY_MAX_PLAYERS")
            && let Ok(n) = val.parse::<usize>()
        {
            self.session.max_players = n;
        }
        if let Some(val) = var("COUCHPARTY_ROUND_SECS")
            && let Ok(n) = val.parse::<u32>()
        {
            self.session.round_duration_secs = n;
        }
        if let Some(val) = var("COUCHPARTY_WS_RATE_LIMIT")
            && let Ok(n) = val.parse::<f64>()
        {
            self.limits.ws_rate_limit_per_sec = n;
        }
    }
}
