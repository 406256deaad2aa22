//! Reads/writes `~/.hexpilot/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted operator configuration stored in `~/.hexpilot/config.toml`.
///
/// `host` and `token` have no usable defaults: the robot's address and the
/// controller's access token must come from the config file, the
/// environment, or the first-run wizard.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Robot address (hostname or IP), without scheme or port.
    #[serde(default)]
    pub host: String,

    /// Controller port; serves both the WebSocket and the video feed.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Access token (stored as plain text; the file is written with
    /// owner-only permissions on Unix).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "token",
                if self.token.is_empty() { &"<not set>" } else { &"<redacted>" },
            )
            .finish()
    }
}

fn default_port() -> u16 {
    8000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            token: String::new(),
        }
    }
}

impl Config {
    /// The command channel endpoint.
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}/ws", self.host, self.port)
    }

    /// The MJPEG video stream endpoint (consumed by an external viewer).
    pub fn video_feed_url(&self) -> String {
        format!("http://{}:{}/video_feed", self.host, self.port)
    }

    /// Both required fields present?
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("robot host is not configured".to_string());
        }
        if self.token.trim().is_empty() {
            return Err("access token is not configured".to_string());
        }
        Ok(())
    }
}

/// Return the path to `~/.hexpilot/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".hexpilot").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `HEXPILOT_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `HEXPILOT_HOST` | `host` |
/// | `HEXPILOT_PORT` | `port` |
/// | `HEXPILOT_TOKEN` | `token` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("HEXPILOT_HOST") {
        cfg.host = v;
    }
    if let Ok(v) = std::env::var("HEXPILOT_PORT")
        && let Ok(port) = v.parse::<u16>() {
            cfg.port = port;
        }
    if let Ok(v) = std::env::var("HEXPILOT_TOKEN") {
        cfg.token = v;
    }
}

/// Build a config from `HEXPILOT_*` environment variables alone, for
/// headless startup without a config file.
pub fn from_env() -> Config {
    let mut cfg = Config::default();
    apply_env_overrides(&mut cfg);
    cfg
}

/// Save the config to disk, creating `~/.hexpilot/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        // Restrict the config directory to the owner only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    // Write the file with owner-only read/write (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
