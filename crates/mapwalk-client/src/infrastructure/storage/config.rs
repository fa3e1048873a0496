//! TOML configuration for the client.
//!
//! The file lives at the platform-appropriate location unless a path is
//! given explicitly:
//! - Windows:  `%APPDATA%\mapwalk\config.toml`
//! - Linux:    `~/.config/mapwalk/config.toml`
//! - macOS:    `~/Library/Application Support/mapwalk/config.toml`
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! [server]
//! url = "ws://localhost:1123/ws"
//!
//! [map]
//! container = "map"
//! zoom = 13
//! mode = "hybrid"
//! reference_lat = 42.388282
//! reference_lng = -71.153968
//! start_jitter = 0.005
//!
//! [map.local_icon]
//! url = "images/hibiscus.png"
//! width = 30
//! height = 30
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use mapwalk_core::domain::geo::{DEFAULT_REFERENCE, DEFAULT_START_JITTER_DEG};
use mapwalk_core::LatLng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::application::map_view::{MapMode, MarkerIcon};
use crate::application::session::SessionSettings;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is not usable.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where to connect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// WebSocket endpoint of the relay server (`ws://` or `wss://`).
    #[serde(default = "default_server_url")]
    pub url: String,
}

/// How the map is rendered and where the local user starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    #[serde(default = "default_container")]
    pub container: String,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default)]
    pub mode: MapMode,
    #[serde(default = "default_reference_lat")]
    pub reference_lat: f64,
    #[serde(default = "default_reference_lng")]
    pub reference_lng: f64,
    /// Maximum random offset of the starting point, in degrees per axis.
    #[serde(default = "default_start_jitter")]
    pub start_jitter: f64,
    #[serde(default)]
    pub local_icon: MarkerIcon,
}

/// Logging settings.  `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

/// Endpoint used when neither the file nor the command line names one.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:1123/ws";

/// Largest zoom level a tiled web map serves.
const MAX_ZOOM: u8 = 22;

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}
fn default_container() -> String {
    "map".to_string()
}
fn default_zoom() -> u8 {
    13
}
fn default_reference_lat() -> f64 {
    DEFAULT_REFERENCE.lat
}
fn default_reference_lng() -> f64 {
    DEFAULT_REFERENCE.lng
}
fn default_start_jitter() -> f64 {
    DEFAULT_START_JITTER_DEG
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container: default_container(),
            zoom: default_zoom(),
            mode: MapMode::default(),
            reference_lat: default_reference_lat(),
            reference_lng: default_reference_lng(),
            start_jitter: default_start_jitter(),
            local_icon: MarkerIcon::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Validation and conversion ─────────────────────────────────────────────────

impl ClientConfig {
    /// Checks every value the session depends on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server_url(&self.server.url)?;

        let map = &self.map;
        if map.container.trim().is_empty() {
            return Err(invalid("map.container", "must not be empty"));
        }
        if map.zoom > MAX_ZOOM {
            return Err(invalid("map.zoom", format!("must be at most {MAX_ZOOM}")));
        }
        if !map.reference_lat.is_finite() || !(-90.0..=90.0).contains(&map.reference_lat) {
            return Err(invalid("map.reference_lat", "must be within -90..=90"));
        }
        if !map.reference_lng.is_finite() || !(-180.0..=180.0).contains(&map.reference_lng) {
            return Err(invalid("map.reference_lng", "must be within -180..=180"));
        }
        if !map.start_jitter.is_finite() || map.start_jitter < 0.0 {
            return Err(invalid("map.start_jitter", "must be a finite, non-negative number"));
        }
        if map.local_icon.width == 0 || map.local_icon.height == 0 {
            return Err(invalid("map.local_icon", "width and height must be positive"));
        }
        Ok(())
    }

    /// The session settings described by this configuration.
    pub fn to_settings(&self) -> SessionSettings {
        SessionSettings {
            container: self.map.container.clone(),
            reference: LatLng::new(self.map.reference_lat, self.map.reference_lng),
            start_jitter: self.map.start_jitter,
            zoom: self.map.zoom,
            mode: self.map.mode,
            local_icon: self.map.local_icon.clone(),
        }
    }
}

/// Accepts well-formed `ws://` and `wss://` URLs that name a host.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the URL does not parse, uses any
/// other scheme, or has no host.
pub fn validate_server_url(url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(url)
        .map_err(|e| invalid("server.url", format!("{url:?} is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "ws" | "wss") {
        return Err(invalid(
            "server.url",
            format!("{url:?} is not a ws:// or wss:// URL"),
        ));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("server.url", format!("{url:?} has no host")));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads and validates the configuration.
///
/// With `path`, that file must exist.  Without it, the default location is
/// used and a missing file (or an undeterminable config directory) yields
/// [`ClientConfig::default()`].
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors, [`ConfigError::Parse`]
/// if the TOML is malformed, and [`ConfigError::Invalid`] if a value fails
/// validation.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let config = match path {
        Some(path) => read_config(path)?,
        None => match config_file_path() {
            Ok(path) => match std::fs::read_to_string(&path) {
                Ok(content) => toml::from_str(&content)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => ClientConfig::default(),
                Err(source) => return Err(ConfigError::Io { path, source }),
            },
            Err(ConfigError::NoPlatformConfigDir) => ClientConfig::default(),
            Err(e) => return Err(e),
        },
    };
    config.validate()?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Resolves the platform config base directory joined with `mapwalk`.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("mapwalk"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("mapwalk"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("mapwalk")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
