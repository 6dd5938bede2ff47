use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

const APP_DIR: &str = "avatar-hud";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// When enabled the logger runs at debug level.
    pub debug_logging: bool,
    /// Alpha (0.0-1.0) at or above which a sampled pixel counts as opaque.
    pub opaque_threshold: f32,
    /// Seconds between checks of whether the window moved.
    pub placement_check_interval_secs: f32,
    /// Per-tick interpolation factor for whole-window alpha.
    pub alpha_lerp_factor: f32,
    /// Size restored by `reset-window-size`.
    pub default_window_size: (i32, i32),
    /// Companion executable, relative to the directory of this executable.
    pub companion_relative_path: PathBuf,
    /// Ticks to wait before launching the companion.
    pub companion_launch_delay_ticks: u32,
    /// Start with a see-through background and a hidden frame.
    pub start_transparent: bool,
    /// Upper bound for one resource release during quit; `None` waits forever.
    pub release_timeout_secs: Option<f32>,
    /// Interval of the texture-size poller.
    pub texture_poll_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            opaque_threshold: 0.1,
            placement_check_interval_secs: 5.0,
            alpha_lerp_factor: 0.2,
            default_window_size: (800, 600),
            companion_relative_path: default_companion_path(),
            companion_launch_delay_ticks: 2,
            start_transparent: false,
            release_timeout_secs: None,
            texture_poll_interval_ms: 1000,
        }
    }
}

fn default_companion_path() -> PathBuf {
    let exe = if cfg!(windows) {
        "avatar-hud-config.exe"
    } else {
        "avatar-hud-config"
    };
    Path::new("ConfigApp").join(exe)
}

impl AppConfig {
    /// Load from `path`. A missing or empty file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn placement_check_interval(&self) -> Duration {
        Duration::from_secs_f32(self.placement_check_interval_secs.max(0.0))
    }

    pub fn release_timeout(&self) -> Option<Duration> {
        self.release_timeout_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f32)
    }

    pub fn texture_poll_interval(&self) -> Duration {
        Duration::from_millis(self.texture_poll_interval_ms.max(1))
    }
}

/// Directory holding the config and the persisted window placement.
pub fn data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

pub fn placement_path() -> PathBuf {
    data_dir().join("placement.json")
}
