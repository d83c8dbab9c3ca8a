use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{ConfigError, RootMargin};
use crate::playback::IntentPolicy;

pub const DEFAULT_PLAY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_PAUSE_THRESHOLD: f64 = 0.2;
pub const DEFAULT_PRELOAD_MARGIN: &str = "100px";
/// How long a play attempt waits for the element to buffer before trying anyway
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 5000;

/// Per-slot visibility thresholds. Immutable once a controller is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Ratio at or above which playback should start
    pub play_threshold: f64,
    /// Ratio at or below which playback should stop
    pub pause_threshold: f64,
    /// Extra viewport margin, CSS shorthand ("100px", "10% 0", ...)
    pub preload_margin: String,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            play_threshold: DEFAULT_PLAY_THRESHOLD,
            pause_threshold: DEFAULT_PAUSE_THRESHOLD,
            preload_margin: DEFAULT_PRELOAD_MARGIN.to_string(),
        }
    }
}

impl ThresholdConfig {
    pub fn new(play_threshold: f64, pause_threshold: f64) -> Result<Self, ConfigError> {
        let config = Self {
            play_threshold,
            pause_threshold,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("play_threshold", self.play_threshold),
            ("pause_threshold", self.pause_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }

        // Equal thresholds collapse the hysteresis band and the slot flickers
        if self.pause_threshold >= self.play_threshold {
            return Err(ConfigError::InvertedThresholds {
                pause: self.pause_threshold,
                play: self.play_threshold,
            });
        }

        self.root_margin()?;
        Ok(())
    }

    pub fn root_margin(&self) -> Result<RootMargin, ConfigError> {
        self.preload_margin.parse()
    }

    /// Thresholds handed to the observer: entering/leaving plus both band edges.
    pub fn observer_thresholds(&self) -> Vec<f64> {
        let mut thresholds = vec![0.0, self.pause_threshold, self.play_threshold];
        for t in &mut thresholds {
            *t = t.clamp(0.0, 1.0);
        }
        thresholds.sort_by(|a, b| a.total_cmp(b));
        thresholds.dedup();
        thresholds
    }
}

/// Knobs for the simulated feed shown by the demo window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub slot_count: usize,
    pub slot_height: f32,
    /// Time until a simulated element has buffered enough to play
    pub load_delay_ms: u64,
    /// Time between issuing play and the play request settling
    pub play_latency_ms: u64,
    /// Reject automatic play like a browser without a prior user gesture
    pub block_autoplay: bool,
    /// Slot indices whose media never loads
    pub failing_slots: Vec<usize>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            slot_count: 12,
            slot_height: 420.0,
            load_delay_ms: 800,
            play_latency_ms: 120,
            block_autoplay: false,
            failing_slots: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub thresholds: ThresholdConfig,
    pub ready_timeout_ms: u64,
    pub intent_policy: IntentPolicy,
    pub feed: FeedConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
            intent_policy: IntentPolicy::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads the config file, writing defaults when it is missing and
    /// replacing it when it cannot be parsed or fails validation.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        let content = match std::fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config file at {}, writing defaults", config_path.display());
                return Self::write_defaults(&config_path);
            }
            Err(e) => {
                return Err(anyhow::anyhow!("Failed to read config file at {}: {}", config_path.display(), e));
            }
        };

        match Self::from_json(&content) {
            Ok(config) => {
                log::info!("Loaded config from {}", config_path.display());
                Ok(config)
            }
            Err(ConfigError::Malformed(reason)) => {
                log::warn!("Config at {} is unreadable ({}), replacing with defaults", config_path.display(), reason);
                Self::write_defaults(&config_path)
            }
            Err(invalid) => {
                log::warn!("Config at {} has invalid values ({}), replacing with defaults", config_path.display(), invalid);
                Self::write_defaults(&config_path)
            }
        }
    }

    /// Parses and validates a config document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn write_defaults(path: &Path) -> anyhow::Result<Self> {
        let config = Self::default();
        config
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to write default config to {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("feed-autoplay")
            .join("config.json")
    }
}
