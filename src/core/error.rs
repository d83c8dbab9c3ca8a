use thiserror::Error;

/// Everything that can go wrong between asking a slot to play and it playing.
///
/// Only `LoadFailed` is ever surfaced to callers; the rest are absorbed by the
/// executor and leave the slot paused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("playback blocked by autoplay policy")]
    AutoplayBlocked,
    #[error("play attempt interrupted: {0}")]
    Interrupted(String),
    #[error("unexpected playback error: {0}")]
    Unexpected(String),
    #[error("media failed to load: {0}")]
    LoadFailed(String),
}

impl PlaybackError {
    /// Expected failures are a normal consequence of autoplay policy and
    /// fast scrolling and are not worth more than a debug line.
    pub fn is_expected(&self) -> bool {
        matches!(self, PlaybackError::AutoplayBlocked | PlaybackError::Interrupted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} = {value} is outside 0.0..=1.0")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("pause threshold ({pause}) must be below play threshold ({play})")]
    InvertedThresholds { pause: f64, play: f64 },
    #[error("invalid preload margin {margin:?}: {reason}")]
    InvalidMargin { margin: String, reason: String },
    #[error("config document is not valid JSON: {0}")]
    Malformed(String),
}
