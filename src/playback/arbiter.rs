use crate::core::ThresholdConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Paused,
    AttemptingPlay,
    Playing,
}

impl PlaybackPhase {
    pub fn display_text(&self) -> &str {
        match self {
            PlaybackPhase::Paused => "Paused",
            PlaybackPhase::AttemptingPlay => "Starting...",
            PlaybackPhase::Playing => "Playing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
}

/// Where a ratio sits relative to the two thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// At or above the play threshold
    Play,
    /// Strictly between the thresholds
    Hold,
    /// At or below the pause threshold
    Pause,
}

/// Everything the arbiter looks at for one decision.
#[derive(Debug, Clone, Copy)]
pub struct Situation {
    pub ratio: f64,
    pub phase: PlaybackPhase,
    pub user_initiated: bool,
    pub load_failed: bool,
}

/// Turns ratios into play/pause commands with hysteresis.
#[derive(Debug, Clone)]
pub struct PlaybackArbiter {
    play_threshold: f64,
    pause_threshold: f64,
}

impl PlaybackArbiter {
    pub fn new(config: &ThresholdConfig) -> Self {
        Self {
            play_threshold: config.play_threshold,
            pause_threshold: config.pause_threshold,
        }
    }

    pub fn band(&self, ratio: f64) -> Band {
        if ratio >= self.play_threshold {
            Band::Play
        } else if ratio <= self.pause_threshold {
            Band::Pause
        } else {
            Band::Hold
        }
    }

    pub fn decide(&self, situation: Situation) -> Option<Command> {
        if situation.user_initiated {
            return None;
        }

        match (self.band(situation.ratio), situation.phase) {
            (Band::Play, PlaybackPhase::Paused) if !situation.load_failed => Some(Command::Play),
            (Band::Pause, PlaybackPhase::Playing | PlaybackPhase::AttemptingPlay) => Some(Command::Pause),
            _ => None,
        }
    }
}
