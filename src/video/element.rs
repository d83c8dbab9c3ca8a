use std::fmt;

use crate::core::PlaybackError;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifies one observed slot in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotId(String);

impl SlotId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SlotId {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ties a native play request to its eventual settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

// =============================================================================
// MEDIA ELEMENT
// =============================================================================

/// Buffering hint, mirroring the `preload` attribute of a media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadHint {
    Metadata,
    Auto,
}

impl PreloadHint {
    pub fn as_str(self) -> &'static str {
        match self {
            PreloadHint::Metadata => "metadata",
            PreloadHint::Auto => "auto",
        }
    }
}

/// Rejection reported by the platform when a play request fails.
/// `name` follows DOMException naming (`NotAllowedError`, `AbortError`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRejection {
    pub name: String,
    pub message: String,
}

impl PlayRejection {
    pub const NOT_ALLOWED: &'static str = "NotAllowedError";
    pub const ABORTED: &'static str = "AbortError";

    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn not_allowed() -> Self {
        Self::new(Self::NOT_ALLOWED, "play() can only be initiated by a user gesture")
    }

    pub fn aborted() -> Self {
        Self::new(Self::ABORTED, "play() request was interrupted by a call to pause()")
    }

    pub fn classify(&self) -> PlaybackError {
        match self.name.as_str() {
            Self::NOT_ALLOWED => PlaybackError::AutoplayBlocked,
            Self::ABORTED => PlaybackError::Interrupted(self.message.clone()),
            _ => PlaybackError::Unexpected(format!("{}: {}", self.name, self.message)),
        }
    }
}

/// Notifications a media element delivers back to its controller.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Enough data is buffered to start playing
    CanPlay,
    /// Native "play" notification, whoever caused it
    Played,
    /// Native "pause" notification, whoever caused it
    Paused,
    /// A play request issued with `attempt` has settled
    PlaySettled {
        attempt: AttemptId,
        result: Result<(), PlayRejection>,
    },
    /// The source cannot be loaded or decoded at all
    LoadFailed(String),
}

/// The platform media element a controller drives. The source is attached by
/// the caller before the element is handed over.
///
/// `play` only issues the request; the outcome arrives later as
/// `MediaEvent::PlaySettled` carrying the same attempt id.
pub trait MediaElement {
    fn is_ready(&self) -> bool;
    fn play(&mut self, attempt: AttemptId);
    fn pause(&mut self);
    fn set_preload(&mut self, hint: PreloadHint);
}
