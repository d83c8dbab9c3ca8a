use super::VisibilityEvent;

/// Single animation-frame slot. Bursts of visibility updates between frames
/// collapse into the latest one, so at most one decision runs per frame.
#[derive(Debug, Default)]
pub struct FrameThrottle {
    pending: Option<VisibilityEvent>,
    replaced: u64,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any request not yet serviced.
    pub fn request(&mut self, event: VisibilityEvent) {
        if self.pending.replace(event).is_some() {
            self.replaced += 1;
        }
    }

    pub fn take(&mut self) -> Option<VisibilityEvent> {
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// How many requests were superseded before their frame came round.
    pub fn coalesced(&self) -> u64 {
        self.replaced
    }
}
