// =============================================================================
// PLAYBACK EXECUTOR
// =============================================================================
//
// Issues the native play/pause calls for one slot.
//
// - At most one play attempt is in flight. Further play() calls while one is
//   pending are dropped, not queued.
// - An attempt on an element that has not buffered enough waits for the
//   ready signal, but never longer than the ready timeout; after that the
//   native play is issued anyway.
// - Settlements are matched by attempt id. Anything that does not match the
//   current attempt (it was paused away, or the slot was torn down) is
//   ignored.
//
// =============================================================================

use std::time::{Duration, Instant};

use crate::core::PlaybackError;
use crate::playback::{Origin, IntentTracker, PlaybackPhase};
use crate::video::{AttemptId, MediaElement, PlayRejection, SlotId};

#[derive(Debug, Clone, Copy, PartialEq)]
enum AttemptPhase {
    WaitingReady { deadline: Instant },
    Requested,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct InFlight {
    id: AttemptId,
    origin: Origin,
    phase: AttemptPhase,
}

/// What a call to `play` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStart {
    /// Native play issued right away
    Issued(AttemptId),
    /// Holding until the element is ready or the timeout passes
    WaitingReady(AttemptId),
    AlreadyPlaying,
    AlreadyPending(AttemptId),
}

/// What a settlement did to the slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    Started,
    Failed(PlaybackError),
    /// Not the current attempt; nothing changed
    Stale,
}

#[derive(Debug)]
pub struct PlaybackExecutor {
    id: SlotId,
    ready_timeout: Duration,
    playing: bool,
    in_flight: Option<InFlight>,
    next_attempt: u64,
    last_error: Option<PlaybackError>,
}

impl PlaybackExecutor {
    pub fn new(id: SlotId, ready_timeout: Duration) -> Self {
        Self {
            id,
            ready_timeout,
            playing: false,
            in_flight: None,
            next_attempt: 0,
            last_error: None,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        if self.playing {
            PlaybackPhase::Playing
        } else if self.in_flight.is_some() {
            PlaybackPhase::AttemptingPlay
        } else {
            PlaybackPhase::Paused
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn pending_attempt(&self) -> Option<AttemptId> {
        self.in_flight.map(|attempt| attempt.id)
    }

    pub fn is_waiting_ready(&self) -> bool {
        matches!(
            self.in_flight,
            Some(InFlight { phase: AttemptPhase::WaitingReady { .. }, .. })
        )
    }

    /// Most recent playback failure, expected or not. Informational only.
    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    pub fn play<M: MediaElement>(
        &mut self,
        element: &mut M,
        intent: &mut IntentTracker,
        origin: Origin,
        now: Instant,
    ) -> PlayStart {
        if self.playing {
            return PlayStart::AlreadyPlaying;
        }
        if let Some(attempt) = self.in_flight {
            log::debug!("{}: play already pending ({:?}), ignoring", self.id, attempt.id);
            return PlayStart::AlreadyPending(attempt.id);
        }

        self.next_attempt += 1;
        let id = AttemptId(self.next_attempt);

        if element.is_ready() {
            self.in_flight = Some(InFlight { id, origin, phase: AttemptPhase::Requested });
            self.issue(element, intent);
            PlayStart::Issued(id)
        } else {
            let deadline = now + self.ready_timeout;
            log::debug!("{}: waiting up to {:?} for media to buffer", self.id, self.ready_timeout);
            self.in_flight = Some(InFlight {
                id,
                origin,
                phase: AttemptPhase::WaitingReady { deadline },
            });
            PlayStart::WaitingReady(id)
        }
    }

    /// The element reported it can play; release a waiting attempt.
    pub fn on_ready<M: MediaElement>(&mut self, element: &mut M, intent: &mut IntentTracker) -> Option<AttemptId> {
        if !self.is_waiting_ready() {
            return None;
        }
        self.issue(element, intent)
    }

    /// Releases a waiting attempt once its deadline has passed.
    pub fn tick<M: MediaElement>(&mut self, element: &mut M, intent: &mut IntentTracker, now: Instant) -> Option<AttemptId> {
        match self.in_flight {
            Some(InFlight { phase: AttemptPhase::WaitingReady { deadline }, .. }) if now >= deadline => {
                log::debug!("{}: media still not ready after {:?}, trying anyway", self.id, self.ready_timeout);
                self.issue(element, intent)
            }
            _ => None,
        }
    }

    pub fn settle(
        &mut self,
        attempt: AttemptId,
        result: Result<(), PlayRejection>,
        intent: &mut IntentTracker,
    ) -> Settlement {
        // Whatever happens below, this request's notification is either in
        // already or never coming
        intent.settle_play(attempt);

        match self.in_flight {
            Some(current) if current.id == attempt && current.phase == AttemptPhase::Requested => {}
            _ => {
                log::debug!("{}: ignoring settlement of stale attempt {:?}", self.id, attempt);
                return Settlement::Stale;
            }
        }
        self.in_flight = None;

        match result {
            Ok(()) => {
                log::debug!("{}: playing ({:?})", self.id, attempt);
                self.playing = true;
                self.last_error = None;
                Settlement::Started
            }
            Err(rejection) => {
                self.playing = false;

                let error = rejection.classify();
                if error.is_expected() {
                    log::debug!("{}: {}", self.id, error);
                } else {
                    log::warn!("{}: {}", self.id, error);
                }
                self.last_error = Some(error.clone());
                Settlement::Failed(error)
            }
        }
    }

    /// Returns false when already paused with nothing in flight; no native
    /// call is made in that case.
    pub fn pause<M: MediaElement>(&mut self, element: &mut M, intent: &mut IntentTracker, origin: Origin) -> bool {
        let attempt = self.in_flight.take();
        if !self.playing && attempt.is_none() {
            return false;
        }

        if let Some(attempt) = attempt {
            log::debug!("{}: abandoning play attempt {:?}", self.id, attempt.id);
            // Nothing was sent to the element yet, so there is nothing to pause
            if !self.playing && matches!(attempt.phase, AttemptPhase::WaitingReady { .. }) {
                return true;
            }
        }

        self.playing = false;
        intent.begin_pause(origin);
        element.pause();
        true
    }

    /// The element started playing without going through `play`, e.g. its
    /// own controls.
    pub fn sync_playing(&mut self) {
        if self.in_flight.is_none() {
            self.playing = true;
        }
    }

    /// The element paused without going through `pause`.
    pub fn sync_paused(&mut self) {
        self.playing = false;
        self.in_flight = None;
    }

    /// Teardown: drop the pending attempt without touching the element.
    pub fn abandon(&mut self) {
        if let Some(attempt) = self.in_flight.take() {
            log::debug!("{}: abandoning attempt {:?} on teardown", self.id, attempt.id);
        }
    }

    fn issue<M: MediaElement>(&mut self, element: &mut M, intent: &mut IntentTracker) -> Option<AttemptId> {
        let attempt = self.in_flight.as_mut()?;
        attempt.phase = AttemptPhase::Requested;
        intent.begin_play(attempt.id, attempt.origin);
        element.play(attempt.id);
        Some(attempt.id)
    }
}
