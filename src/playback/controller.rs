// =============================================================================
// AUTOPLAY CONTROLLER - ONE PER FEED SLOT
// =============================================================================
//
// Wires the pieces together for a single slot:
//
//   observer ratio ──> VisibilityTracker ──> FrameThrottle ──> PlaybackArbiter
//                          │                                       │
//                          ├─> PreloadStrategy                     v
//                          └─> IntentTracker (offscreen)    PlaybackExecutor
//
// The controller is a plain state machine. The host feeds it intersection
// updates, animation frames, clock ticks and media events; it never blocks
// and never spawns anything. Slots share nothing, so a feed is just a list
// of controllers.
//
// =============================================================================

use std::time::{Duration, Instant};

use crate::core::{PlaybackError, ThresholdConfig};
use crate::playback::{
    Command, FrameThrottle, IntentPolicy, IntentTracker, NativeEvent, Origin, PlayStart,
    PlaybackArbiter, PlaybackExecutor, PlaybackPhase, PreloadStrategy, Settlement, Situation,
    VisibilityEvent, VisibilityObserver, VisibilityTracker,
};
use crate::video::{AttemptId, MediaElement, MediaEvent, PreloadHint, SlotId};

/// Snapshot of everything a slot exposes to the page.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotStatus {
    pub id: SlotId,
    pub ratio: f64,
    pub ready: bool,
    pub playing: bool,
    pub phase: PlaybackPhase,
    pub preload: PreloadHint,
    pub user_initiated: bool,
    pub load_error: Option<PlaybackError>,
    /// Play request still waiting to settle
    pub pending_attempt: Option<AttemptId>,
    /// Most recent absorbed play failure, for display only
    pub last_failure: Option<PlaybackError>,
    /// Visibility updates superseded before their frame ran
    pub coalesced_updates: u64,
}

/// A decision the controller carried out, for hosts that log or display them.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    PlayRequested(PlayStart),
    Paused,
    Started,
    Failed(PlaybackError),
    LoadFailed(String),
    PreloadUpgraded,
}

pub struct AutoplayController<M: MediaElement, O: VisibilityObserver> {
    id: SlotId,
    element: M,
    tracker: VisibilityTracker<O>,
    arbiter: PlaybackArbiter,
    intent: IntentTracker,
    executor: PlaybackExecutor,
    preload: PreloadStrategy,
    frame: FrameThrottle,
    ready: bool,
    load_error: Option<PlaybackError>,
    mounted: bool,
}

impl<M: MediaElement, O: VisibilityObserver> AutoplayController<M, O> {
    pub fn new(
        id: SlotId,
        mut element: M,
        observer: O,
        config: &ThresholdConfig,
        policy: IntentPolicy,
        ready_timeout: Duration,
    ) -> Self {
        log::debug!(
            "Mounting slot {} (play >= {}, pause <= {}, margin {})",
            id, config.play_threshold, config.pause_threshold, config.preload_margin
        );

        let preload = PreloadStrategy::attach(&mut element);
        let ready = element.is_ready();

        Self {
            tracker: VisibilityTracker::new(id.clone(), observer, config),
            arbiter: PlaybackArbiter::new(config),
            intent: IntentTracker::new(policy),
            executor: PlaybackExecutor::new(id.clone(), ready_timeout),
            preload,
            frame: FrameThrottle::new(),
            ready,
            load_error: None,
            mounted: true,
            element,
            id,
        }
    }

    // =========================================================================
    // HOST INPUTS
    // =========================================================================

    pub fn on_intersection(&mut self, ratio: f64, now: Instant) -> Vec<Transition> {
        self.on_visibility(VisibilityEvent { ratio, at: now })
    }

    /// Records the update right away and defers the play/pause decision to
    /// the next frame.
    pub fn on_visibility(&mut self, event: VisibilityEvent) -> Vec<Transition> {
        let mut transitions = Vec::new();
        if !self.mounted {
            return transitions;
        }
        let Some(update) = self.tracker.record(event.ratio, event.at) else {
            return transitions;
        };

        if update.first_visible && self.preload.on_ratio(update.event.ratio, &mut self.element) {
            log::debug!("{}: upgrading preload to {}", self.id, PreloadHint::Auto.as_str());
            transitions.push(Transition::PreloadUpgraded);
        }
        if update.event.ratio <= 0.0 {
            self.intent.on_offscreen();
        }

        self.frame.request(update.event);
        transitions
    }

    /// Runs at most one play/pause decision, for the latest ratio received
    /// since the previous frame.
    pub fn on_frame(&mut self, now: Instant) -> Vec<Transition> {
        let mut transitions = self.tick(now);
        if !self.mounted {
            return transitions;
        }
        let Some(event) = self.frame.take() else {
            return transitions;
        };

        let situation = Situation {
            ratio: event.ratio,
            phase: self.executor.phase(),
            user_initiated: self.intent.is_user_initiated(),
            load_failed: self.load_error.is_some(),
        };

        match self.arbiter.decide(situation) {
            Some(Command::Play) => {
                log::debug!("{}: ratio {:.2}, starting playback", self.id, event.ratio);
                let start = self.executor.play(&mut self.element, &mut self.intent, Origin::Automatic, now);
                transitions.push(Transition::PlayRequested(start));
            }
            Some(Command::Pause) => {
                log::debug!("{}: ratio {:.2}, pausing", self.id, event.ratio);
                if self.executor.pause(&mut self.element, &mut self.intent, Origin::Automatic) {
                    transitions.push(Transition::Paused);
                }
            }
            None => {}
        }
        transitions
    }

    /// Lets a play attempt that is waiting on buffering give up waiting.
    pub fn tick(&mut self, now: Instant) -> Vec<Transition> {
        let mut transitions = Vec::new();
        if !self.mounted {
            return transitions;
        }
        if let Some(attempt) = self.executor.tick(&mut self.element, &mut self.intent, now) {
            transitions.push(Transition::PlayRequested(PlayStart::Issued(attempt)));
        }
        transitions
    }

    pub fn on_media_event(&mut self, event: MediaEvent) -> Vec<Transition> {
        let mut transitions = Vec::new();
        if !self.mounted {
            log::debug!("{}: dropping {:?} after teardown", self.id, event);
            return transitions;
        }

        match event {
            MediaEvent::CanPlay => {
                self.ready = true;
                if let Some(attempt) = self.executor.on_ready(&mut self.element, &mut self.intent) {
                    transitions.push(Transition::PlayRequested(PlayStart::Issued(attempt)));
                }
            }
            MediaEvent::Played => {
                if self.intent.observe(NativeEvent::Play).is_none() {
                    log::debug!("{}: started from the element's own controls", self.id);
                    self.executor.sync_playing();
                }
            }
            MediaEvent::Paused => {
                if self.intent.observe(NativeEvent::Pause).is_none() && self.executor.phase() != PlaybackPhase::Paused {
                    log::debug!("{}: paused from the element's own controls", self.id);
                    self.executor.sync_paused();
                    transitions.push(Transition::Paused);
                }
            }
            MediaEvent::PlaySettled { attempt, result } => {
                match self.executor.settle(attempt, result, &mut self.intent) {
                    Settlement::Started => transitions.push(Transition::Started),
                    Settlement::Failed(error) => transitions.push(Transition::Failed(error)),
                    Settlement::Stale => {}
                }
            }
            MediaEvent::LoadFailed(message) => {
                log::warn!("{}: media failed to load: {}", self.id, message);
                self.executor.abandon();
                self.executor.sync_paused();
                self.load_error = Some(PlaybackError::LoadFailed(message.clone()));
                transitions.push(Transition::LoadFailed(message));
            }
        }
        transitions
    }

    // =========================================================================
    // USER ACTIONS
    // =========================================================================

    /// Manual play, e.g. a tap on the slot.
    pub fn play(&mut self, now: Instant) -> Option<PlayStart> {
        if !self.mounted {
            return None;
        }
        self.intent.mark_user();
        log::info!("{}: play requested by user", self.id);
        Some(self.executor.play(&mut self.element, &mut self.intent, Origin::User, now))
    }

    /// Manual pause. Returns whether anything had to be stopped.
    pub fn pause(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        self.intent.mark_user();
        log::info!("{}: pause requested by user", self.id);
        self.executor.pause(&mut self.element, &mut self.intent, Origin::User)
    }

    /// Plays when paused, pauses otherwise.
    pub fn toggle(&mut self, now: Instant) {
        match self.executor.phase() {
            PlaybackPhase::Paused => {
                self.play(now);
            }
            PlaybackPhase::AttemptingPlay | PlaybackPhase::Playing => {
                self.pause();
            }
        }
    }

    // =========================================================================
    // STATE QUERIES
    // =========================================================================

    pub fn id(&self) -> &SlotId {
        &self.id
    }

    pub fn ratio(&self) -> f64 {
        self.tracker.ratio()
    }

    pub fn is_playing(&self) -> bool {
        self.executor.is_playing()
    }

    pub fn is_ready(&self) -> bool {
        self.ready || self.element.is_ready()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.executor.phase()
    }

    pub fn is_user_initiated(&self) -> bool {
        self.intent.is_user_initiated()
    }

    pub fn load_error(&self) -> Option<&PlaybackError> {
        self.load_error.as_ref()
    }

    pub fn preload_hint(&self) -> PreloadHint {
        self.preload.hint()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn status(&self) -> SlotStatus {
        SlotStatus {
            id: self.id.clone(),
            ratio: self.ratio(),
            ready: self.is_ready(),
            playing: self.is_playing(),
            phase: self.phase(),
            preload: self.preload_hint(),
            user_initiated: self.is_user_initiated(),
            load_error: self.load_error.clone(),
            pending_attempt: self.executor.pending_attempt(),
            last_failure: self.executor.last_error().cloned(),
            coalesced_updates: self.frame.coalesced(),
        }
    }

    pub fn element(&self) -> &M {
        &self.element
    }

    pub fn observer(&self) -> &O {
        self.tracker.observer()
    }

    pub fn observer_mut(&mut self) -> &mut O {
        self.tracker.observer_mut()
    }

    // =========================================================================
    // TEARDOWN
    // =========================================================================

    /// Unmount. Disconnects the observer, drops the pending frame and any
    /// in-flight attempt. Every later input is ignored.
    pub fn dispose(&mut self) {
        if !self.mounted {
            return;
        }
        log::debug!("Unmounting slot {}", self.id);
        self.mounted = false;
        self.tracker.disconnect();
        self.frame.cancel();
        self.executor.abandon();
    }
}

impl<M: MediaElement, O: VisibilityObserver> Drop for AutoplayController<M, O> {
    fn drop(&mut self) {
        self.dispose();
    }
}
