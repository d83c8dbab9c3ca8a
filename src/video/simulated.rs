use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::video::{AttemptId, MediaElement, MediaEvent, PlayRejection, PreloadHint, SlotId};

/// Event as posted by a simulated element, tagged with its slot.
pub type SlotEvent = (SlotId, MediaEvent);

/// How a simulated element behaves.
#[derive(Debug, Clone)]
pub struct SimulatedBehavior {
    pub load_delay: Duration,
    pub play_latency: Duration,
    /// Reject play until the page has seen a user gesture
    pub block_autoplay: bool,
    pub fail_load: bool,
}

impl Default for SimulatedBehavior {
    fn default() -> Self {
        Self {
            load_delay: Duration::from_millis(800),
            play_latency: Duration::from_millis(120),
            block_autoplay: false,
            fail_load: false,
        }
    }
}

/// A media element whose buffering and play settlement happen on a tokio
/// runtime. Results come back through the shared event channel, so the host
/// drains them on its own schedule just like browser media events.
pub struct SimulatedVideo {
    id: SlotId,
    behavior: SimulatedBehavior,
    runtime: Handle,
    events: mpsc::UnboundedSender<SlotEvent>,
    /// Page-wide "the user has interacted" flag
    activation: Arc<AtomicBool>,
    ready: Arc<AtomicBool>,
    /// Bumped on every pause so in-flight requests know they were interrupted
    pause_generation: Arc<AtomicU64>,
    loading: bool,
    preload: PreloadHint,
    play_calls: usize,
    pause_calls: usize,
}

impl SimulatedVideo {
    pub fn new(
        id: SlotId,
        behavior: SimulatedBehavior,
        runtime: Handle,
        events: mpsc::UnboundedSender<SlotEvent>,
        activation: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            behavior,
            runtime,
            events,
            activation,
            ready: Arc::new(AtomicBool::new(false)),
            pause_generation: Arc::new(AtomicU64::new(0)),
            loading: false,
            preload: PreloadHint::Metadata,
            play_calls: 0,
            pause_calls: 0,
        }
    }

    pub fn id(&self) -> &SlotId {
        &self.id
    }

    pub fn preload(&self) -> PreloadHint {
        self.preload
    }

    pub fn play_calls(&self) -> usize {
        self.play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.pause_calls
    }

    fn send(events: &mpsc::UnboundedSender<SlotEvent>, id: &SlotId, event: MediaEvent) {
        // The receiver only goes away when the feed shuts down
        if events.send((id.clone(), event)).is_err() {
            log::debug!("{}: event channel closed", id);
        }
    }

    fn start_loading(&mut self) {
        if self.loading {
            return;
        }
        self.loading = true;
        log::debug!("{}: loading media", self.id);

        let id = self.id.clone();
        let events = self.events.clone();
        let ready = self.ready.clone();
        let delay = self.behavior.load_delay;
        let fail = self.behavior.fail_load;

        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if fail {
                Self::send(&events, &id, MediaEvent::LoadFailed("source could not be decoded".to_string()));
            } else {
                ready.store(true, Ordering::SeqCst);
                Self::send(&events, &id, MediaEvent::CanPlay);
            }
        });
    }
}

impl MediaElement for SimulatedVideo {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn play(&mut self, attempt: AttemptId) {
        self.play_calls += 1;
        self.start_loading();

        let id = self.id.clone();
        let events = self.events.clone();
        let latency = self.behavior.play_latency;

        if self.behavior.block_autoplay && !self.activation.load(Ordering::SeqCst) {
            self.runtime.spawn(async move {
                tokio::time::sleep(latency).await;
                Self::send(&events, &id, MediaEvent::PlaySettled {
                    attempt,
                    result: Err(PlayRejection::not_allowed()),
                });
            });
            return;
        }

        if self.behavior.fail_load {
            self.runtime.spawn(async move {
                tokio::time::sleep(latency).await;
                Self::send(&events, &id, MediaEvent::PlaySettled {
                    attempt,
                    result: Err(PlayRejection::new("NotSupportedError", "no supported source was found")),
                });
            });
            return;
        }

        // The play notification goes out before the request settles
        Self::send(&self.events, &self.id, MediaEvent::Played);

        let generation = self.pause_generation.clone();
        let issued_at = generation.load(Ordering::SeqCst);
        self.runtime.spawn(async move {
            tokio::time::sleep(latency).await;
            let result = if generation.load(Ordering::SeqCst) == issued_at {
                Ok(())
            } else {
                Err(PlayRejection::aborted())
            };
            Self::send(&events, &id, MediaEvent::PlaySettled { attempt, result });
        });
    }

    fn pause(&mut self) {
        self.pause_calls += 1;
        self.pause_generation.fetch_add(1, Ordering::SeqCst);
        Self::send(&self.events, &self.id, MediaEvent::Paused);
    }

    fn set_preload(&mut self, hint: PreloadHint) {
        self.preload = hint;
        if hint == PreloadHint::Auto {
            self.start_loading();
        }
    }
}
