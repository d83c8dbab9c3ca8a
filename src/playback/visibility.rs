// =============================================================================
// VISIBILITY TRACKING
// =============================================================================
//
// A controller never talks to a platform intersection API directly. It owns a
// `VisibilityObserver` (the browser primitive, or the polled `BoundsObserver`
// below) and feeds whatever ratios it produces through a `VisibilityTracker`,
// which clamps them and derives the enter/exit and first-visible signals.
//
// =============================================================================

use std::time::Instant;

use crate::core::{RootMargin, ThresholdConfig};
use crate::video::SlotId;

/// One visibility report for one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEvent {
    /// Fraction of the slot inside the (margin-expanded) viewport, 0.0..=1.0
    pub ratio: f64,
    pub at: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObserveOptions {
    /// Sorted, unique, within 0.0..=1.0
    pub thresholds: Vec<f64>,
    pub root_margin: RootMargin,
}

impl ObserveOptions {
    pub fn from_config(config: &ThresholdConfig) -> Self {
        Self {
            thresholds: config.observer_thresholds(),
            // Validated configs always parse; anything else observes the bare viewport
            root_margin: config.root_margin().unwrap_or_default(),
        }
    }
}

/// Platform capability reporting how much of an element is on screen.
pub trait VisibilityObserver {
    fn observe(&mut self, target: &SlotId, options: &ObserveOptions);
    /// Stops observing and releases the underlying resource. Safe to call twice.
    fn disconnect(&mut self);
}

// =============================================================================
// BOUNDING-BOX OBSERVER
// =============================================================================

/// Axis-aligned rectangle in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            Some(Bounds::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Grows the rectangle by `margin`; percentages resolve against this
    /// rectangle's own width (left/right) and height (top/bottom).
    pub fn expand(&self, margin: &RootMargin) -> Bounds {
        let top = margin.top.to_pixels(self.height);
        let right = margin.right.to_pixels(self.width);
        let bottom = margin.bottom.to_pixels(self.height);
        let left = margin.left.to_pixels(self.width);
        Bounds::new(
            self.x - left,
            self.y - top,
            self.width + left + right,
            self.height + top + bottom,
        )
    }
}

/// Visible fraction of `element` within `viewport`.
pub fn visible_ratio(element: &Bounds, viewport: &Bounds) -> f64 {
    let area = element.area();
    if area <= 0.0 {
        return 0.0;
    }
    element
        .intersection(viewport)
        .map(|overlap| (overlap.area() / area).clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

/// Polled observer for hosts without an intersection primitive. The host
/// calls `sample` once per frame with fresh rectangles; an event is produced
/// only when the ratio moves across one of the registered thresholds.
#[derive(Debug, Default)]
pub struct BoundsObserver {
    options: Option<ObserveOptions>,
    last_bucket: Option<usize>,
}

impl BoundsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_observing(&self) -> bool {
        self.options.is_some()
    }

    pub fn sample(&mut self, element: Bounds, viewport: Bounds, now: Instant) -> Option<VisibilityEvent> {
        let options = self.options.as_ref()?;
        let ratio = visible_ratio(&element, &viewport.expand(&options.root_margin));
        let bucket = Self::bucket(&options.thresholds, ratio);

        if self.last_bucket == Some(bucket) {
            return None;
        }
        self.last_bucket = Some(bucket);
        Some(VisibilityEvent { ratio, at: now })
    }

    /// Number of thresholds the ratio has reached. A zero threshold counts as
    /// reached only while something is actually intersecting.
    ///
    /// A threshold is reached at equality, so a ratio falling to exactly the
    /// pause threshold stays in the bucket above it and reports nothing; the
    /// drop is only seen once the ratio goes below it. Same crossing rule as
    /// a browser intersection observer.
    fn bucket(thresholds: &[f64], ratio: f64) -> usize {
        thresholds
            .iter()
            .filter(|&&t| if t == 0.0 { ratio > 0.0 } else { ratio >= t })
            .count()
    }
}

impl VisibilityObserver for BoundsObserver {
    fn observe(&mut self, target: &SlotId, options: &ObserveOptions) {
        log::debug!("Observing {} at thresholds {:?}", target, options.thresholds);
        self.options = Some(options.clone());
        self.last_bucket = None;
    }

    fn disconnect(&mut self) {
        self.options = None;
        self.last_bucket = None;
    }
}

// =============================================================================
// TRACKER
// =============================================================================

/// What a single ratio update meant for the slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerUpdate {
    pub event: VisibilityEvent,
    pub entered: bool,
    pub exited: bool,
    /// First nonzero ratio this slot has ever reported
    pub first_visible: bool,
}

pub struct VisibilityTracker<O: VisibilityObserver> {
    id: SlotId,
    observer: O,
    connected: bool,
    latest: Option<VisibilityEvent>,
    seen_visible: bool,
}

impl<O: VisibilityObserver> VisibilityTracker<O> {
    pub fn new(id: SlotId, mut observer: O, config: &ThresholdConfig) -> Self {
        observer.observe(&id, &ObserveOptions::from_config(config));
        Self {
            id,
            observer,
            connected: true,
            latest: None,
            seen_visible: false,
        }
    }

    pub fn record(&mut self, ratio: f64, now: Instant) -> Option<TrackerUpdate> {
        if !self.connected {
            return None;
        }

        let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        let was_visible = self.latest.map(|e| e.ratio > 0.0).unwrap_or(false);
        let is_visible = ratio > 0.0;
        let event = VisibilityEvent { ratio, at: now };
        self.latest = Some(event);

        let first_visible = is_visible && !self.seen_visible;
        self.seen_visible |= is_visible;

        Some(TrackerUpdate {
            event,
            entered: is_visible && !was_visible,
            exited: !is_visible && was_visible,
            first_visible,
        })
    }

    pub fn ratio(&self) -> f64 {
        self.latest.map(|e| e.ratio).unwrap_or(0.0)
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        log::debug!("Disconnecting visibility observer for {}", self.id);
        self.connected = false;
        self.observer.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observing() -> BoundsObserver {
        let mut observer = BoundsObserver::new();
        observer.observe(&SlotId::from("slot"), &ObserveOptions {
            thresholds: vec![0.0, 0.2, 0.5],
            root_margin: RootMargin::default(),
        });
        observer
    }

    #[test]
    fn test_visible_ratio() {
        let viewport = Bounds::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(visible_ratio(&Bounds::new(0.0, 0.0, 100.0, 100.0), &viewport), 1.0);
        assert_eq!(visible_ratio(&Bounds::new(0.0, 50.0, 100.0, 100.0), &viewport), 0.5);
        assert_eq!(visible_ratio(&Bounds::new(0.0, 200.0, 100.0, 100.0), &viewport), 0.0);
        assert_eq!(visible_ratio(&Bounds::new(0.0, 0.0, 0.0, 0.0), &viewport), 0.0);
    }

    #[test]
    fn test_margin_expands_viewport() {
        let viewport = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let element = Bounds::new(0.0, 150.0, 100.0, 100.0);
        assert_eq!(visible_ratio(&element, &viewport), 0.0);

        let margin: RootMargin = "100px".parse().unwrap();
        assert_eq!(visible_ratio(&element, &viewport.expand(&margin)), 0.5);
    }

    #[test]
    fn test_bounds_observer_reports_threshold_crossings_only() {
        let mut observer = observing();
        let viewport = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let now = Instant::now();

        // First sample always reports, even fully hidden
        let first = observer.sample(Bounds::new(0.0, 300.0, 100.0, 100.0), viewport, now);
        assert_eq!(first.map(|e| e.ratio), Some(0.0));

        // Still hidden: nothing
        assert!(observer.sample(Bounds::new(0.0, 250.0, 100.0, 100.0), viewport, now).is_none());

        // 10% visible: crossed the zero threshold
        let entered = observer.sample(Bounds::new(0.0, 90.0, 100.0, 100.0), viewport, now);
        assert_eq!(entered.map(|e| e.ratio), Some(0.1));

        // 15% visible: same bucket
        assert!(observer.sample(Bounds::new(0.0, 85.0, 100.0, 100.0), viewport, now).is_none());

        // 60% visible: crossed pause and play at once, one event
        let up = observer.sample(Bounds::new(0.0, 40.0, 100.0, 100.0), viewport, now);
        assert_eq!(up.map(|e| e.ratio), Some(0.6));
    }

    #[test]
    fn test_falling_to_exact_threshold_is_not_a_crossing() {
        let mut observer = observing();
        let viewport = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let now = Instant::now();

        let hold = observer.sample(Bounds::new(0.0, 70.0, 100.0, 100.0), viewport, now);
        assert_eq!(hold.map(|e| e.ratio), Some(0.3));

        // Exactly 0.2 has still reached the 0.2 threshold
        assert!(observer.sample(Bounds::new(0.0, 80.0, 100.0, 100.0), viewport, now).is_none());

        let below = observer.sample(Bounds::new(0.0, 81.0, 100.0, 100.0), viewport, now);
        assert_eq!(below.map(|e| e.ratio), Some(0.19));

        // Climbing back to exactly 0.2 is a crossing
        let back = observer.sample(Bounds::new(0.0, 80.0, 100.0, 100.0), viewport, now);
        assert_eq!(back.map(|e| e.ratio), Some(0.2));
    }

    #[test]
    fn test_disconnected_observer_is_silent() {
        let mut observer = observing();
        observer.disconnect();
        observer.disconnect();
        assert!(!observer.is_observing());
        let sample = observer.sample(
            Bounds::new(0.0, 0.0, 10.0, 10.0),
            Bounds::new(0.0, 0.0, 10.0, 10.0),
            Instant::now(),
        );
        assert!(sample.is_none());
    }

    #[test]
    fn test_tracker_enter_exit_and_first_visible() {
        let mut tracker = VisibilityTracker::new(SlotId::from("slot"), BoundsObserver::new(), &ThresholdConfig::default());
        assert!(tracker.observer().is_observing());
        let now = Instant::now();

        let update = tracker.record(0.0, now).unwrap();
        assert!(!update.entered && !update.exited && !update.first_visible);

        let update = tracker.record(0.1, now).unwrap();
        assert!(update.entered && update.first_visible);

        let update = tracker.record(0.0, now).unwrap();
        assert!(update.exited);

        let update = tracker.record(0.1, now).unwrap();
        assert!(update.entered && !update.first_visible);
    }

    #[test]
    fn test_tracker_clamps_ratio() {
        let mut tracker = VisibilityTracker::new(SlotId::from("slot"), BoundsObserver::new(), &ThresholdConfig::default());
        let now = Instant::now();
        assert_eq!(tracker.record(1.7, now).unwrap().event.ratio, 1.0);
        assert_eq!(tracker.record(-0.3, now).unwrap().event.ratio, 0.0);
        assert_eq!(tracker.record(f64::NAN, now).unwrap().event.ratio, 0.0);
    }

    #[test]
    fn test_tracker_disconnect_is_idempotent() {
        let mut tracker = VisibilityTracker::new(SlotId::from("slot"), BoundsObserver::new(), &ThresholdConfig::default());
        tracker.disconnect();
        tracker.disconnect();
        assert!(!tracker.is_connected());
        assert!(!tracker.observer().is_observing());
        assert!(tracker.record(0.9, Instant::now()).is_none());
        assert_eq!(tracker.ratio(), 0.0);
    }
}
