use serde::{Deserialize, Serialize};

use crate::video::AttemptId;

/// Who asked for a play/pause. Set immediately before the native call and
/// read back when the matching notification arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Automatic,
    User,
}

/// Native notifications, which look the same whoever caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeEvent {
    Play,
    Pause,
}

/// When a manual play/pause stops shielding the slot from scroll logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentPolicy {
    /// Cleared once the slot leaves the observed area entirely
    #[default]
    UntilOffscreen,
    /// Never cleared by the controller
    UntilManualToggle,
    /// Cleared by the next native play notification, whoever caused it
    LapseOnPlay,
}

#[derive(Debug)]
pub struct IntentTracker {
    policy: IntentPolicy,
    user_initiated: bool,
    /// Tag for the play request still waiting on its notification
    pending_play: Option<(AttemptId, Origin)>,
    pending_pause: Option<Origin>,
}

impl IntentTracker {
    pub fn new(policy: IntentPolicy) -> Self {
        Self {
            policy,
            user_initiated: false,
            pending_play: None,
            pending_pause: None,
        }
    }

    pub fn is_user_initiated(&self) -> bool {
        self.user_initiated
    }

    /// Tags the native play about to be issued for `attempt`.
    pub fn begin_play(&mut self, attempt: AttemptId, origin: Origin) {
        self.pending_play = Some((attempt, origin));
    }

    /// Tags the native pause about to be issued.
    pub fn begin_pause(&mut self, origin: Origin) {
        self.pending_pause = Some(origin);
    }

    /// The public play/pause counts as manual straight away, even if the
    /// native call turns out to be a no-op.
    pub fn mark_user(&mut self) {
        self.user_initiated = true;
    }

    /// Consumes the pending tag and returns it. A notification nobody tagged
    /// (`None`) came from the element's own controls, which means the user.
    pub fn observe(&mut self, event: NativeEvent) -> Option<Origin> {
        let tagged = match event {
            NativeEvent::Play => self.pending_play.take().map(|(_, origin)| origin),
            NativeEvent::Pause => self.pending_pause.take(),
        };

        if event == NativeEvent::Play && self.policy == IntentPolicy::LapseOnPlay {
            // Any play notification ends manual intent, whoever caused it
            if self.user_initiated {
                log::debug!("Manual intent lapsed on play notification");
            }
            self.user_initiated = false;
        } else if tagged.unwrap_or(Origin::User) == Origin::User {
            self.user_initiated = true;
        }
        tagged
    }

    /// Called when the slot reports a zero ratio.
    pub fn on_offscreen(&mut self) {
        if self.policy == IntentPolicy::UntilOffscreen && self.user_initiated {
            log::debug!("Manual intent cleared, slot left the viewport");
            self.user_initiated = false;
        }
    }

    /// The play request for `attempt` settled, current or not. A play
    /// notification always precedes a successful settlement and never
    /// follows a rejected one, so a tag still held for it is dead.
    pub fn settle_play(&mut self, attempt: AttemptId) {
        if matches!(self.pending_play, Some((pending, _)) if pending == attempt) {
            self.pending_play = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_automatic_event_is_not_user() {
        let mut intent = IntentTracker::new(IntentPolicy::UntilOffscreen);
        intent.begin_play(AttemptId(1), Origin::Automatic);
        assert_eq!(intent.observe(NativeEvent::Play), Some(Origin::Automatic));
        assert!(!intent.is_user_initiated());
    }

    #[test]
    fn test_untagged_event_counts_as_user() {
        let mut intent = IntentTracker::new(IntentPolicy::UntilOffscreen);
        assert_eq!(intent.observe(NativeEvent::Pause), None);
        assert!(intent.is_user_initiated());
    }

    #[test]
    fn test_tag_is_consumed_once() {
        let mut intent = IntentTracker::new(IntentPolicy::UntilOffscreen);
        intent.begin_play(AttemptId(1), Origin::Automatic);
        assert_eq!(intent.observe(NativeEvent::Play), Some(Origin::Automatic));
        assert_eq!(intent.observe(NativeEvent::Play), None);
    }

    #[test]
    fn test_play_and_pause_tags_are_independent() {
        let mut intent = IntentTracker::new(IntentPolicy::UntilOffscreen);
        intent.begin_play(AttemptId(1), Origin::Automatic);
        intent.begin_pause(Origin::Automatic);
        assert_eq!(intent.observe(NativeEvent::Pause), Some(Origin::Automatic));
        assert_eq!(intent.observe(NativeEvent::Play), Some(Origin::Automatic));
        assert!(!intent.is_user_initiated());
    }

    #[test]
    fn test_settled_attempt_drops_its_tag() {
        let mut intent = IntentTracker::new(IntentPolicy::UntilOffscreen);
        intent.begin_play(AttemptId(4), Origin::Automatic);
        intent.settle_play(AttemptId(4));
        assert_eq!(intent.observe(NativeEvent::Play), None);
        assert!(intent.is_user_initiated());
    }

    #[test]
    fn test_settling_older_attempt_keeps_newer_tag() {
        let mut intent = IntentTracker::new(IntentPolicy::UntilOffscreen);
        intent.begin_play(AttemptId(1), Origin::Automatic);
        intent.begin_play(AttemptId(2), Origin::Automatic);
        intent.settle_play(AttemptId(1));
        assert_eq!(intent.observe(NativeEvent::Play), Some(Origin::Automatic));
    }

    #[test]
    fn test_until_offscreen_policy() {
        let mut intent = IntentTracker::new(IntentPolicy::UntilOffscreen);
        intent.mark_user();

        intent.begin_play(AttemptId(1), Origin::Automatic);
        intent.observe(NativeEvent::Play);
        assert!(intent.is_user_initiated());

        intent.on_offscreen();
        assert!(!intent.is_user_initiated());
    }

    #[test]
    fn test_until_manual_toggle_policy() {
        let mut intent = IntentTracker::new(IntentPolicy::UntilManualToggle);
        intent.mark_user();
        intent.on_offscreen();
        intent.begin_play(AttemptId(1), Origin::Automatic);
        intent.observe(NativeEvent::Play);
        assert!(intent.is_user_initiated());
    }

    #[test]
    fn test_lapse_on_play_policy() {
        let mut intent = IntentTracker::new(IntentPolicy::LapseOnPlay);
        intent.mark_user();
        intent.on_offscreen();
        assert!(intent.is_user_initiated());

        // Pause notifications keep it
        intent.begin_pause(Origin::Automatic);
        intent.observe(NativeEvent::Pause);
        assert!(intent.is_user_initiated());

        // A user-tagged play lapses it too
        intent.begin_play(AttemptId(1), Origin::User);
        assert_eq!(intent.observe(NativeEvent::Play), Some(Origin::User));
        assert!(!intent.is_user_initiated());

        // So does one from the element's own controls
        intent.mark_user();
        assert_eq!(intent.observe(NativeEvent::Play), None);
        assert!(!intent.is_user_initiated());
    }

    #[test]
    fn test_policy_serializes_snake_case() {
        let json = serde_json::to_string(&IntentPolicy::UntilManualToggle).unwrap();
        assert_eq!(json, "\"until_manual_toggle\"");
    }
}
