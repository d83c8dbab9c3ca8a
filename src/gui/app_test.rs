#[cfg(test)]
mod tests {

    use std::time::{Duration, Instant};
    use crate::core::{AppConfig, PlaybackError};
    use crate::gui::app::{FeedApp, MAX_ACTIVITY_ENTRIES};
    use crate::playback::{Bounds, PlaybackPhase};
    use crate::video::{MediaEvent, PreloadHint, SlotId};

    // Small, fast feed so tests don't wait on the simulated network
    fn create_test_app() -> FeedApp {
        let mut config = AppConfig::default();
        config.feed.slot_count = 3;
        config.feed.load_delay_ms = 1;
        config.feed.play_latency_ms = 1;
        FeedApp::with_config(config).expect("app should build")
    }

    fn viewport() -> Bounds {
        Bounds::new(0.0, 0.0, 400.0, 800.0)
    }

    fn fully_visible() -> Bounds {
        Bounds::new(0.0, 100.0, 400.0, 400.0)
    }

    /// Keeps pumping events until `done` holds or two seconds pass.
    fn pump_until(app: &mut FeedApp, done: impl Fn(&FeedApp) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            app.process_media_events();
            app.run_frame(Instant::now());
            if done(app) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_app_initialization() {
        let app = create_test_app();

        assert_eq!(app.slots.len(), 3);
        assert_eq!(app.playing_count(), 0);
        assert!(app.activity.is_empty());
        for slot in &app.slots {
            assert_eq!(slot.controller.phase(), PlaybackPhase::Paused);
            assert_eq!(slot.controller.preload_hint(), PreloadHint::Metadata);
            assert!(slot.controller.observer().is_observing());
        }
        assert_eq!(app.slots[0].title, "Clip #1");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.thresholds.pause_threshold = 0.9;
        assert!(FeedApp::with_config(config).is_err());
    }

    #[test]
    fn test_visible_slot_starts_playing() {
        let mut app = create_test_app();
        let now = Instant::now();

        app.observe_slot(0, fully_visible(), viewport(), now);
        assert_eq!(app.slots[0].controller.preload_hint(), PreloadHint::Auto);
        app.run_frame(now);

        assert!(pump_until(&mut app, |app| app.slots[0].controller.is_playing()));
        assert_eq!(app.playing_count(), 1);
        assert_eq!(app.slots[0].controller.element().play_calls(), 1);
    }

    #[test]
    fn test_offscreen_slots_stay_idle() {
        let mut app = create_test_app();
        let now = Instant::now();

        // Far below the viewport and its preload margin
        app.observe_slot(1, Bounds::new(0.0, 5000.0, 400.0, 400.0), viewport(), now);
        app.run_frame(now);

        let slot = &app.slots[1];
        assert_eq!(slot.controller.preload_hint(), PreloadHint::Metadata);
        assert_eq!(slot.controller.element().play_calls(), 0);
    }

    #[test]
    fn test_click_marks_activation_and_user_intent() {
        let mut app = create_test_app();
        assert!(!app.activation.load(std::sync::atomic::Ordering::SeqCst));

        app.handle_click(2, Instant::now());

        assert!(app.activation.load(std::sync::atomic::Ordering::SeqCst));
        assert!(app.slots[2].controller.is_user_initiated());
        assert_eq!(app.activity.len(), 1);
        assert_eq!(app.activity[0].slot, "Clip #3");
    }

    #[test]
    fn test_failing_slot_surfaces_load_error() {
        let mut config = AppConfig::default();
        config.feed.slot_count = 2;
        config.feed.load_delay_ms = 1;
        config.feed.failing_slots = vec![1];
        let mut app = FeedApp::with_config(config).expect("app should build");

        app.observe_slot(1, fully_visible(), viewport(), Instant::now());
        assert!(pump_until(&mut app, |app| app.slots[1].controller.load_error().is_some()));
        assert!(matches!(app.slots[1].controller.load_error(), Some(PlaybackError::LoadFailed(_))));
        assert!(!app.slots[1].controller.is_playing());
    }

    #[test]
    fn test_rebuild_disposes_old_slots() {
        let mut app = create_test_app();
        let old_id = app.slots[0].controller.id().clone();

        app.rebuild_feed();

        assert_eq!(app.slots.len(), 3);
        assert!(app.slot_index(&old_id).is_none());
        assert!(app.slots.iter().all(|slot| slot.controller.is_mounted()));

        // Late events for the old slot are dropped
        app.event_sender.send((old_id, MediaEvent::CanPlay)).expect("receiver alive");
        app.process_media_events();
        assert!(app.activity.is_empty());
    }

    #[test]
    fn test_events_for_unknown_slot_are_ignored() {
        let mut app = create_test_app();
        app.event_sender
            .send((SlotId::from("nobody"), MediaEvent::Played))
            .expect("receiver alive");
        app.process_media_events();
        assert_eq!(app.playing_count(), 0);
    }

    #[test]
    fn test_activity_log_is_capped() {
        let mut app = create_test_app();
        let now = Instant::now();
        for _ in 0..(MAX_ACTIVITY_ENTRIES + 20) {
            app.handle_click(0, now);
        }
        assert_eq!(app.activity.len(), MAX_ACTIVITY_ENTRIES);
    }
}
