#[cfg(test)]
mod tests {

    use crate::core::{AppConfig, ConfigError, FeedConfig, MarginValue, RootMargin, ThresholdConfig};
    use crate::playback::IntentPolicy;

    #[test]
    fn test_threshold_config_default() {
        let config = ThresholdConfig::default();
        assert_eq!(config.play_threshold, 0.5);
        assert_eq!(config.pause_threshold, 0.2);
        assert_eq!(config.preload_margin, "100px");
        assert!(config.validate().is_ok());
        assert_eq!(config.root_margin().unwrap(), RootMargin::uniform(MarginValue::Pixels(100.0)));
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.ready_timeout_ms, 5000);
        assert_eq!(config.ready_timeout().as_secs(), 5);
        assert_eq!(config.intent_policy, IntentPolicy::UntilOffscreen);
        assert!(!config.feed.block_autoplay);
        assert!(config.feed.failing_slots.is_empty());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let err = ThresholdConfig::new(0.2, 0.5).unwrap_err();
        assert_eq!(err, ConfigError::InvertedThresholds { pause: 0.5, play: 0.2 });

        // A single threshold is just as bad: no hysteresis band
        assert!(ThresholdConfig::new(0.4, 0.4).is_err());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let err = ThresholdConfig::new(1.5, 0.2).unwrap_err();
        assert!(matches!(err, ConfigError::ThresholdOutOfRange { name: "play_threshold", .. }));

        assert!(ThresholdConfig::new(0.5, -0.1).is_err());
        assert!(ThresholdConfig::new(f64::NAN, 0.1).is_err());
    }

    #[test]
    fn test_bad_margin_rejected() {
        let config = ThresholdConfig {
            preload_margin: "lots".to_string(),
            ..ThresholdConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMargin { .. })));
    }

    #[test]
    fn test_observer_thresholds_sorted_and_unique() {
        let config = ThresholdConfig::new(0.75, 0.25).unwrap();
        assert_eq!(config.observer_thresholds(), vec![0.0, 0.25, 0.75]);

        let config = ThresholdConfig::new(0.5, 0.0).unwrap();
        assert_eq!(config.observer_thresholds(), vec![0.0, 0.5]);
    }

    #[test]
    fn test_app_config_serialization() {
        let mut config = AppConfig::default();
        config.intent_policy = IntentPolicy::LapseOnPlay;
        config.feed.block_autoplay = true;
        config.feed.failing_slots = vec![3, 7];
        config.thresholds.preload_margin = "10%".to_string();

        let serialized = serde_json::to_string(&config).expect("Failed to serialize config");
        let deserialized = AppConfig::from_json(&serialized).expect("Failed to deserialize config");

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_config_backward_compatibility() {
        // Older files only carried thresholds
        let old_config_json = r#"{
            "thresholds": {
                "play_threshold": 0.6,
                "pause_threshold": 0.1
            }
        }"#;

        let config = AppConfig::from_json(old_config_json).expect("Failed to parse old config");

        assert_eq!(config.thresholds.play_threshold, 0.6);
        assert_eq!(config.thresholds.preload_margin, "100px");
        assert_eq!(config.ready_timeout_ms, 5000);
        assert_eq!(config.feed, FeedConfig::default());
    }

    #[test]
    fn test_invalid_document_rejected() {
        let json = r#"{ "thresholds": { "play_threshold": 0.1, "pause_threshold": 0.3 } }"#;
        assert!(matches!(
            AppConfig::from_json(json),
            Err(ConfigError::InvertedThresholds { .. })
        ));
        assert!(matches!(AppConfig::from_json("not json"), Err(ConfigError::Malformed(_))));

        let wrong_type = r#"{ "ready_timeout_ms": "soon" }"#;
        assert!(matches!(AppConfig::from_json(wrong_type), Err(ConfigError::Malformed(_))));
    }
}
