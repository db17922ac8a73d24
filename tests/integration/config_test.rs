#[cfg(test)]
mod config_tests {
    use crate::common::fixtures::write_config;
    use crate::common::{ResourceBuilder, TestSession};
    use trainreel::config::Config;
    use trainreel::player::{AspectShape, DisplayMode, PointerActivity};

    #[test]
    fn test_config_drives_session_defaults() {
        let (_dir, path) = write_config(
            r#"
[controls]
idle_timeout_ms = 1500
pointer_move_threshold = 8.0

[playback]
skip_seconds = 5.0

[display]
default_mode = "square"
"#,
        );
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.playback.volume_step, 0.1);

        let mut test = TestSession::attach_with(
            ResourceBuilder::portrait().with_duration(60.0).loaded().build(),
            &config,
        );
        let snapshot = test.session.snapshot(test.started);
        assert_eq!(snapshot.preference, DisplayMode::Square);
        assert_eq!(snapshot.effective_mode, AspectShape::Square);
        assert!(snapshot.forced);

        assert_eq!(test.session.skip_forward(), Ok(Some(5.0)));

        test.session.toggle_play_pause().unwrap();
        test.acknowledge(test.started);
        assert_eq!(test.session.next_deadline(), Some(test.at(1500)));

        // below the jitter threshold
        test.session
            .on_pointer(PointerActivity::Moved { x: 10.0, y: 10.0 }, test.at(100));
        test.session
            .on_pointer(PointerActivity::Moved { x: 12.0, y: 12.0 }, test.at(900));
        assert_eq!(test.session.next_deadline(), Some(test.at(1600)));
    }

    #[test]
    fn test_saved_config_loads_back() {
        let (_dir, path) = write_config("");
        let mut config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());

        config.display.default_mode = DisplayMode::Portrait;
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
