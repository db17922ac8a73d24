#[cfg(test)]
mod playback_session_tests {
    use crate::common::{ResourceBuilder, TestSession, as_dyn};
    use trainreel::player::{
        AspectShape, DisplayMode, MediaErrorKind, MediaEvent, MediaResource, PlaybackRate,
        PlaybackStatus, PointerActivity, ResourceCommand, classify, reconcile,
    };
    use trainreel::utils::{FailureKind, PlayerError};

    const SHAPES: [AspectShape; 4] = [
        AspectShape::Square,
        AspectShape::Portrait,
        AspectShape::Landscape,
        AspectShape::Auto,
    ];

    #[test]
    fn test_classify_boundary_cases() {
        assert_eq!(classify(100, 100), AspectShape::Square);
        assert_eq!(classify(100, 95), AspectShape::Square);
        assert_eq!(classify(60, 100), AspectShape::Portrait);
        assert_eq!(classify(160, 90), AspectShape::Landscape);
        assert_eq!(classify(100, 83), AspectShape::Auto);
    }

    #[test]
    fn test_classify_is_total_and_deterministic() {
        for width in (1..=400).step_by(13) {
            for height in (1..=400).step_by(17) {
                let first = classify(width, height);
                assert!(SHAPES.contains(&first));
                assert_eq!(first, classify(width, height));
            }
        }
    }

    #[test]
    fn test_reconcile_forced_rule() {
        for shape in SHAPES {
            let auto = reconcile(shape, DisplayMode::Auto);
            assert!(!auto.forced);
            assert_eq!(auto.effective, shape);

            for mode in DisplayMode::ALL {
                let reconciled = reconcile(shape, mode);
                let expected = match mode.pinned_shape() {
                    Some(pinned) => pinned != shape,
                    None => false,
                };
                assert_eq!(reconciled.forced, expected, "{} with {}", shape, mode);
            }
        }
    }

    #[test]
    fn test_portrait_clip_with_display_preference() {
        let mut test = TestSession::attach(ResourceBuilder::sized(1080, 1920).build());
        test.resource.load_metadata();
        test.acknowledge(test.started);

        assert_eq!(test.session.shape(), AspectShape::Portrait);

        test.session.set_display_mode(DisplayMode::Landscape);
        let snapshot = test.session.snapshot(test.started);
        assert_eq!(snapshot.effective_mode, AspectShape::Landscape);
        assert!(snapshot.forced);

        test.session.set_display_mode(DisplayMode::Auto);
        let snapshot = test.session.snapshot(test.started);
        assert_eq!(snapshot.effective_mode, AspectShape::Portrait);
        assert!(!snapshot.forced);
        assert_eq!(snapshot.shape, AspectShape::Portrait);
    }

    #[test]
    fn test_click_on_track_seeks_and_acknowledges() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().with_duration(120.0).build());
        test.resource.load_metadata();
        test.acknowledge(test.started);

        assert_eq!(test.session.seek(0.5), Ok(Some(60.0)));
        assert_eq!(test.resource.commands(), vec![ResourceCommand::SeekTo(60.0)]);

        test.acknowledge(test.at(10));
        assert_eq!(test.session.playback_state().current_time, 60.0);
    }

    #[test]
    fn test_seek_clamps_to_media() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().with_duration(90.0).build());
        test.resource.load_metadata();
        test.acknowledge(test.started);

        assert_eq!(test.session.seek(-0.5), Ok(Some(0.0)));
        assert_eq!(test.session.seek(1.5), Ok(Some(90.0)));
        assert_eq!(test.session.seek_from_track(-40.0, 200.0), Ok(Some(0.0)));
        assert_eq!(test.session.seek_from_track(500.0, 200.0), Ok(Some(90.0)));
    }

    #[test]
    fn test_seek_before_metadata_is_noop() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().build());
        let before = test.session.playback_state();

        assert_eq!(test.session.seek(0.5), Ok(None));
        assert_eq!(test.session.skip_forward(), Ok(None));
        assert!(test.resource.commands().is_empty());

        test.acknowledge(test.at(5));
        assert_eq!(test.session.playback_state(), before);
    }

    #[test]
    fn test_non_finite_seek_is_rejected() {
        let test = TestSession::attach(ResourceBuilder::landscape().loaded().build());
        assert!(matches!(
            test.session.seek(f64::NAN),
            Err(PlayerError::InvalidArgument(_))
        ));
        assert!(test.resource.commands().is_empty());
    }

    #[test]
    fn test_double_toggle_before_acknowledgement() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().loaded().build());

        test.session.toggle_play_pause().unwrap();
        test.session.toggle_play_pause().unwrap();
        assert_eq!(
            test.resource.commands(),
            vec![ResourceCommand::Play, ResourceCommand::Pause]
        );

        test.acknowledge(test.at(50));
        assert!(!test.session.playback_state().is_playing);
        assert!(test.session.visibility().controls_visible);
        assert_eq!(test.session.next_deadline(), None);
    }

    #[test]
    fn test_visibility_follows_playback_and_pointer() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().loaded().build());
        test.session.toggle_play_pause().unwrap();
        test.acknowledge(test.started);

        assert_eq!(test.session.next_deadline(), Some(test.at(3000)));

        test.session
            .on_pointer(PointerActivity::Moved { x: 30.0, y: 40.0 }, test.at(2000));
        assert_eq!(test.session.next_deadline(), Some(test.at(5000)));
        assert!(!test.session.poll_timers(test.at(3000)));
        assert!(test.session.visibility().controls_visible);

        assert!(test.session.poll_timers(test.at(5000)));
        assert!(!test.session.visibility().controls_visible);

        test.session.on_pointer(PointerActivity::Entered, test.at(6000));
        assert!(test.session.visibility().controls_visible);

        test.session.toggle_play_pause().unwrap();
        test.acknowledge(test.at(6500));
        assert_eq!(test.session.next_deadline(), None);
        assert!(!test.session.poll_timers(test.at(600_000)));
        assert!(test.session.visibility().controls_visible);
    }

    #[test]
    fn test_zero_volume_mutes_and_mute_keeps_volume() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().loaded().build());

        assert_eq!(test.session.set_volume(0.4), Ok(0.4));
        test.acknowledge(test.started);
        assert!(!test.session.playback_state().is_muted);

        assert_eq!(test.session.toggle_mute(), Ok(true));
        test.acknowledge(test.started);
        let state = test.session.playback_state();
        assert!(state.is_muted);
        assert_eq!(state.volume, 0.4);

        assert_eq!(test.session.set_volume(0.0), Ok(0.0));
        test.acknowledge(test.started);
        assert!(test.session.playback_state().is_muted);

        assert_eq!(test.session.set_volume(0.7), Ok(0.7));
        test.acknowledge(test.started);
        let state = test.session.playback_state();
        assert!(!state.is_muted);
        assert_eq!(state.volume, 0.7);
    }

    #[test]
    fn test_rate_outside_offered_set_is_rejected() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().loaded().build());

        assert!(matches!(
            test.session.set_playback_rate(1.3),
            Err(PlayerError::InvalidArgument(_))
        ));
        assert!(test.resource.commands().is_empty());

        assert_eq!(test.session.set_playback_rate(1.5), Ok(PlaybackRate::OneAndHalf));
        test.acknowledge(test.started);
        assert_eq!(
            test.session.playback_state().playback_rate,
            PlaybackRate::OneAndHalf
        );
    }

    #[test]
    fn test_fullscreen_without_platform_support() {
        let test = TestSession::attach(
            ResourceBuilder::landscape()
                .loaded()
                .without_fullscreen()
                .build(),
        );
        let before = test.session.playback_state();

        assert!(matches!(
            test.session.toggle_fullscreen(),
            Err(PlayerError::UnsupportedOperation(_))
        ));
        assert_eq!(test.session.playback_state(), before);
        assert!(test.resource.commands().is_empty());
    }

    #[test]
    fn test_fullscreen_round_trip() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().loaded().build());

        test.session.toggle_fullscreen().unwrap();
        test.acknowledge(test.started);
        assert!(test.session.playback_state().is_fullscreen);

        test.session.toggle_fullscreen().unwrap();
        test.acknowledge(test.started);
        assert!(!test.session.playback_state().is_fullscreen);
    }

    #[test]
    fn test_skip_clamps_into_media() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().with_duration(30.0).loaded().build());

        assert_eq!(test.session.skip_backward(), Ok(Some(0.0)));
        assert_eq!(test.session.seek_to_time(25.0), Ok(Some(25.0)));
        assert_eq!(test.session.skip_forward(), Ok(Some(30.0)));
        test.acknowledge(test.started);
        assert_eq!(test.session.playback_state().current_time, 30.0);
    }

    #[test]
    fn test_time_updates_last_write_wins() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().loaded().build());
        test.session.toggle_play_pause().unwrap();
        test.resource.advance(1.0);
        test.resource.advance(1.0);
        test.resource.advance(1.5);

        test.acknowledge(test.started);
        assert_eq!(test.session.playback_state().current_time, 3.5);
    }

    #[test]
    fn test_unknown_and_buffering_notifications() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().loaded().build());
        let before = test.session.playback_state();

        test.resource.emit(MediaEvent::Other("ratechange-hint".to_string()));
        test.acknowledge(test.started);
        assert_eq!(test.session.playback_state(), before);

        test.resource.start_buffering();
        test.acknowledge(test.started);
        assert!(test.session.playback_state().is_buffering);

        test.resource.end_buffering();
        test.acknowledge(test.started);
        assert!(!test.session.playback_state().is_buffering);
    }

    #[test]
    fn test_failure_after_start_is_terminal() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().loaded().build());
        test.session.toggle_play_pause().unwrap();
        test.acknowledge(test.started);

        test.resource.fail(MediaErrorKind::Decode);
        test.resource.emit(MediaEvent::Started);
        test.acknowledge(test.at(100));

        assert_eq!(
            test.session.status(),
            PlaybackStatus::Failed(FailureKind::PlaybackFailed)
        );
        assert!(!test.session.playback_state().is_playing);
        assert_eq!(
            test.session.toggle_play_pause(),
            Err(PlayerError::PlaybackFailed)
        );
    }

    #[test]
    fn test_failure_before_start_means_unavailable() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().build());
        test.resource.fail(MediaErrorKind::SourceNotSupported);
        test.acknowledge(test.started);

        assert_eq!(
            test.session.status(),
            PlaybackStatus::Failed(FailureKind::ResourceUnavailable)
        );
        assert_eq!(test.session.seek(0.2), Err(PlayerError::ResourceUnavailable));
    }

    #[test]
    fn test_reattach_recovers_from_failure() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().build());
        test.resource.fail(MediaErrorKind::Network);
        test.acknowledge(test.started);
        assert!(matches!(test.session.status(), PlaybackStatus::Failed(_)));

        let fresh = ResourceBuilder::portrait().loaded().build();
        test.session.attach(&as_dyn(&fresh), test.at(10));
        assert_eq!(test.session.status(), PlaybackStatus::Ready);
        assert_eq!(test.session.shape(), AspectShape::Portrait);
        assert_eq!(test.resource.subscriber_count(), 0);
        assert_eq!(fresh.subscriber_count(), 1);
    }

    #[test]
    fn test_snapshot_serializes_for_rendering() {
        let mut test = TestSession::attach(ResourceBuilder::sized(900, 900).loaded().build());
        test.session.toggle_play_pause().unwrap();
        test.acknowledge(test.started);

        let json = serde_json::to_value(test.session.snapshot(test.at(500))).unwrap();
        assert_eq!(json["status"]["status"], "ready");
        assert_eq!(json["shape"], "square");
        assert_eq!(json["effective_mode"], "square");
        assert_eq!(json["forced"], false);
        assert_eq!(json["playback"]["is_playing"], true);
        assert_eq!(json["visibility"]["controls_visible"], true);
        assert_eq!(json["hide_in_ms"], 2500);
    }

    #[test]
    fn test_playing_to_the_end_stops_and_keeps_controls() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().with_duration(5.0).loaded().build());
        test.session.toggle_play_pause().unwrap();
        test.acknowledge(test.started);
        assert_eq!(test.session.next_deadline(), Some(test.at(3000)));

        test.resource.advance(10.0);
        test.acknowledge(test.at(1000));

        let state = test.session.playback_state();
        assert!(!state.is_playing);
        assert_eq!(state.current_time, 5.0);
        assert_eq!(test.session.next_deadline(), None);
        assert!(test.session.visibility().controls_visible);
        assert_eq!(test.session.status(), PlaybackStatus::Ready);

        let snapshot = test.session.snapshot(test.at(1000));
        assert_eq!(snapshot.progress, 1.0);
        assert_eq!(snapshot.hide_in_ms, None);
    }

    #[test]
    fn test_host_rate_outside_offered_set_shows_nearest() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().loaded().build());

        test.resource.set_playback_rate(1.1);
        test.acknowledge(test.started);
        assert_eq!(
            test.session.snapshot(test.started).playback.playback_rate,
            PlaybackRate::Normal
        );

        test.resource.set_playback_rate(1.9);
        test.acknowledge(test.started);
        assert_eq!(
            test.session.playback_state().playback_rate,
            PlaybackRate::Double
        );
    }

    #[test]
    fn test_progress_and_hover_preview() {
        let mut test = TestSession::attach(ResourceBuilder::landscape().with_duration(130.0).build());
        assert_eq!(test.session.preview(150.0, 300.0), None);
        assert_eq!(test.session.snapshot(test.started).progress, 0.0);

        test.resource.load_metadata();
        test.acknowledge(test.started);
        assert_eq!(test.session.preview(150.0, 300.0), Some("1:05".to_string()));
        assert_eq!(test.session.preview(150.0, 0.0), None);

        test.session.seek_to_time(32.5).unwrap();
        test.acknowledge(test.started);
        assert_eq!(test.session.snapshot(test.started).progress, 0.25);
    }
}
