//! Progress reporting tests
//!
//! All tests run on tokio's paused clock, so sleeps advance virtual time
//! instantly and ticks land exactly on their deadlines.

mod common;

use common::{track, uri, BackendControl, Call, RecordingObserver, Seen};
use deck_playback::{
    ChannelObserver, ControllerConfig, ObserverResult, PlaybackController, PlaybackEvent,
    PlaybackObserver, PlayerState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const INTERVAL: Duration = Duration::from_millis(500);

fn controller(control: &BackendControl) -> PlaybackController {
    PlaybackController::new(control.backend(), ControllerConfig::default()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_progress_follows_position() {
    let control = BackendControl::new();
    control.set_duration(&uri("Alpha"), Duration::from_millis(200));
    control.script_positions(&uri("Alpha"), &[0, 50, 100, 150, 200]);

    let controller = controller(&control);
    let observer = RecordingObserver::new();
    controller.subscribe(&observer);
    observer.clear();

    controller.play(Some(track("Alpha"))).unwrap();
    sleep(Duration::from_millis(2250)).await;

    assert_eq!(observer.states(), vec![PlayerState::Playing]);
    assert_eq!(observer.progress(), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    assert_eq!(controller.progress(), 100.0);

    let ticks: Vec<_> = observer
        .timed()
        .into_iter()
        .filter(|(_, seen)| matches!(seen, Seen::Progress(_)))
        .map(|(at, _)| at)
        .collect();
    for pair in ticks.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= INTERVAL, "tick gap {gap:?} shorter than interval");
        assert!(gap < INTERVAL + Duration::from_millis(5), "tick gap {gap:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_progress_is_clamped_and_zero_for_unknown_duration() {
    let control = BackendControl::new();
    control.set_duration(&uri("Alpha"), Duration::from_millis(200));
    control.script_positions(&uri("Alpha"), &[300]);
    control.script_positions(&uri("Beta"), &[1000]);

    let controller = controller(&control);
    let observer = RecordingObserver::new();
    controller.subscribe(&observer);
    observer.clear();

    controller.play(Some(track("Alpha"))).unwrap();
    sleep(Duration::from_millis(250)).await;
    assert_eq!(observer.progress(), vec![100.0]);

    observer.clear();
    controller.play(Some(track("Beta"))).unwrap();
    sleep(Duration::from_millis(250)).await;
    assert_eq!(observer.progress(), vec![0.0]);
}

#[tokio::test(start_paused = true)]
async fn test_custom_interval() {
    let control = BackendControl::new();
    let config = ControllerConfig {
        progress_interval_ms: 100,
    };
    let controller = PlaybackController::new(control.backend(), config).unwrap();
    let observer = RecordingObserver::new();
    controller.subscribe(&observer);
    observer.clear();

    controller.play(Some(track("Alpha"))).unwrap();
    sleep(Duration::from_millis(450)).await;

    assert_eq!(observer.progress().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_late_subscriber_sees_current_snapshot() {
    let control = BackendControl::new();
    control.set_duration(&uri("Alpha"), Duration::from_secs(100));
    control.script_positions(&uri("Alpha"), &[10_000, 20_000, 30_000, 40_000, 50_000]);

    let controller = controller(&control);
    let early = RecordingObserver::new();
    controller.subscribe(&early);
    early.clear();

    // Three transitions, then five ticks
    controller.play(Some(track("Alpha"))).unwrap();
    controller.pause();
    controller.play(None).unwrap();
    sleep(Duration::from_millis(2250)).await;

    assert_eq!(
        early.states(),
        vec![PlayerState::Playing, PlayerState::Paused, PlayerState::Playing]
    );
    assert_eq!(early.progress(), vec![10.0, 20.0, 30.0, 40.0, 50.0]);

    let late = RecordingObserver::new();
    controller.subscribe(&late);

    assert_eq!(
        late.seen(),
        vec![
            Seen::State(PlayerState::Playing),
            Seen::Track(Some(uri("Alpha"))),
            Seen::Progress(50.0),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_switch_never_reports_previous_track_progress() {
    let control = BackendControl::new();
    control.set_duration(&uri("Alpha"), Duration::from_secs(100));
    control.script_positions(&uri("Alpha"), &[90_000]);
    control.set_duration(&uri("Beta"), Duration::from_secs(100));
    control.script_positions(&uri("Beta"), &[10_000]);

    let controller = controller(&control);
    let observer = RecordingObserver::new();
    controller.subscribe(&observer);
    observer.clear();

    controller.play(Some(track("Alpha"))).unwrap();
    sleep(Duration::from_millis(1250)).await;
    controller.play(Some(track("Beta"))).unwrap();
    sleep(Duration::from_millis(1250)).await;

    let seen = observer.seen();
    let switch = seen
        .iter()
        .position(|s| *s == Seen::Track(Some(uri("Beta"))))
        .unwrap();

    assert!(seen[..switch].contains(&Seen::Progress(90.0)));
    for s in &seen[switch..] {
        assert_ne!(*s, Seen::Progress(90.0), "stale progress after switch");
    }
    assert_eq!(
        seen[switch + 1..]
            .iter()
            .filter(|s| matches!(s, Seen::Progress(_)))
            .count(),
        3
    );

    let stops_between_loads = control
        .calls()
        .iter()
        .skip_while(|c| **c != Call::Load(uri("Alpha")))
        .take_while(|c| **c != Call::Load(uri("Beta")))
        .filter(|c| **c == Call::Stop)
        .count();
    assert_eq!(stops_between_loads, 1);
    assert_eq!(controller.state(), PlayerState::Playing);
    assert_eq!(controller.selected_track(), Some(track("Beta")));
}

#[tokio::test(start_paused = true)]
async fn test_no_ticks_after_pause_or_stop() {
    let control = BackendControl::new();
    control.set_duration(&uri("Alpha"), Duration::from_secs(100));
    control.script_positions(&uri("Alpha"), &[5_000]);

    let controller = controller(&control);
    let observer = RecordingObserver::new();
    controller.subscribe(&observer);

    controller.play(Some(track("Alpha"))).unwrap();
    sleep(Duration::from_millis(1250)).await;
    controller.pause();
    observer.clear();

    sleep(Duration::from_secs(5)).await;
    assert!(observer.progress().is_empty());
    assert_eq!(controller.progress(), 0.0);

    controller.play(None).unwrap();
    sleep(Duration::from_millis(250)).await;
    assert_eq!(observer.progress(), vec![5.0]);

    controller.stop();
    observer.clear();
    sleep(Duration::from_secs(5)).await;
    assert!(observer.seen().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_samples_do_not_stop_reporting() {
    let control = BackendControl::new();
    control.set_duration(&uri("Alpha"), Duration::from_secs(100));
    control.script_positions(&uri("Alpha"), &[20_000]);
    control.fail_samples(2);

    let controller = controller(&control);
    let observer = RecordingObserver::new();
    controller.subscribe(&observer);
    observer.clear();

    controller.play(Some(track("Alpha"))).unwrap();
    sleep(Duration::from_millis(1750)).await;

    assert_eq!(observer.progress(), vec![20.0, 20.0]);
    assert_eq!(controller.state(), PlayerState::Playing);
    assert!(observer.errors().is_empty());
}

struct PanickingObserver;

impl PlaybackObserver for PanickingObserver {
    fn on_state(&self, _state: PlayerState) -> ObserverResult {
        Ok(())
    }

    fn on_progress(&self, _progress: f64) -> ObserverResult {
        panic!("progress bar unavailable");
    }
}

#[tokio::test(start_paused = true)]
async fn test_panicking_observer_does_not_starve_others() {
    let control = BackendControl::new();
    let controller = controller(&control);
    let panicking = Arc::new(PanickingObserver);
    let observer = RecordingObserver::new();

    controller.subscribe(&panicking);
    controller.subscribe(&observer);
    observer.clear();

    controller.play(Some(track("Alpha"))).unwrap();
    sleep(Duration::from_millis(1250)).await;

    assert_eq!(observer.progress().len(), 3);
    assert_eq!(controller.observer_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_controller_stops_polling() {
    let control = BackendControl::new();
    let controller = controller(&control);
    let observer = RecordingObserver::new();
    controller.subscribe(&observer);

    controller.play(Some(track("Alpha"))).unwrap();
    sleep(Duration::from_millis(250)).await;
    drop(controller);
    observer.clear();

    sleep(Duration::from_secs(5)).await;
    assert!(observer.seen().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_channel_observer_receives_event_stream() {
    let control = BackendControl::new();
    control.set_duration(&uri("Alpha"), Duration::from_secs(100));
    control.script_positions(&uri("Alpha"), &[50_000]);

    let controller = controller(&control);
    let (observer, mut events) = ChannelObserver::new();
    controller.subscribe(&observer);

    controller.play(Some(track("Alpha"))).unwrap();
    sleep(Duration::from_millis(250)).await;
    controller.stop();

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    assert_eq!(
        received,
        vec![
            PlaybackEvent::StateChanged {
                state: PlayerState::Stopped
            },
            PlaybackEvent::TrackChanged { track: None },
            PlaybackEvent::ProgressUpdated { progress: 0.0 },
            PlaybackEvent::TrackChanged {
                track: Some(track("Alpha"))
            },
            PlaybackEvent::StateChanged {
                state: PlayerState::Playing
            },
            PlaybackEvent::ProgressUpdated { progress: 50.0 },
            PlaybackEvent::StateChanged {
                state: PlayerState::Stopped
            },
            PlaybackEvent::TrackChanged { track: None },
        ]
    );
}
