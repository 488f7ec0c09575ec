// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the orchestrator event loop

use lens_capture::app;
use lens_capture::constants::LENS_STANDALONE;
use lens_capture::session::SessionState;
use lens_capture::testing::{
    ChannelNotifier, Event, EventLog, FakeAccess, FakeCamera, FakeLauncher, fake_platform,
};
use lens_capture::{Config, HandoffTarget, Notice, Orchestrator, Platform};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

fn orchestrator(
    log: &EventLog,
    dir: &tempfile::TempDir,
) -> (Orchestrator, UnboundedReceiver<Notice>) {
    let config = Config {
        cache_dir: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let (notifier, notices) = ChannelNotifier::new();
    let platform = Platform {
        notifier: Arc::new(notifier),
        ..fake_platform(
            log,
            FakeAccess::new(log.clone(), true, true),
            FakeCamera::new(log.clone()),
            FakeLauncher::new(log.clone()).with_installed(&[LENS_STANDALONE]),
        )
    };
    (Orchestrator::new(&config, platform), notices)
}

#[tokio::test]
async fn capture_through_event_loop_notifies_and_shuts_down() {
    let log = EventLog::default();
    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, mut notices) = orchestrator(&log, &dir);

    let (handle, join) = app::spawn(orchestrator);
    assert!(handle.request_capture());

    let notice = timeout(Duration::from_secs(5), notices.recv())
        .await
        .expect("notice within timeout")
        .expect("notifier alive");
    assert_eq!(
        notice,
        Notice::HandoffSent(HandoffTarget::Candidate(LENS_STANDALONE.into()))
    );

    assert!(handle.shutdown());
    let orchestrator = join.await.unwrap();
    assert_eq!(orchestrator.session_state(), SessionState::Unbound);
    assert_eq!(log.events().last(), Some(&Event::CameraReleased));
    assert!(!handle.request_capture(), "loop has stopped");
}

#[tokio::test]
async fn dropping_every_handle_stops_the_loop() {
    let log = EventLog::default();
    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, _notices) = orchestrator(&log, &dir);

    let (handle, join) = app::spawn(orchestrator);
    drop(handle);

    let orchestrator = timeout(Duration::from_secs(5), join)
        .await
        .expect("loop stops")
        .unwrap();
    assert_eq!(orchestrator.session_state(), SessionState::Unbound);
    assert_eq!(
        log.events(),
        vec![Event::CameraOpened, Event::CameraReleased]
    );
}
