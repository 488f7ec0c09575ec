// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture-and-handoff workflow

use lens_capture::backends::share::ShareTarget;
use lens_capture::constants::{CHOOSER_TITLE, GENERAL_SEARCH_APP, LENS_STANDALONE};
use lens_capture::errors::{BindError, CaptureError};
use lens_capture::permission::PermissionState;
use lens_capture::session::SessionState;
use lens_capture::testing::{
    Event, EventLog, FakeAccess, FakeCamera, FakeLauncher, fake_platform, settle,
};
use lens_capture::{Config, HandoffTarget, Message, Notice, Orchestrator};

struct Harness {
    log: EventLog,
    orchestrator: Orchestrator,
    _dir: tempfile::TempDir,
}

fn harness(
    log: EventLog,
    access: FakeAccess,
    camera: FakeCamera,
    launcher: FakeLauncher,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        cache_dir: Some(dir.path().join("cache")),
        ..Config::default()
    };
    let platform = fake_platform(&log, access, camera, launcher);
    Harness {
        orchestrator: Orchestrator::new(&config, platform),
        log,
        _dir: dir,
    }
}

/// Authorized camera, working hardware, `installed` applications
fn ready(installed: &[&str]) -> Harness {
    let log = EventLog::default();
    harness(
        log.clone(),
        FakeAccess::new(log.clone(), true, true),
        FakeCamera::new(log.clone()),
        FakeLauncher::new(log).with_installed(installed),
    )
}

fn position(events: &[Event], wanted: &Event) -> usize {
    events
        .iter()
        .position(|e| e == wanted)
        .unwrap_or_else(|| panic!("{:?} not in {:?}", wanted, events))
}

#[tokio::test]
async fn scenario_a_grant_then_scoped_dispatch_then_success() {
    let mut h = ready(&[GENERAL_SEARCH_APP]);
    settle(&mut h.orchestrator, Message::Start).await;
    settle(&mut h.orchestrator, Message::CaptureRequested).await;

    let events = h.log.events();
    let grant = position(&events, &Event::Granted(GENERAL_SEARCH_APP.into()));
    let send = position(
        &events,
        &Event::Sent(ShareTarget::Application(GENERAL_SEARCH_APP.into())),
    );
    let notice = position(
        &events,
        &Event::Notified(Notice::HandoffSent(HandoffTarget::Candidate(
            GENERAL_SEARCH_APP.into(),
        ))),
    );
    assert!(grant < send && send < notice);
    assert_eq!(h.log.notices().len(), 1);

    let taken: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::PictureTaken(path) => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(taken.len(), 1);
    assert!(taken[0].exists());
    assert_eq!(h.orchestrator.session_state(), SessionState::Bound);
}

#[tokio::test]
async fn scenario_b_denied_requests_again_without_binding() {
    let log = EventLog::default();
    let mut h = harness(
        log.clone(),
        FakeAccess::new(log.clone(), false, false),
        FakeCamera::new(log.clone()),
        FakeLauncher::new(log.clone()).with_installed(&[LENS_STANDALONE]),
    );
    settle(&mut h.orchestrator, Message::Start).await;
    assert_eq!(h.orchestrator.permission_state(), PermissionState::Denied);
    assert_eq!(h.log.notices(), vec![Notice::PermissionDenied]);

    let task = h.orchestrator.update(Message::CaptureRequested);
    assert!(!task.is_none(), "authorization prompt expected");
    assert_eq!(h.orchestrator.permission_state(), PermissionState::Requested);
    // Nothing new until the answer arrives
    assert_eq!(h.log.notices().len(), 1);

    let answer = task.into_future().unwrap().await;
    let _ = h.orchestrator.update(answer);

    assert_eq!(
        h.log.notices(),
        vec![Notice::PermissionDenied, Notice::PermissionDenied]
    );
    assert_eq!(h.log.count(|e| *e == Event::AuthorizationRequested), 2);
    assert_eq!(h.log.count(|e| *e == Event::CameraOpened), 0);
    assert_eq!(h.log.count(|e| matches!(e, Event::PictureTaken(_))), 0);
}

#[tokio::test]
async fn scenario_c_no_candidate_uses_chooser_and_still_succeeds() {
    let mut h = ready(&[]);
    settle(&mut h.orchestrator, Message::Start).await;
    settle(&mut h.orchestrator, Message::CaptureRequested).await;

    assert_eq!(h.log.count(|e| matches!(e, Event::Granted(_))), 0);
    assert_eq!(
        h.log.count(|e| *e
            == Event::Sent(ShareTarget::Chooser {
                title: CHOOSER_TITLE.into()
            })),
        1
    );
    assert_eq!(
        h.log.notices(),
        vec![Notice::HandoffSent(HandoffTarget::Chooser)]
    );
}

#[tokio::test]
async fn scenario_d_storage_failure_stops_before_publish() {
    let log = EventLog::default();
    let mut h = harness(
        log.clone(),
        FakeAccess::new(log.clone(), true, true),
        FakeCamera::new(log.clone())
            .failing_capture(CaptureError::Storage("storage full".into())),
        FakeLauncher::new(log).with_installed(&[LENS_STANDALONE]),
    );
    settle(&mut h.orchestrator, Message::CaptureRequested).await;

    let notices = h.log.notices();
    assert_eq!(notices, vec![Notice::CaptureFailed("storage full".into())]);
    assert_eq!(notices[0].to_string(), "Capture failed: storage full");
    assert_eq!(
        h.log.count(|e| matches!(
            e,
            Event::Exposed(_) | Event::Granted(_) | Event::Sent(_)
        )),
        0
    );
    assert_eq!(h.orchestrator.session_state(), SessionState::Bound);
}

#[tokio::test]
async fn concurrent_capture_request_is_ignored() {
    let mut h = ready(&[LENS_STANDALONE]);
    settle(&mut h.orchestrator, Message::Start).await;

    let first = h.orchestrator.update(Message::CaptureRequested);
    assert!(h.orchestrator.is_capturing());
    let second = h.orchestrator.update(Message::CaptureRequested);
    assert!(second.is_none());

    let result = first.into_future().unwrap().await;
    let _ = h.orchestrator.update(result);

    assert_eq!(h.log.count(|e| matches!(e, Event::PictureTaken(_))), 1);
    assert_eq!(h.log.notices().len(), 1);
    assert!(!h.orchestrator.is_capturing());
}

#[tokio::test]
async fn grant_mid_attempt_binds_but_waits_for_retry() {
    let log = EventLog::default();
    let mut h = harness(
        log.clone(),
        FakeAccess::new(log.clone(), false, true),
        FakeCamera::new(log.clone()),
        FakeLauncher::new(log).with_installed(&[LENS_STANDALONE]),
    );
    settle(&mut h.orchestrator, Message::CaptureRequested).await;

    assert_eq!(h.orchestrator.permission_state(), PermissionState::Granted);
    assert_eq!(h.orchestrator.session_state(), SessionState::Bound);
    assert_eq!(h.log.count(|e| matches!(e, Event::PictureTaken(_))), 0);
    assert!(h.log.notices().is_empty());

    settle(&mut h.orchestrator, Message::CaptureRequested).await;
    assert_eq!(h.log.count(|e| matches!(e, Event::PictureTaken(_))), 1);
}

#[tokio::test]
async fn bind_failure_is_reported_once_on_capture() {
    let log = EventLog::default();
    let mut h = harness(
        log.clone(),
        FakeAccess::new(log.clone(), true, true),
        FakeCamera::new(log.clone()).failing_open(BindError::Busy),
        FakeLauncher::new(log),
    );
    settle(&mut h.orchestrator, Message::Start).await;
    assert!(h.log.notices().is_empty());

    settle(&mut h.orchestrator, Message::CaptureRequested).await;
    let notices = h.log.notices();
    assert_eq!(notices.len(), 1);
    assert!(matches!(notices[0], Notice::CaptureFailed(_)));
    assert_eq!(h.orchestrator.session_state(), SessionState::Unbound);
}

#[tokio::test]
async fn handoff_failure_shows_only_failure_notice() {
    let log = EventLog::default();
    let mut h = harness(
        log.clone(),
        FakeAccess::new(log.clone(), true, true),
        FakeCamera::new(log.clone()),
        FakeLauncher::new(log)
            .with_installed(&[LENS_STANDALONE])
            .failing_send(),
    );
    settle(&mut h.orchestrator, Message::CaptureRequested).await;

    let notices = h.log.notices();
    assert_eq!(notices.len(), 1);
    assert!(matches!(notices[0], Notice::HandoffFailed(_)));
    assert_eq!(notices[0].to_string(), "Failed to open Lens");
}

#[tokio::test]
async fn lost_binding_fails_capture_and_unbinds() {
    let log = EventLog::default();
    let mut h = harness(
        log.clone(),
        FakeAccess::new(log.clone(), true, true),
        FakeCamera::new(log.clone()).failing_capture(CaptureError::BindingLost),
        FakeLauncher::new(log),
    );
    settle(&mut h.orchestrator, Message::CaptureRequested).await;

    assert_eq!(
        h.log.notices(),
        vec![Notice::CaptureFailed("camera binding lost".into())]
    );
    assert_eq!(h.orchestrator.session_state(), SessionState::Unbound);
}

#[tokio::test]
async fn file_removed_before_publish_is_reported() {
    let mut h = ready(&[LENS_STANDALONE]);
    let task = h.orchestrator.update(Message::CaptureRequested);
    let result = task.into_future().unwrap().await;

    let Message::CaptureCompleted(Ok(photo)) = &result else {
        panic!("expected a completed capture, got {:?}", result);
    };
    std::fs::remove_file(&photo.file).unwrap();
    let _ = h.orchestrator.update(result);

    let notices = h.log.notices();
    assert_eq!(notices.len(), 1);
    assert!(matches!(notices[0], Notice::CaptureFailed(_)));
    assert_eq!(h.log.count(|e| matches!(e, Event::Sent(_))), 0);
}

#[tokio::test]
async fn gallery_opens_or_reports_missing_viewer() {
    let mut h = ready(&[]);
    settle(&mut h.orchestrator, Message::OpenGallery).await;
    assert_eq!(h.log.count(|e| *e == Event::GalleryOpened), 1);
    assert!(h.log.notices().is_empty());

    let log = EventLog::default();
    let mut h = harness(
        log.clone(),
        FakeAccess::new(log.clone(), true, true),
        FakeCamera::new(log.clone()),
        FakeLauncher::new(log).without_gallery(),
    );
    settle(&mut h.orchestrator, Message::OpenGallery).await;
    assert_eq!(h.log.notices(), vec![Notice::GalleryUnavailable]);
    assert_eq!(h.log.notices()[0].to_string(), "No gallery app found");
}

#[tokio::test]
async fn shutdown_releases_camera() {
    let mut h = ready(&[]);
    settle(&mut h.orchestrator, Message::Start).await;
    settle(&mut h.orchestrator, Message::Shutdown).await;

    assert_eq!(
        h.log.events(),
        vec![Event::CameraOpened, Event::CameraReleased]
    );
    assert_eq!(h.orchestrator.session_state(), SessionState::Unbound);
}
