// SPDX-License-Identifier: GPL-3.0-only

//! Recording fakes for every platform capability
//!
//! Each fake appends to a shared [`EventLog`], so tests can assert on the
//! order in which the workflow touched the platform.

use crate::app::{Message, Orchestrator};
use crate::backends::Platform;
use crate::backends::access::CameraAccess;
use crate::backends::camera::{CameraBinding, CameraHardware};
use crate::backends::notify::{Notice, Notifier};
use crate::backends::share::{AccessControl, AppLauncher, ShareAction, ShareTarget};
use crate::errors::{BindError, CaptureError, DispatchError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Minimal JPEG written by [`FakeCamera`]
pub const FAKE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    AuthorizationRequested,
    CameraOpened,
    CameraReleased,
    PictureTaken(PathBuf),
    Exposed(String),
    Granted(String),
    Sent(ShareTarget),
    GalleryOpened,
    Notified(Notice),
}

#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        if let Ok(mut events) = self.0.lock() {
            events.push(event);
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Notified(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

/// Authorization with a fixed OS status and a scripted prompt answer
pub struct FakeAccess {
    log: EventLog,
    granted: AtomicBool,
    prompt_answer: bool,
}

impl FakeAccess {
    pub fn new(log: EventLog, os_granted: bool, prompt_answer: bool) -> Self {
        Self {
            log,
            granted: AtomicBool::new(os_granted),
            prompt_answer,
        }
    }
}

#[async_trait]
impl CameraAccess for FakeAccess {
    fn is_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    async fn request(&self) -> bool {
        self.log.push(Event::AuthorizationRequested);
        self.granted.store(self.prompt_answer, Ordering::SeqCst);
        self.prompt_answer
    }
}

/// Camera that writes [`FAKE_JPEG`] instead of talking to a driver
pub struct FakeCamera {
    log: EventLog,
    open_error: Option<BindError>,
    capture_error: Option<CaptureError>,
}

impl FakeCamera {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            open_error: None,
            capture_error: None,
        }
    }

    pub fn failing_open(mut self, err: BindError) -> Self {
        self.open_error = Some(err);
        self
    }

    pub fn failing_capture(mut self, err: CaptureError) -> Self {
        self.capture_error = Some(err);
        self
    }
}

impl CameraHardware for FakeCamera {
    fn open(&self) -> Result<Box<dyn CameraBinding>, BindError> {
        if let Some(err) = &self.open_error {
            return Err(err.clone());
        }
        self.log.push(Event::CameraOpened);
        Ok(Box::new(FakeBinding {
            log: self.log.clone(),
            capture_error: self.capture_error.clone(),
            active: AtomicBool::new(true),
        }))
    }
}

struct FakeBinding {
    log: EventLog,
    capture_error: Option<CaptureError>,
    active: AtomicBool,
}

#[async_trait]
impl CameraBinding for FakeBinding {
    async fn take_picture(&self, path: &Path) -> Result<(), CaptureError> {
        if !self.is_active() {
            return Err(CaptureError::BindingLost);
        }
        if let Some(err) = &self.capture_error {
            return Err(err.clone());
        }
        std::fs::write(path, FAKE_JPEG)?;
        self.log.push(Event::PictureTaken(path.to_path_buf()));
        Ok(())
    }

    fn release(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.log.push(Event::CameraReleased);
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Access control that only records what it was asked to do
pub struct RecordingAccess {
    log: EventLog,
}

impl RecordingAccess {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl AccessControl for RecordingAccess {
    fn expose(&self, reference: &str, _source: &Path) {
        self.log.push(Event::Exposed(reference.to_string()));
    }

    fn grant_read(&self, _reference: &str, _source: &Path, application: &str) {
        self.log.push(Event::Granted(application.to_string()));
    }
}

/// Launcher with a scripted set of installed applications
pub struct FakeLauncher {
    log: EventLog,
    installed: Vec<String>,
    chooser: bool,
    fail_send: bool,
    gallery: bool,
}

impl FakeLauncher {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            installed: Vec::new(),
            chooser: true,
            fail_send: false,
            gallery: true,
        }
    }

    pub fn with_installed(mut self, identifiers: &[&str]) -> Self {
        self.installed = identifiers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// The chooser finds no capable application
    pub fn without_chooser(mut self) -> Self {
        self.chooser = false;
        self
    }

    /// Every send fails to launch
    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn without_gallery(mut self) -> Self {
        self.gallery = false;
        self
    }
}

impl AppLauncher for FakeLauncher {
    fn can_handle(&self, identifier: &str, _mime: &str) -> bool {
        self.installed.iter().any(|i| i == identifier)
    }

    fn send(&self, action: &ShareAction) -> Result<(), DispatchError> {
        self.log.push(Event::Sent(action.target.clone()));
        if self.fail_send {
            let target = match &action.target {
                ShareTarget::Application(id) => id.clone(),
                ShareTarget::Chooser { title } => title.clone(),
            };
            return Err(DispatchError::Launch {
                target,
                reason: "simulated launch failure".to_string(),
            });
        }
        match action.target {
            ShareTarget::Chooser { .. } if !self.chooser => {
                Err(DispatchError::NoHandler(action.mime.clone()))
            }
            _ => Ok(()),
        }
    }

    fn view_gallery(&self) -> Result<(), DispatchError> {
        if !self.gallery {
            return Err(DispatchError::NoHandler("inode/directory".to_string()));
        }
        self.log.push(Event::GalleryOpened);
        Ok(())
    }
}

pub struct RecordingNotifier {
    log: EventLog,
}

impl RecordingNotifier {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.log.push(Event::Notified(notice.clone()));
    }
}

/// Forwards notices to a channel so async tests can wait for them
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: &Notice) {
        let _ = self.tx.send(notice.clone());
    }
}

/// Platform made of fakes, all recording to `log`
pub fn fake_platform(
    log: &EventLog,
    access: FakeAccess,
    camera: FakeCamera,
    launcher: FakeLauncher,
) -> Platform {
    Platform {
        access: Arc::new(access),
        camera: Arc::new(camera),
        access_control: Arc::new(RecordingAccess::new(log.clone())),
        launcher: Arc::new(launcher),
        notifier: Arc::new(RecordingNotifier::new(log.clone())),
    }
}

/// Handle `message` and every message its tasks produce, in order
pub async fn settle(orchestrator: &mut Orchestrator, message: Message) {
    let mut queue = VecDeque::from([message]);
    while let Some(message) = queue.pop_front() {
        if let Some(future) = orchestrator.update(message).into_future() {
            queue.push_back(future.await);
        }
    }
}
