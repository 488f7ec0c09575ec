// SPDX-License-Identifier: GPL-3.0-only

//! Orchestrator state and message types

use crate::backends::Platform;
use crate::backends::notify::{Notice, Notifier};
use crate::backends::share::AppLauncher;
use crate::config::Config;
use crate::errors::AppError;
use crate::handoff::HandoffResolver;
use crate::permission::{PermissionGate, PermissionState};
use crate::publisher::AssetPublisher;
use crate::session::{CaptureResult, CaptureSession, SessionState};
use std::sync::Arc;
use tracing::{error, info};

/// User actions and delivered asynchronous results
#[derive(Debug)]
pub enum Message {
    /// Application launched: bind if authorized, otherwise ask
    Start,
    /// User pressed the capture button
    CaptureRequested,
    /// The OS answered an authorization prompt
    AuthorizationResolved(bool),
    /// A capture started by `CaptureRequested` finished
    CaptureCompleted(CaptureResult),
    /// User asked to browse the image store
    OpenGallery,
    /// Release the camera and stop the event loop
    Shutdown,
}

/// Sequences gate → session → capture → publish → handoff
///
/// The orchestrator is the only caller of each component. It handles one
/// message at a time; see [`Orchestrator::update`].
pub struct Orchestrator {
    pub(crate) gate: PermissionGate,
    pub(crate) session: CaptureSession,
    pub(crate) publisher: AssetPublisher,
    pub(crate) resolver: HandoffResolver,
    pub(crate) launcher: Arc<dyn AppLauncher>,
    pub(crate) notifier: Arc<dyn Notifier>,
    /// A capture future is out and its result not yet delivered
    pub(crate) capture_in_flight: bool,
}

impl Orchestrator {
    pub fn new(config: &Config, platform: Platform) -> Self {
        Self {
            gate: PermissionGate::new(platform.access),
            session: CaptureSession::new(platform.camera, config.capture_dir()),
            publisher: AssetPublisher::new(
                config.provider_authority.clone(),
                config.share_root.clone(),
                platform.access_control,
            ),
            resolver: HandoffResolver::new(
                config.candidates.clone(),
                config.chooser_title.clone(),
                Arc::clone(&platform.launcher),
            ),
            launcher: platform.launcher,
            notifier: platform.notifier,
            capture_in_flight: false,
        }
    }

    pub fn permission_state(&self) -> PermissionState {
        self.gate.state()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_capturing(&self) -> bool {
        self.capture_in_flight
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(&notice);
    }

    /// Turn a workflow error into its single notice
    pub(crate) fn report(&self, err: &AppError) {
        match err {
            AppError::PermissionDenied => info!("Camera authorization denied"),
            _ => error!(error = %err, "Capture workflow failed"),
        }
        self.notify(Notice::for_error(err));
    }
}
