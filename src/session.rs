// SPDX-License-Identifier: GPL-3.0-only

//! Capture session
//!
//! Owns the single camera binding and exposes one "take a photo" operation.
//!
//! ```text
//! Unbound ──► Binding ──► Bound ──► Capturing
//!    ▲                      │  ◄───────┘
//!    └──────── unbind ──────┘
//! ```
//!
//! [`CaptureSession::capture`] returns a future; the session stays in
//! `Capturing` until the caller feeds the result back through
//! [`CaptureSession::finish_capture`].

use crate::backends::camera::{CameraBinding, CameraHardware};
use crate::constants::{CAPTURE_EXTENSION, CAPTURE_PREFIX, CAPTURE_TIMESTAMP_FORMAT};
use crate::errors::{AppError, AppResult, BindError, CaptureError};
use chrono::{DateTime, Local};
use futures::future::BoxFuture;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unbound,
    Binding,
    Bound,
    Capturing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unbound => "unbound",
            SessionState::Binding => "binding",
            SessionState::Bound => "bound",
            SessionState::Capturing => "capturing",
        };
        f.write_str(name)
    }
}

/// A photo written to the private capture directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    pub file: PathBuf,
    pub captured_at: DateTime<Local>,
}

/// Outcome of exactly one [`CaptureSession::capture`] call
pub type CaptureResult = AppResult<CapturedPhoto>;

/// In-flight capture
pub type PendingCapture = BoxFuture<'static, CaptureResult>;

/// File name for a capture taken at `at`, e.g. `IMG_20240131_094500.jpg`
pub fn capture_file_name(at: &DateTime<Local>) -> String {
    format!(
        "{}{}.{}",
        CAPTURE_PREFIX,
        at.format(CAPTURE_TIMESTAMP_FORMAT),
        CAPTURE_EXTENSION
    )
}

pub struct CaptureSession {
    hardware: Arc<dyn CameraHardware>,
    binding: Option<Arc<dyn CameraBinding>>,
    state: SessionState,
    output_dir: PathBuf,
}

impl CaptureSession {
    pub fn new(hardware: Arc<dyn CameraHardware>, output_dir: PathBuf) -> Self {
        Self {
            hardware,
            binding: None,
            state: SessionState::Unbound,
            output_dir,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        self.state == SessionState::Bound
    }

    #[cfg(test)]
    pub(crate) fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    /// Acquire the camera, releasing any binding this session already holds
    pub fn bind(&mut self) -> Result<(), BindError> {
        if self.binding.is_some() {
            info!("Releasing previous camera binding before rebinding");
            self.release_binding();
        }

        self.transition(SessionState::Binding);
        match self.hardware.open() {
            Ok(binding) => {
                self.binding = Some(Arc::from(binding));
                self.transition(SessionState::Bound);
                info!("Camera bound");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Camera binding failed");
                self.transition(SessionState::Unbound);
                Err(e)
            }
        }
    }

    /// Release the camera
    pub fn unbind(&mut self) {
        self.release_binding();
        self.transition(SessionState::Unbound);
    }

    /// Take one photo
    ///
    /// Outside `Bound` the returned future resolves straight to
    /// [`BindError::NotBound`].
    pub fn capture(&mut self) -> PendingCapture {
        let binding = match (&self.binding, self.state) {
            (Some(binding), SessionState::Bound) => Arc::clone(binding),
            (_, state) => {
                warn!(state = %state, "Capture requested while not bound");
                let err = AppError::from(BindError::NotBound(state));
                return Box::pin(futures::future::ready(Err(err)));
            }
        };

        let captured_at = Local::now();
        let output_dir = self.output_dir.clone();
        let file = output_dir.join(capture_file_name(&captured_at));
        self.transition(SessionState::Capturing);
        info!(path = %file.display(), "Capturing photo");

        Box::pin(async move {
            tokio::fs::create_dir_all(&output_dir)
                .await
                .map_err(CaptureError::from)?;
            binding.take_picture(&file).await?;
            Ok::<_, AppError>(CapturedPhoto { file, captured_at })
        })
    }

    /// Return from `Capturing` once the capture result has been delivered
    pub fn finish_capture(&mut self, result: &CaptureResult) {
        if self.state != SessionState::Capturing {
            warn!(state = %self.state, "Capture result delivered outside a capture");
            return;
        }

        let lost = matches!(result, Err(AppError::Capture(CaptureError::BindingLost)))
            || !self.binding.as_ref().is_some_and(|b| b.is_active());
        if lost {
            warn!("Camera binding lost during capture");
            self.release_binding();
            self.transition(SessionState::Unbound);
        } else {
            self.transition(SessionState::Bound);
        }
    }

    fn release_binding(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.release();
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "Session state change");
        self.state = next;
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release_binding();
    }
}
