// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Handles capture requests, capture results, and the publish/handoff steps
//! that follow a successful capture.

use crate::app::state::{Message, Orchestrator};
use crate::app::task::Task;
use crate::backends::notify::Notice;
use crate::errors::{AppError, AppResult};
use crate::handoff::HandoffTarget;
use crate::session::{CaptureResult, CapturedPhoto};
use tracing::{info, warn};

impl Orchestrator {
    pub(crate) fn handle_capture_requested(&mut self) -> Task {
        if self.capture_in_flight {
            warn!("Capture already in progress, ignoring request");
            return Task::none();
        }

        if !self.gate.check_authorized() {
            // The user re-triggers capture once access is granted
            info!("Camera not authorized, requesting access");
            return self.request_authorization();
        }

        if let Err(e) = self.ensure_bound() {
            self.report(&AppError::Bind(e));
            return Task::none();
        }

        self.capture_in_flight = true;
        Task::perform(self.session.capture(), Message::CaptureCompleted)
    }

    pub(crate) fn handle_capture_completed(&mut self, result: CaptureResult) -> Task {
        if !self.capture_in_flight {
            warn!("Capture result delivered without a pending capture");
        }
        self.capture_in_flight = false;
        self.session.finish_capture(&result);

        match result.and_then(|photo| self.hand_off(photo)) {
            Ok(target) => {
                info!(target = %target, "Handoff complete");
                self.notify(Notice::HandoffSent(target));
            }
            Err(e) => self.report(&e),
        }
        Task::none()
    }

    /// Publish the capture and pass it to the best application
    fn hand_off(&self, photo: CapturedPhoto) -> AppResult<HandoffTarget> {
        info!(
            path = %photo.file.display(),
            captured_at = %photo.captured_at,
            "Photo captured"
        );

        let mut asset = self.publisher.publish(&photo.file)?;
        self.resolver.resolve_and_dispatch(&self.publisher, &mut asset)
    }
}
