// SPDX-License-Identifier: GPL-3.0-only

//! Permission handlers
//!
//! Handles startup and the delivery of authorization results.

use crate::app::state::{Message, Orchestrator};
use crate::app::task::Task;
use crate::errors::{AppError, BindError};
use crate::permission::PermissionState;
use tracing::warn;

impl Orchestrator {
    pub(crate) fn handle_start(&mut self) -> Task {
        if self.gate.check_authorized() {
            if let Err(e) = self.ensure_bound() {
                // Capture binds again on demand
                warn!(error = %e, "Camera not available at startup");
            }
            Task::none()
        } else {
            self.request_authorization()
        }
    }

    pub(crate) fn handle_authorization_resolved(&mut self, granted: bool) -> Task {
        match self.gate.on_authorization_result(granted) {
            PermissionState::Granted => {
                // Start the camera, but leave capturing to the user
                if let Err(e) = self.ensure_bound() {
                    warn!(error = %e, "Camera not available after authorization");
                }
            }
            _ => self.report(&AppError::PermissionDenied),
        }
        Task::none()
    }

    /// Ask the OS for camera access; the answer arrives as
    /// [`Message::AuthorizationResolved`]
    pub(crate) fn request_authorization(&mut self) -> Task {
        match self.gate.request_authorization() {
            Some(request) => Task::perform(request, Message::AuthorizationResolved),
            None => Task::none(),
        }
    }

    /// Bind the session unless it already holds the camera
    pub(crate) fn ensure_bound(&mut self) -> Result<(), BindError> {
        if self.session.is_bound() {
            return Ok(());
        }
        self.session.bind()
    }
}
