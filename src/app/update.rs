// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function acts as a dispatcher, while specific handlers
//! are implemented in the `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::permission`: Startup and authorization results
//! - `handlers::capture`: Capture requests and capture results
//! - `handlers::system`: Gallery and shutdown

use super::state::{Message, Orchestrator};
use super::task::Task;
use tracing::debug;

impl Orchestrator {
    /// Main message handler - routes messages to the appropriate handler.
    ///
    /// Never blocks: asynchronous work comes back as a [`Task`] whose output
    /// is the next message.
    pub fn update(&mut self, message: Message) -> Task {
        debug!(message = ?message, "Handling message");
        match message {
            // ===== Permission =====
            Message::Start => self.handle_start(),
            Message::AuthorizationResolved(granted) => self.handle_authorization_resolved(granted),

            // ===== Capture =====
            Message::CaptureRequested => self.handle_capture_requested(),
            Message::CaptureCompleted(result) => self.handle_capture_completed(result),

            // ===== System =====
            Message::OpenGallery => self.handle_open_gallery(),
            Message::Shutdown => self.handle_shutdown(),
        }
    }
}
