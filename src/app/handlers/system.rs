// SPDX-License-Identifier: GPL-3.0-only

//! System handlers
//!
//! Handles the gallery action and shutdown.

use crate::app::state::Orchestrator;
use crate::app::task::Task;
use crate::backends::notify::Notice;
use tracing::{error, info};

impl Orchestrator {
    pub(crate) fn handle_open_gallery(&self) -> Task {
        match self.launcher.view_gallery() {
            Ok(()) => info!("Gallery opened successfully"),
            Err(e) => {
                error!(error = %e, "Failed to open gallery");
                self.notify(Notice::GalleryUnavailable);
            }
        }
        Task::none()
    }

    pub(crate) fn handle_shutdown(&mut self) -> Task {
        info!("Shutting down, releasing camera");
        self.session.unbind();
        Task::none()
    }
}
