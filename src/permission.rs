// SPDX-License-Identifier: GPL-3.0-only

//! Camera authorization gate
//!
//! ```text
//! Unknown ──► Requested ──► Granted
//!                 ▲    └──► Denied
//!                 └──────────┘
//! ```
//!
//! The OS prompt itself is a [`CameraAccess`] capability. The gate only hands
//! the pending prompt back to its caller as a future; the outcome re-enters
//! through [`PermissionGate::on_authorization_result`].

use crate::backends::access::CameraAccess;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A pending OS authorization prompt, resolving to whether access was granted
pub type AuthorizationRequest = BoxFuture<'static, bool>;

/// Authorization state, process-wide for the lifetime of the gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionState {
    #[default]
    Unknown,
    Requested,
    Granted,
    Denied,
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PermissionState::Unknown => "unknown",
            PermissionState::Requested => "requested",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        };
        f.write_str(name)
    }
}

pub struct PermissionGate {
    access: Arc<dyn CameraAccess>,
    state: PermissionState,
}

impl PermissionGate {
    pub fn new(access: Arc<dyn CameraAccess>) -> Self {
        Self {
            access,
            state: PermissionState::Unknown,
        }
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// Whether capture is currently authorized
    ///
    /// A delivered prompt result wins; before any result arrives this reflects
    /// the OS status directly.
    pub fn check_authorized(&self) -> bool {
        match self.state {
            PermissionState::Granted => true,
            PermissionState::Denied => false,
            PermissionState::Unknown | PermissionState::Requested => self.access.is_granted(),
        }
    }

    /// Start an OS authorization prompt
    ///
    /// Returns `None` when no new prompt should be shown: one is already
    /// pending, or access was already granted.
    pub fn request_authorization(&mut self) -> Option<AuthorizationRequest> {
        match self.state {
            PermissionState::Requested => {
                debug!("Authorization prompt already pending");
                None
            }
            PermissionState::Granted => {
                warn!("Authorization requested while already granted");
                None
            }
            PermissionState::Unknown | PermissionState::Denied => {
                self.transition(PermissionState::Requested);
                let access = Arc::clone(&self.access);
                Some(Box::pin(async move { access.request().await }))
            }
        }
    }

    /// Deliver the outcome of a prompt started by [`request_authorization`]
    ///
    /// [`request_authorization`]: PermissionGate::request_authorization
    pub fn on_authorization_result(&mut self, granted: bool) -> PermissionState {
        if self.state != PermissionState::Requested {
            warn!(state = %self.state, granted, "Authorization result without pending request");
        }
        let next = if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        self.transition(next);
        info!(state = %next, "Camera authorization resolved");
        next
    }

    fn transition(&mut self, next: PermissionState) {
        debug!(from = %self.state, to = %next, "Permission state change");
        self.state = next;
    }
}
