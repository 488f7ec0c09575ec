// SPDX-License-Identifier: GPL-3.0-only

//! Transient user-visible notices
//!
//! Notices are fire-and-forget: a notifier must never block the workflow and
//! never report failure back to it.

use crate::errors::AppError;
use crate::handoff::HandoffTarget;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use zbus::zvariant::Value;

/// Outcome shown to the user once per workflow step that ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    PermissionDenied,
    CaptureFailed(String),
    HandoffSent(HandoffTarget),
    HandoffFailed(String),
    GalleryUnavailable,
}

impl Notice {
    /// Map a workflow error onto the notice the user sees
    pub fn for_error(err: &AppError) -> Self {
        match err {
            AppError::PermissionDenied => Notice::PermissionDenied,
            AppError::Bind(_)
            | AppError::Capture(_)
            | AppError::AssetUnavailable(_)
            | AppError::Config(_) => Notice::CaptureFailed(err.reason()),
            AppError::NoCapableApplication | AppError::Dispatch(_) => {
                Notice::HandoffFailed(err.to_string())
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Notice::HandoffSent(_))
    }

    /// How long the notice stays up, in milliseconds
    pub fn duration_ms(&self) -> i32 {
        match self {
            Notice::PermissionDenied | Notice::CaptureFailed(_) => 3500,
            _ => 2000,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PermissionDenied => write!(f, "Camera permission denied"),
            Notice::CaptureFailed(reason) => write!(f, "Capture failed: {}", reason),
            Notice::HandoffSent(_) => write!(f, "Sent to Google Lens!"),
            Notice::HandoffFailed(_) => write!(f, "Failed to open Lens"),
            Notice::GalleryUnavailable => write!(f, "No gallery app found"),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Writes notices to the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        if notice.is_failure() {
            warn!(notice = ?notice, "{}", notice);
        } else {
            info!(notice = ?notice, "{}", notice);
        }
    }
}

/// Posts notices through `org.freedesktop.Notifications`
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    async fn post(app_name: String, body: String, timeout_ms: i32) -> Result<u32, String> {
        let connection = zbus::Connection::session()
            .await
            .map_err(|e| format!("Failed to connect to session D-Bus: {}", e))?;
        let proxy = zbus::Proxy::new(
            &connection,
            "org.freedesktop.Notifications",
            "/org/freedesktop/Notifications",
            "org.freedesktop.Notifications",
        )
        .await
        .map_err(|e| format!("Failed to create notifications proxy: {}", e))?;

        let actions: Vec<&str> = Vec::new();
        let hints: HashMap<&str, Value> = HashMap::new();
        proxy
            .call(
                "Notify",
                &(
                    app_name.as_str(),
                    0u32,
                    "camera-photo",
                    app_name.as_str(),
                    body.as_str(),
                    actions,
                    hints,
                    timeout_ms,
                ),
            )
            .await
            .map_err(|e| format!("Notify failed: {}", e))
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notice: &Notice) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime, desktop notice skipped");
            return;
        };
        let app_name = self.app_name.clone();
        let body = notice.to_string();
        let timeout = notice.duration_ms();
        runtime.spawn(async move {
            if let Err(e) = Self::post(app_name, body, timeout).await {
                debug!(error = %e, "Desktop notice not delivered");
            }
        });
    }
}

/// Sends each notice to every inner notifier
#[derive(Clone, Default)]
pub struct Notifiers(Vec<Arc<dyn Notifier>>);

impl Notifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.0.push(notifier);
        self
    }
}

impl Notifier for Notifiers {
    fn notify(&self, notice: &Notice) {
        for notifier in &self.0 {
            notifier.notify(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CaptureError, DispatchError};

    #[test]
    fn capture_failure_carries_reason() {
        let notice = Notice::for_error(&CaptureError::Storage("storage full".into()).into());
        assert_eq!(notice, Notice::CaptureFailed("storage full".into()));
        assert_eq!(notice.to_string(), "Capture failed: storage full");
    }

    #[test]
    fn permission_error_is_permission_notice() {
        let notice = Notice::for_error(&AppError::PermissionDenied);
        assert_eq!(notice, Notice::PermissionDenied);
        assert_eq!(notice.to_string(), "Camera permission denied");
    }

    #[test]
    fn dispatch_errors_are_handoff_failures() {
        let notice = Notice::for_error(&AppError::NoCapableApplication);
        assert!(matches!(notice, Notice::HandoffFailed(_)));
        let notice = Notice::for_error(&DispatchError::NoHandler("image/*".into()).into());
        assert!(matches!(notice, Notice::HandoffFailed(_)));
    }

    #[test]
    fn desktop_notifier_without_runtime_is_silent() {
        DesktopNotifier::new("test").notify(&Notice::GalleryUnavailable);
    }
}
