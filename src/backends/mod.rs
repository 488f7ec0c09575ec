// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer
//!
//! Everything the workflow needs from the operating system is a capability
//! trait here, with a desktop implementation beside it:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                Orchestrator                 │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │  CameraAccess     CameraHardware            │
//! │  (portal/devnode) (V4L2)                    │
//! │  AccessControl    AppLauncher      Notifier │
//! │  (GrantTable)     (XDG entries)    (D-Bus)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`access`]: Camera authorization
//! - [`camera`]: Camera hardware binding and photo capture
//! - [`share`]: Share actions and read grants
//! - [`launcher`]: Application resolution and dispatch
//! - [`notify`]: Transient notices

pub mod access;
pub mod camera;
pub mod launcher;
pub mod notify;
pub mod share;

use crate::config::Config;
use crate::constants;
use access::{CameraAccess, PortalAccess};
use camera::{CameraHardware, V4l2Camera};
use launcher::DesktopLauncher;
use notify::{DesktopNotifier, LogNotifier, Notifier, Notifiers};
use share::{AccessControl, AppLauncher, GrantTable};
use std::sync::Arc;

/// Bundle of capabilities used by the orchestrator. Each one can be replaced in tests.
#[derive(Clone)]
pub struct Platform {
    pub access: Arc<dyn CameraAccess>,
    pub camera: Arc<dyn CameraHardware>,
    pub access_control: Arc<dyn AccessControl>,
    pub launcher: Arc<dyn AppLauncher>,
    pub notifier: Arc<dyn Notifier>,
}

impl Platform {
    /// Desktop capabilities configured from `config`
    ///
    /// `extra_notifier` receives every notice alongside the log and, if
    /// enabled, the desktop notification daemon.
    pub fn desktop(config: &Config, extra_notifier: Option<Arc<dyn Notifier>>) -> Self {
        let grants = GrantTable::new();

        let mut notifiers = Notifiers::new().with(Arc::new(LogNotifier));
        if config.desktop_notifications {
            notifiers = notifiers.with(Arc::new(DesktopNotifier::new(constants::APP_DIR_NAME)));
        }
        if let Some(extra) = extra_notifier {
            notifiers = notifiers.with(extra);
        }

        Self {
            access: Arc::new(PortalAccess::new(&config.camera_device)),
            camera: Arc::new(V4l2Camera::new(
                &config.camera_device,
                config.capture_width,
                config.capture_height,
            )),
            access_control: Arc::new(grants.clone()),
            launcher: Arc::new(DesktopLauncher::new(grants)),
            notifier: Arc::new(notifiers),
        }
    }
}
