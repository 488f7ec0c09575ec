// SPDX-License-Identifier: GPL-3.0-only

//! Camera authorization backend
//!
//! Outside a sandbox, access is decided by the device node's permissions. In
//! Flatpak the `org.freedesktop.portal.Camera` interface shows the system
//! prompt; its answer arrives as a `Response` signal on a request object.

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";

/// OS-level camera authorization capability
#[async_trait]
pub trait CameraAccess: Send + Sync {
    /// Current OS grant status; must not prompt
    fn is_granted(&self) -> bool;

    /// Show the OS prompt and wait for the answer
    async fn request(&self) -> bool;
}

/// Device-node permissions plus the desktop camera portal
#[derive(Debug, Clone)]
pub struct PortalAccess {
    device_path: PathBuf,
}

impl PortalAccess {
    pub fn new(device_path: impl Into<PathBuf>) -> Self {
        Self {
            device_path: device_path.into(),
        }
    }

    async fn access_camera(&self) -> Result<bool, String> {
        let connection = zbus::Connection::session()
            .await
            .map_err(|e| format!("Failed to connect to session D-Bus: {}", e))?;

        // Subscribe to the request object before calling, so the response
        // cannot arrive unobserved.
        let token = format!("lens_capture_{}", uuid::Uuid::new_v4().simple());
        let sender = connection
            .unique_name()
            .map(|name| name.as_str().trim_start_matches(':').replace('.', "_"))
            .ok_or("D-Bus connection has no unique name")?;
        let request_path = format!("{}/request/{}/{}", PORTAL_PATH, sender, token);

        let request = zbus::Proxy::new(
            &connection,
            PORTAL_DESTINATION,
            request_path.as_str(),
            "org.freedesktop.portal.Request",
        )
        .await
        .map_err(|e| format!("Failed to create request proxy: {}", e))?;
        let mut responses = request
            .receive_signal("Response")
            .await
            .map_err(|e| format!("Failed to subscribe to portal response: {}", e))?;

        let camera = zbus::Proxy::new(
            &connection,
            PORTAL_DESTINATION,
            PORTAL_PATH,
            "org.freedesktop.portal.Camera",
        )
        .await
        .map_err(|e| format!("Failed to create camera portal proxy: {}", e))?;

        let mut options: HashMap<&str, Value> = HashMap::new();
        options.insert("handle_token", Value::from(token.as_str()));
        let handle: OwnedObjectPath = camera
            .call("AccessCamera", &(options,))
            .await
            .map_err(|e| format!("AccessCamera failed: {}", e))?;
        debug!(handle = %handle, "Camera portal request issued");

        let message = responses
            .next()
            .await
            .ok_or("Portal closed without a response")?;
        let (code, _results): (u32, HashMap<String, OwnedValue>) = message
            .body()
            .deserialize()
            .map_err(|e| format!("Malformed portal response: {}", e))?;

        Ok(code == 0)
    }
}

#[async_trait]
impl CameraAccess for PortalAccess {
    fn is_granted(&self) -> bool {
        std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.device_path)
            .is_ok()
    }

    async fn request(&self) -> bool {
        match self.access_camera().await {
            Ok(granted) => {
                info!(granted, "Camera portal answered");
                granted && self.is_granted()
            }
            Err(e) => {
                // No portal outside a sandbox: the device node is the answer.
                warn!(error = %e, "Camera portal unavailable, checking device node");
                self.is_granted()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_device_is_not_granted() {
        let dir = tempfile::tempdir().unwrap();
        let access = PortalAccess::new(dir.path().join("video99"));
        assert!(!access.is_granted());
    }

    #[test]
    fn writable_node_is_granted() {
        let dir = tempfile::tempdir().unwrap();
        let node = dir.path().join("video0");
        std::fs::write(&node, b"").unwrap();
        assert!(PortalAccess::new(node).is_granted());
    }
}
