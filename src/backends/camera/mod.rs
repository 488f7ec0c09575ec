// SPDX-License-Identifier: MPL-2.0

//! Camera hardware abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │   CaptureSession    │  ← state machine, at most one binding
//! └──────────┬──────────┘
//!            │ open()
//!            ▼
//! ┌─────────────────────┐
//! │   CameraHardware    │  ← driver capability
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │    CameraBinding    │  ← exclusive handle, released explicitly or on drop
//! └─────────────────────┘
//! ```

pub mod format_converters;
pub mod v4l2;

pub use v4l2::V4l2Camera;

use crate::errors::{BindError, CaptureError};
use async_trait::async_trait;
use std::path::Path;

/// Camera driver capability
pub trait CameraHardware: Send + Sync {
    /// Acquire exclusive access to the camera
    ///
    /// # Returns
    /// * `Ok(binding)` - Camera is ready for capture
    /// * `Err(BindError::HardwareUnavailable)` - No usable device
    /// * `Err(BindError::Busy)` - Device held elsewhere
    fn open(&self) -> Result<Box<dyn CameraBinding>, BindError>;
}

/// An exclusive, live binding to the camera
#[async_trait]
pub trait CameraBinding: Send + Sync {
    /// Capture a single photo and write it as JPEG to `path`
    async fn take_picture(&self, path: &Path) -> Result<(), CaptureError>;

    /// Give the hardware back; any capture still running fails with
    /// [`CaptureError::BindingLost`]
    fn release(&self);

    /// Whether the binding still holds the hardware
    fn is_active(&self) -> bool;
}
