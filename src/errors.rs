// SPDX-License-Identifier: MPL-2.0

//! Error types for the capture-and-handoff workflow
//!
//! Every variant here ends at the orchestrator, where it is turned into a
//! single transient notice. Nothing is fatal.

use crate::session::SessionState;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main workflow error type
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Camera access was refused by the user or the system
    #[error("Camera permission denied")]
    PermissionDenied,
    /// Camera binding errors
    #[error("Camera binding failed: {0}")]
    Bind(#[from] BindError),
    /// Errors while a photo is being taken
    #[error("{0}")]
    Capture(#[from] CaptureError),
    /// Capture file vanished between write and publish
    #[error("Captured file is no longer available: {}", .0.display())]
    AssetUnavailable(PathBuf),
    /// Neither a preferred application nor the chooser can take the image
    #[error("No application can handle the image")]
    NoCapableApplication,
    /// Launching the chosen application failed
    #[error("{0}")]
    Dispatch(#[from] DispatchError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Camera binding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// No usable camera device
    #[error("camera hardware unavailable: {0}")]
    HardwareUnavailable(String),
    /// Device is held by another process
    #[error("camera is busy")]
    Busy,
    /// Capture requested while the session could not take a photo
    #[error("session is {0}, not bound")]
    NotBound(SessionState),
}

/// Photo capture errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Driver or sensor failure mid-capture
    #[error("{0}")]
    Hardware(String),
    /// Output file could not be written
    #[error("{0}")]
    Storage(String),
    /// The binding went away while the capture was running
    #[error("camera binding lost")]
    BindingLost,
}

/// Errors from handing a share or view action to the system
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Nothing installed can receive the action
    #[error("no application found for {0}")]
    NoHandler(String),
    /// The application was found but could not be started
    #[error("failed to launch {target}: {reason}")]
    Launch { target: String, reason: String },
}

impl AppError {
    /// Short reason text shown to the user after "Capture failed: "
    pub fn reason(&self) -> String {
        match self {
            AppError::Capture(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_reason_is_bare_message() {
        let err = AppError::from(CaptureError::Storage("storage full".into()));
        assert_eq!(err.reason(), "storage full");
    }

    #[test]
    fn not_bound_names_state() {
        let err = BindError::NotBound(SessionState::Unbound);
        assert_eq!(err.to_string(), "session is unbound, not bound");
    }
}
