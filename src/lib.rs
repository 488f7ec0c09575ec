// SPDX-License-Identifier: GPL-3.0-only

//! Lens Capture - take a photo and hand it to an image-search application
//!
//! One user action runs the whole workflow: check camera authorization, bind
//! the camera, capture a JPEG into a private cache, publish it under an
//! opaque reference, and send it to the best installed search application
//! (or an OS chooser when none is installed).
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Orchestrator, message handling, and event loop
//! - [`backends`]: Platform capabilities (camera, access, launcher, notices)
//! - [`permission`]: Camera authorization state
//! - [`session`]: Camera binding and single-photo capture
//! - [`publisher`]: Shareable references and read grants
//! - [`handoff`]: Candidate resolution and dispatch
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! let config = Config::load_or_default();
//! let orchestrator = Orchestrator::new(&config, Platform::desktop(&config, None));
//! let (handle, _join) = lens_capture::app::spawn(orchestrator);
//! handle.request_capture();
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod handoff;
pub mod permission;
pub mod publisher;
pub mod session;
pub mod terminal;
#[doc(hidden)]
pub mod testing;

// Re-export commonly used types
pub use app::{Message, Orchestrator, OrchestratorHandle};
pub use backends::Platform;
pub use backends::notify::Notice;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use handoff::{ApplicationCandidate, HandoffTarget};
