// SPDX-License-Identifier: GPL-3.0-only

//! Capture-and-dispatch workflow
//!
//! This module contains the orchestrator state, message handling, and the
//! event loop that feeds asynchronous results back into it.
//!
//! # Architecture
//!
//! - `state`: Orchestrator state and the `Message` enum
//! - `task`: Deferred work returned by handlers
//! - `update`: Message dispatcher
//! - `handlers`: Per-domain message handlers
//! - `runner`: Channel-driven event loop
//!
//! # Main Types
//!
//! - `Orchestrator`: Sequences permission, capture, publish, and handoff
//! - `Message`: User actions and delivered asynchronous results
//! - `OrchestratorHandle`: Sends actions to a running event loop

mod handlers;
pub mod runner;
mod state;
mod task;
mod update;

pub use runner::{OrchestratorHandle, spawn};
pub use state::{Message, Orchestrator};
pub use task::Task;
