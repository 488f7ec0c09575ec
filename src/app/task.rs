// SPDX-License-Identifier: GPL-3.0-only

//! Deferred work returned from a message handler
//!
//! A task wraps at most one future whose output is mapped back into a
//! [`Message`]. The event loop spawns it and feeds the message back in, so
//! every asynchronous boundary has exactly one resumption point.

use super::state::Message;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;

#[must_use = "a task does nothing unless handed to the event loop"]
pub struct Task(Option<BoxFuture<'static, Message>>);

impl Task {
    /// No follow-up work
    pub fn none() -> Self {
        Self(None)
    }

    /// Run `future` and turn its output into a message
    pub fn perform<T, F, M>(future: F, map: M) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        M: FnOnce(T) -> Message + Send + 'static,
        T: Send + 'static,
    {
        Self(Some(future.map(map).boxed()))
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn into_future(self) -> Option<BoxFuture<'static, Message>> {
        self.0
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Task")
            .field(&if self.0.is_some() { "pending" } else { "none" })
            .finish()
    }
}
