// SPDX-License-Identifier: GPL-3.0-only

//! Event loop driving the [`Orchestrator`]
//!
//! Messages arrive over an unbounded channel and are handled one at a time.
//! Tasks returned by `update` are spawned; their output message goes back
//! through the same channel.

use super::state::{Message, Orchestrator};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Sends user actions to a running orchestrator
#[derive(Clone, Debug)]
pub struct OrchestratorHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl OrchestratorHandle {
    /// Returns false once the event loop has stopped
    pub fn send(&self, message: Message) -> bool {
        self.tx.send(message).is_ok()
    }

    pub fn request_capture(&self) -> bool {
        self.send(Message::CaptureRequested)
    }

    pub fn open_gallery(&self) -> bool {
        self.send(Message::OpenGallery)
    }

    pub fn shutdown(&self) -> bool {
        self.send(Message::Shutdown)
    }
}

/// Start the event loop on the current tokio runtime
///
/// [`Message::Start`] is queued first. The join handle yields the
/// orchestrator back after [`Message::Shutdown`], or once every handle has
/// been dropped.
pub fn spawn(orchestrator: Orchestrator) -> (OrchestratorHandle, JoinHandle<Orchestrator>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = OrchestratorHandle { tx: tx.clone() };
    // Queued before any user action can be sent
    let _ = tx.send(Message::Start);
    let task_tx = tx.downgrade();
    drop(tx);
    let join = tokio::spawn(run(orchestrator, task_tx, rx));
    (handle, join)
}

async fn run(
    mut orchestrator: Orchestrator,
    task_tx: mpsc::WeakUnboundedSender<Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) -> Orchestrator {
    info!("Orchestrator event loop started");

    while let Some(message) = rx.recv().await {
        let stop = matches!(message, Message::Shutdown);
        let task = orchestrator.update(message);
        if stop {
            break;
        }

        if let Some(future) = task.into_future() {
            let task_tx = task_tx.clone();
            tokio::spawn(async move {
                let message = future.await;
                match task_tx.upgrade() {
                    Some(tx) => {
                        let _ = tx.send(message);
                    }
                    None => debug!(message = ?message, "Event loop gone, result dropped"),
                }
            });
        }
    }

    if orchestrator.session_state() != crate::session::SessionState::Unbound {
        let _ = orchestrator.update(Message::Shutdown);
    }
    info!("Orchestrator event loop stopped");
    orchestrator
}
