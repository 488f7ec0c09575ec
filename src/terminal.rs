// SPDX-License-Identifier: GPL-3.0-only

//! Interactive terminal front-end
//!
//! Reads single key presses in raw mode and forwards them to a running
//! orchestrator. Notices are printed inline.

use crate::app::{self, Orchestrator, OrchestratorHandle};
use crate::backends::Platform;
use crate::backends::notify::{Notice, Notifier};
use crate::config::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Capture,
    Gallery,
    Quit,
}

/// Map a key to an action; unbound keys are ignored
pub fn key_action(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        KeyCode::Enter | KeyCode::Char(' ') => Some(KeyAction::Capture),
        KeyCode::Char('g') => Some(KeyAction::Gallery),
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        _ => None,
    }
}

/// Prints notices on their own line; raw mode needs explicit carriage returns
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: &Notice) {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\r\n» {}\r\n", notice);
        let _ = stdout.flush();
    }
}

/// Run the interactive shell until the user quits
pub async fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let platform = Platform::desktop(config, Some(Arc::new(TerminalNotifier)));
    let (handle, join) = app::spawn(Orchestrator::new(config, platform));

    println!("Enter/Space: capture   g: gallery   q: quit");

    enable_raw_mode()?;
    let keys = handle.clone();
    let result = tokio::task::spawn_blocking(move || read_keys(&keys)).await;
    disable_raw_mode()?;

    handle.shutdown();
    match join.await {
        Ok(_) => info!("Shell closed"),
        Err(e) => error!(error = %e, "Event loop ended abnormally"),
    }

    result??;
    Ok(())
}

fn read_keys(handle: &OrchestratorHandle) -> io::Result<()> {
    loop {
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let delivered = match key_action(key.code, key.modifiers) {
                Some(KeyAction::Capture) => handle.request_capture(),
                Some(KeyAction::Gallery) => handle.open_gallery(),
                Some(KeyAction::Quit) => return Ok(()),
                None => true,
            };
            if !delivered {
                return Ok(());
            }
        }
    }
}
