// SPDX-License-Identifier: GPL-3.0-only

//! One-shot CLI commands
//!
//! This module provides command-line functionality for:
//! - Opening the gallery
//! - Listing handoff candidates
//! - Printing the effective configuration

use lens_capture::Notice;
use lens_capture::backends::launcher::DesktopLauncher;
use lens_capture::backends::share::{AppLauncher, GrantTable};
use lens_capture::config::Config;
use lens_capture::constants::IMAGE_MIME;
use lens_capture::handoff::HandoffResolver;
use std::sync::Arc;

fn launcher() -> Arc<DesktopLauncher> {
    Arc::new(DesktopLauncher::new(GrantTable::new()))
}

/// Open the system image store
pub fn open_gallery(_config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = launcher().view_gallery() {
        tracing::error!(error = %e, "Failed to open gallery");
        eprintln!("{}", Notice::GalleryUnavailable);
        return Err(e.into());
    }
    Ok(())
}

/// Print candidates in resolution order and mark the one a capture would use
pub fn list_candidates(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let launcher = launcher();
    let resolver = HandoffResolver::new(
        config.candidates.clone(),
        config.chooser_title.clone(),
        launcher.clone(),
    );
    let chosen = resolver.resolve().map(|c| c.identifier.clone());

    println!("Handoff candidates:");
    println!();
    for candidate in resolver.candidates() {
        let installed = launcher.can_handle(&candidate.identifier, IMAGE_MIME);
        let marker = if chosen.as_deref() == Some(candidate.identifier.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            " {} [{}] {} ({})",
            marker,
            candidate.priority,
            candidate.identifier,
            if installed { "installed" } else { "not found" }
        );
    }
    println!();

    match chosen {
        Some(identifier) => println!("Captures go to {}", identifier),
        None => println!("No candidate installed; captures open \"{}\"", config.chooser_title),
    }
    Ok(())
}

pub fn print_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
