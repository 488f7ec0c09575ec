// SPDX-License-Identifier: GPL-3.0-only

//! Share-action types and the access-control boundary
//!
//! A share action carries an opaque reference, never a path. Whoever launches
//! the receiving application resolves the reference through the
//! [`GrantTable`], which only answers for applications that were granted read
//! access first.

use crate::errors::DispatchError;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Who an outbound share action is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareTarget {
    /// Exactly one application
    Application(String),
    /// Interactive chooser over every capable application
    Chooser { title: String },
}

/// OS-level "send data of this MIME type" action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareAction {
    pub mime: String,
    pub reference: String,
    pub target: ShareTarget,
}

/// OS access-control boundary for shareable references
pub trait AccessControl: Send + Sync {
    /// Make `reference` stand for `source`, readable by nobody yet
    fn expose(&self, reference: &str, source: &Path);

    /// Allow `application` to read the file behind `reference`
    fn grant_read(&self, reference: &str, source: &Path, application: &str);
}

/// OS application resolution and dispatch
pub trait AppLauncher: Send + Sync {
    /// Is an application matching `identifier` installed and able to receive `mime`?
    fn can_handle(&self, identifier: &str, mime: &str) -> bool;

    /// Hand a share action to the system
    fn send(&self, action: &ShareAction) -> Result<(), DispatchError>;

    /// Open the system image store in a viewer
    fn view_gallery(&self) -> Result<(), DispatchError>;
}

#[derive(Debug, Default)]
struct GrantEntry {
    source: PathBuf,
    applications: BTreeSet<String>,
}

/// In-process read grants, shared by the publisher and the launcher
///
/// Grants are never revoked and the table lives as long as the process.
/// Entries whose capture file has been removed from the cache are dropped
/// on the next `expose`, so the table never outgrows the cache directory.
#[derive(Debug, Clone, Default)]
pub struct GrantTable {
    entries: Arc<Mutex<HashMap<String, GrantEntry>>>,
}

impl GrantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// File behind `reference`, if `application` may read it
    pub fn resolve_for(&self, reference: &str, application: &str) -> Option<PathBuf> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(reference)?;
        entry
            .applications
            .contains(application)
            .then(|| entry.source.clone())
    }

    /// File behind `reference` for the chooser, whose pick is granted implicitly
    pub fn resolve_any(&self, reference: &str) -> Option<PathBuf> {
        let entries = self.entries.lock().ok()?;
        entries.get(reference).map(|entry| entry.source.clone())
    }
}

impl AccessControl for GrantTable {
    fn expose(&self, reference: &str, source: &Path) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|key, entry| {
                let present = entry.source.exists();
                if !present {
                    debug!(reference = %key, "Dropping grants for removed capture");
                }
                present
            });
            entries
                .entry(reference.to_string())
                .or_insert_with(|| GrantEntry {
                    source: source.to_path_buf(),
                    applications: BTreeSet::new(),
                });
        }
    }

    fn grant_read(&self, reference: &str, source: &Path, application: &str) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        let entry = entries
            .entry(reference.to_string())
            .or_insert_with(|| GrantEntry {
                source: source.to_path_buf(),
                applications: BTreeSet::new(),
            });
        entry.applications.insert(application.to_string());
        debug!(reference, application, "Read grant recorded");
    }
}
