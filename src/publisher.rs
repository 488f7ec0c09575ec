// SPDX-License-Identifier: GPL-3.0-only

//! Turns a private capture file into a shareable reference
//!
//! References look like `content://<authority>/<share root>/<file name>`.
//! The publisher never owns or deletes the file; it only mints the reference
//! and pushes read grants across the [`AccessControl`] boundary.

use crate::backends::share::AccessControl;
use crate::errors::{AppError, AppResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// A capture file wrapped with its reference and granted readers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareableAsset {
    pub reference: String,
    pub source_file: PathBuf,
    /// Only ever grows
    pub granted_applications: BTreeSet<String>,
}

pub struct AssetPublisher {
    authority: String,
    share_root: String,
    access: Arc<dyn AccessControl>,
}

impl AssetPublisher {
    pub fn new(
        authority: impl Into<String>,
        share_root: impl Into<String>,
        access: Arc<dyn AccessControl>,
    ) -> Self {
        Self {
            authority: authority.into(),
            share_root: share_root.into(),
            access,
        }
    }

    /// Mint a reference for a freshly written capture file
    ///
    /// # Returns
    /// * `Ok(ShareableAsset)` - with no grants yet
    /// * `Err(AppError::AssetUnavailable)` - the file is gone or not a file
    pub fn publish(&self, file: &Path) -> AppResult<ShareableAsset> {
        let is_file = std::fs::metadata(file).map(|m| m.is_file()).unwrap_or(false);
        let name = file.file_name().and_then(|n| n.to_str());
        let (true, Some(name)) = (is_file, name) else {
            warn!(path = %file.display(), "Capture file vanished before publish");
            return Err(AppError::AssetUnavailable(file.to_path_buf()));
        };

        let reference = format!("content://{}/{}/{}", self.authority, self.share_root, name);
        self.access.expose(&reference, file);
        info!(reference = %reference, "Published capture");
        Ok(ShareableAsset {
            reference,
            source_file: file.to_path_buf(),
            granted_applications: BTreeSet::new(),
        })
    }

    /// Give `application` read access to `asset`; must precede any dispatch to it
    pub fn grant(&self, asset: &mut ShareableAsset, application: &str) -> AppResult<()> {
        if !asset.source_file.exists() {
            return Err(AppError::AssetUnavailable(asset.source_file.clone()));
        }
        self.access
            .grant_read(&asset.reference, &asset.source_file, application);
        asset.granted_applications.insert(application.to_string());
        info!(application, reference = %asset.reference, "Granted read access");
        Ok(())
    }
}
