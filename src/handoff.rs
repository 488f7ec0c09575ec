// SPDX-License-Identifier: GPL-3.0-only

//! Handoff resolution
//!
//! Picks the single best application for a shareable asset from an ordered
//! candidate list, or falls back to the system chooser:
//!
//! 1. Candidates are tried in ascending priority; ties keep list order.
//! 2. The first installed candidate that accepts `image/*` is granted read
//!    access, then receives a share action scoped to it. Nothing else is
//!    tried afterwards, even if launching it fails.
//! 3. With no match, one unscoped chooser action is sent and no grant is
//!    issued.

use crate::backends::share::{AppLauncher, ShareAction, ShareTarget};
use crate::constants::{GENERAL_SEARCH_APP, IMAGE_MIME, LENS_STANDALONE, SECONDARY_SEARCH_APP};
use crate::errors::{AppError, AppResult, DispatchError};
use crate::publisher::{AssetPublisher, ShareableAsset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One external application considered as a handoff target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationCandidate {
    pub identifier: String,
    /// Lower is preferred
    pub priority: u32,
}

impl ApplicationCandidate {
    pub fn new(identifier: impl Into<String>, priority: u32) -> Self {
        Self {
            identifier: identifier.into(),
            priority,
        }
    }

    /// Standalone image search, then the general search app, then the secondary one
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(LENS_STANDALONE, 0),
            Self::new(GENERAL_SEARCH_APP, 1),
            Self::new(SECONDARY_SEARCH_APP, 2),
        ]
    }
}

/// Where the asset ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffTarget {
    Candidate(String),
    Chooser,
}

impl fmt::Display for HandoffTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandoffTarget::Candidate(id) => f.write_str(id),
            HandoffTarget::Chooser => f.write_str("chooser"),
        }
    }
}

pub struct HandoffResolver {
    candidates: Vec<ApplicationCandidate>,
    chooser_title: String,
    launcher: Arc<dyn AppLauncher>,
}

impl HandoffResolver {
    pub fn new(
        mut candidates: Vec<ApplicationCandidate>,
        chooser_title: impl Into<String>,
        launcher: Arc<dyn AppLauncher>,
    ) -> Self {
        // Stable: equal priorities keep their configured order
        candidates.sort_by_key(|c| c.priority);
        Self {
            candidates,
            chooser_title: chooser_title.into(),
            launcher,
        }
    }

    /// Candidates in the order they will be tried
    pub fn candidates(&self) -> &[ApplicationCandidate] {
        &self.candidates
    }

    /// First candidate the system can resolve, if any
    pub fn resolve(&self) -> Option<&ApplicationCandidate> {
        self.candidates.iter().find(|candidate| {
            let found = self.launcher.can_handle(&candidate.identifier, IMAGE_MIME);
            debug!(identifier = %candidate.identifier, found, "Resolving candidate");
            found
        })
    }

    /// Grant and dispatch to the best candidate, or open the chooser
    pub fn resolve_and_dispatch(
        &self,
        publisher: &AssetPublisher,
        asset: &mut ShareableAsset,
    ) -> AppResult<HandoffTarget> {
        if let Some(candidate) = self.resolve() {
            let identifier = candidate.identifier.clone();
            publisher.grant(asset, &identifier)?;

            let action = ShareAction {
                mime: IMAGE_MIME.to_string(),
                reference: asset.reference.clone(),
                target: ShareTarget::Application(identifier.clone()),
            };
            self.launcher.send(&action).map_err(|e| {
                warn!(identifier = %identifier, error = %e, "Scoped share failed");
                AppError::from(e)
            })?;

            info!(identifier = %identifier, "Handed off to preferred application");
            return Ok(HandoffTarget::Candidate(identifier));
        }

        info!("No preferred application installed, opening chooser");
        let action = ShareAction {
            mime: IMAGE_MIME.to_string(),
            reference: asset.reference.clone(),
            target: ShareTarget::Chooser {
                title: self.chooser_title.clone(),
            },
        };
        match self.launcher.send(&action) {
            Ok(()) => Ok(HandoffTarget::Chooser),
            Err(DispatchError::NoHandler(_)) => {
                warn!("Chooser has no capable application");
                Err(AppError::NoCapableApplication)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, EventLog, FakeLauncher, RecordingAccess};

    struct Fixture {
        log: EventLog,
        publisher: AssetPublisher,
        asset: ShareableAsset,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let log = EventLog::default();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("IMG_20240131_094500.jpg");
        std::fs::write(&file, b"jpeg").unwrap();
        let publisher =
            AssetPublisher::new("io.test", "cache", Arc::new(RecordingAccess::new(log.clone())));
        let asset = publisher.publish(&file).unwrap();
        Fixture {
            log,
            publisher,
            asset,
            _dir: dir,
        }
    }

    fn resolver(log: &EventLog, installed: &[&str]) -> HandoffResolver {
        HandoffResolver::new(
            ApplicationCandidate::defaults(),
            "Search with",
            Arc::new(FakeLauncher::new(log.clone()).with_installed(installed)),
        )
    }

    #[test]
    fn first_installed_candidate_wins() {
        let mut f = fixture();
        let resolver = resolver(&f.log, &[SECONDARY_SEARCH_APP, GENERAL_SEARCH_APP]);

        let target = resolver
            .resolve_and_dispatch(&f.publisher, &mut f.asset)
            .unwrap();
        assert_eq!(target, HandoffTarget::Candidate(GENERAL_SEARCH_APP.into()));
        assert_eq!(
            f.asset.granted_applications.iter().collect::<Vec<_>>(),
            vec![GENERAL_SEARCH_APP]
        );
    }

    #[test]
    fn grant_precedes_scoped_dispatch() {
        let mut f = fixture();
        let resolver = resolver(&f.log, &[LENS_STANDALONE]);
        resolver
            .resolve_and_dispatch(&f.publisher, &mut f.asset)
            .unwrap();

        let events = f.log.events();
        let grant = events
            .iter()
            .position(|e| *e == Event::Granted(LENS_STANDALONE.into()))
            .expect("grant issued");
        let send = events
            .iter()
            .position(|e| *e == Event::Sent(ShareTarget::Application(LENS_STANDALONE.into())))
            .expect("share sent");
        assert!(grant < send);
    }

    #[test]
    fn choice_is_deterministic() {
        let installed = [SECONDARY_SEARCH_APP, GENERAL_SEARCH_APP, LENS_STANDALONE];
        let picks: Vec<_> = (0..5)
            .map(|_| {
                let log = EventLog::default();
                resolver(&log, &installed).resolve().cloned()
            })
            .collect();
        assert!(picks.iter().all(|p| p.as_ref().unwrap().identifier == LENS_STANDALONE));
    }

    #[test]
    fn priority_not_list_position_decides() {
        let log = EventLog::default();
        let resolver = HandoffResolver::new(
            vec![
                ApplicationCandidate::new("late", 9),
                ApplicationCandidate::new("early", 1),
            ],
            "Search with",
            Arc::new(FakeLauncher::new(log).with_installed(&["late", "early"])),
        );
        assert_eq!(resolver.resolve().unwrap().identifier, "early");
    }

    #[test]
    fn no_candidate_opens_chooser_once_without_grant() {
        let mut f = fixture();
        let resolver = resolver(&f.log, &[]);

        let target = resolver
            .resolve_and_dispatch(&f.publisher, &mut f.asset)
            .unwrap();
        assert_eq!(target, HandoffTarget::Chooser);
        assert!(f.asset.granted_applications.is_empty());

        let events = f.log.events();
        assert!(!events.iter().any(|e| matches!(e, Event::Granted(_))));
        let choosers = events
            .iter()
            .filter(|e| matches!(e, Event::Sent(ShareTarget::Chooser { .. })))
            .count();
        assert_eq!(choosers, 1);
    }

    #[test]
    fn chooser_without_handlers_is_no_capable_application() {
        let mut f = fixture();
        let resolver = HandoffResolver::new(
            ApplicationCandidate::defaults(),
            "Search with",
            Arc::new(FakeLauncher::new(f.log.clone()).without_chooser()),
        );

        let result = resolver.resolve_and_dispatch(&f.publisher, &mut f.asset);
        assert!(matches!(result, Err(AppError::NoCapableApplication)));
    }

    #[test]
    fn failed_scoped_send_does_not_try_next_candidate() {
        let mut f = fixture();
        let resolver = HandoffResolver::new(
            ApplicationCandidate::defaults(),
            "Search with",
            Arc::new(
                FakeLauncher::new(f.log.clone())
                    .with_installed(&[LENS_STANDALONE, GENERAL_SEARCH_APP])
                    .failing_send(),
            ),
        );

        let result = resolver.resolve_and_dispatch(&f.publisher, &mut f.asset);
        assert!(matches!(result, Err(AppError::Dispatch(_))));
        assert_eq!(
            f.log
                .events()
                .iter()
                .filter(|e| matches!(e, Event::Sent(_)))
                .count(),
            1
        );
    }
}
