// SPDX-License-Identifier: GPL-3.0-only

//! Desktop application resolution and dispatch
//!
//! Application identifiers map to XDG desktop entries (`<identifier>.desktop`)
//! found in the usual application directories. An entry can receive an
//! image share when its `MimeType` key lists an `image/` type. Scoped shares
//! run the entry's `Exec` line; the chooser and the gallery go through the
//! system opener.

use super::share::{AppLauncher, GrantTable, ShareAction, ShareTarget};
use crate::errors::DispatchError;
use std::path::{Path, PathBuf};
use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Parsed `[Desktop Entry]` group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopEntry {
    pub exec: String,
    pub mime_types: Vec<String>,
    pub hidden: bool,
}

impl DesktopEntry {
    pub fn parse(text: &str) -> Option<Self> {
        let mut entry = DesktopEntry::default();
        let mut in_main_group = false;

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_main_group = line == "[Desktop Entry]";
                continue;
            }
            if !in_main_group {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                "Exec" => entry.exec = value.trim().to_string(),
                "MimeType" => {
                    entry.mime_types = value
                        .split(';')
                        .map(str::trim)
                        .filter(|m| !m.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "Hidden" => entry.hidden = value.trim() == "true",
                _ => {}
            }
        }

        (!entry.exec.is_empty()).then_some(entry)
    }

    /// Whether the entry accepts `mime`; `type/*` matches any subtype
    pub fn accepts(&self, mime: &str) -> bool {
        let wanted_prefix = mime.strip_suffix('*');
        self.mime_types.iter().any(|m| {
            m == mime
                || wanted_prefix.is_some_and(|p| m.starts_with(p))
                || m.strip_suffix('*').is_some_and(|p| mime.starts_with(p))
        })
    }

    /// Program and arguments that open `file`, with field codes expanded
    pub fn command_for(&self, file: &Path) -> Option<(String, Vec<String>)> {
        let path = file.display().to_string();
        let uri = format!("file://{}", path);
        let mut used_file = false;
        let mut argv = Vec::new();

        for word in split_exec(&self.exec) {
            match word.as_str() {
                "%f" | "%F" => {
                    argv.push(path.clone());
                    used_file = true;
                }
                "%u" | "%U" => {
                    argv.push(uri.clone());
                    used_file = true;
                }
                w if w.len() == 2 && w.starts_with('%') => {}
                w => argv.push(w.replace("%%", "%")),
            }
        }
        if !used_file {
            argv.push(path);
        }

        let mut argv = argv.into_iter();
        let program = argv.next()?;
        Some((program, argv.collect()))
    }
}

/// Split an `Exec` value into words, honouring double quotes
fn split_exec(exec: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = exec.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => quoted = !quoted,
            '\\' if quoted => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// XDG application directories, most specific first
pub fn application_dirs() -> Vec<PathBuf> {
    let mut result = Vec::new();
    if let Some(data) = dirs::data_dir() {
        result.push(data.join("applications"));
    }
    let system = std::env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
    for dir in system.split(':').filter(|d| !d.is_empty()) {
        result.push(Path::new(dir).join("applications"));
    }
    result.push(PathBuf::from("/var/lib/flatpak/exports/share/applications"));
    result
}

pub struct DesktopLauncher {
    grants: GrantTable,
    search_dirs: Vec<PathBuf>,
    gallery_dir: PathBuf,
}

impl DesktopLauncher {
    pub fn new(grants: GrantTable) -> Self {
        let gallery_dir = dirs::picture_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
        Self {
            grants,
            search_dirs: application_dirs(),
            gallery_dir,
        }
    }

    pub fn with_search_dirs(mut self, search_dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = search_dirs;
        self
    }

    pub fn with_gallery_dir(mut self, gallery_dir: PathBuf) -> Self {
        self.gallery_dir = gallery_dir;
        self
    }

    fn find_entry(&self, identifier: &str) -> Option<DesktopEntry> {
        let file_name = format!("{}.desktop", identifier);
        self.search_dirs.iter().find_map(|dir| {
            let text = std::fs::read_to_string(dir.join(&file_name)).ok()?;
            DesktopEntry::parse(&text).filter(|e| !e.hidden)
        })
    }

    fn launch(&self, identifier: &str, entry: &DesktopEntry, file: &Path) -> Result<(), DispatchError> {
        let launch_error = |reason: String| DispatchError::Launch {
            target: identifier.to_string(),
            reason,
        };
        let (program, args) = entry
            .command_for(file)
            .ok_or_else(|| launch_error("empty Exec line".to_string()))?;

        debug!(program = %program, args = ?args, "Launching application");
        let mut command = Command::new(&program);
        command.args(&args);
        spawn_detached(command).map_err(|e| launch_error(e.to_string()))?;
        Ok(())
    }
}

/// Start `command` without stdio and reap it from a background thread
///
/// The returned handle yields the exit status once the child ends.
pub fn spawn_detached(mut command: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    thread::Builder::new()
        .name("launch-reaper".to_string())
        .spawn(move || {
            let status = child.wait();
            if let Err(e) = &status {
                warn!(error = %e, "Failed to wait for launched application");
            }
            status
        })
}

impl AppLauncher for DesktopLauncher {
    fn can_handle(&self, identifier: &str, mime: &str) -> bool {
        self.find_entry(identifier).is_some_and(|e| e.accepts(mime))
    }

    fn send(&self, action: &ShareAction) -> Result<(), DispatchError> {
        match &action.target {
            ShareTarget::Application(identifier) => {
                let entry = self
                    .find_entry(identifier)
                    .ok_or_else(|| DispatchError::NoHandler(identifier.clone()))?;
                let file = self
                    .grants
                    .resolve_for(&action.reference, identifier)
                    .ok_or_else(|| DispatchError::Launch {
                        target: identifier.clone(),
                        reason: "no read grant for the shared image".to_string(),
                    })?;
                self.launch(identifier, &entry, &file)?;
                info!(identifier = %identifier, "Share sent");
                Ok(())
            }
            ShareTarget::Chooser { title } => {
                let file = self
                    .grants
                    .resolve_any(&action.reference)
                    .ok_or_else(|| DispatchError::NoHandler(action.mime.clone()))?;
                info!(title = %title, path = %file.display(), "Opening with system handler");
                open::that_detached(&file).map_err(|e| {
                    warn!(error = %e, "System opener failed");
                    DispatchError::NoHandler(action.mime.clone())
                })
            }
        }
    }

    fn view_gallery(&self) -> Result<(), DispatchError> {
        info!(path = %self.gallery_dir.display(), "Opening gallery directory");
        open::that(&self.gallery_dir).map_err(|e| {
            warn!(error = %e, path = %self.gallery_dir.display(), "Failed to open gallery directory");
            DispatchError::NoHandler("image viewer".to_string())
        })
    }
}
