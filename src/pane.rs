//! Panes: one open editor tab each.

use crate::util::ids;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::Metadata;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

/// Identifier of a pane. Also the element id its widget is mounted under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(String);

impl PaneId {
    /// Generate a fresh `pane-XXXXXXXXXXXX` id
    pub fn generate() -> Self {
        Self(ids::new_pane_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PaneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PaneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File metadata reported by the host for an opened file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    /// Size in bytes
    pub size: u64,
    pub is_file: bool,
    pub is_dir: bool,
    pub readonly: bool,
    /// Last modification, seconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<u64>,
}

impl From<&Metadata> for FileStats {
    fn from(meta: &Metadata) -> Self {
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs());

        Self {
            size: meta.len(),
            is_file: meta.is_file(),
            is_dir: meta.is_dir(),
            readonly: meta.permissions().readonly(),
            modified,
        }
    }
}

/// One open editor tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pane {
    pub id: PaneId,
    /// `None` until the pane is first saved or was opened from disk
    pub filename: Option<PathBuf>,
    pub has_focus: bool,
    pub stats: Option<FileStats>,
}

impl Pane {
    pub fn new(id: PaneId) -> Self {
        Self {
            id,
            filename: None,
            has_focus: false,
            stats: None,
        }
    }

    /// Title shown in tab lists
    pub fn title(&self) -> String {
        match self.filename.as_ref().and_then(|f| f.file_name()) {
            Some(name) => name.to_string_lossy().into_owned(),
            None => "untitled".to_string(),
        }
    }
}
