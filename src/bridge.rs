//! The bridge to the privileged process that owns dialogs and the file system.

use crate::pane::FileStats;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to connect to {path}: {source}")]
    Connect { path: PathBuf, source: io::Error },
    #[error("bridge I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed bridge message: {0}")]
    Protocol(#[from] serde_json::Error),
    #[error("bridge closed the connection")]
    Closed,
    /// The host ran the request and reported a failure
    #[error("{0}")]
    Remote(String),
}

/// Flags that shape an open/save dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DialogProperty {
    OpenFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogOptions {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<DialogProperty>,
}

impl DialogOptions {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            default_path: None,
            properties: Vec::new(),
        }
    }

    pub fn default_path(mut self, path: Option<PathBuf>) -> Self {
        self.default_path = path;
        self
    }

    pub fn property(mut self, property: DialogProperty) -> Self {
        self.properties.push(property);
        self
    }
}

/// What a dialog returned. Platforms differ in whether one path or a
/// list comes back; an empty list means the user cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogSelection {
    Single(PathBuf),
    Multiple(Vec<PathBuf>),
}

impl DialogSelection {
    /// The chosen path, taking the first of several
    pub fn into_first(self) -> Option<PathBuf> {
        match self {
            DialogSelection::Single(path) => Some(path),
            DialogSelection::Multiple(paths) => paths.into_iter().next(),
        }
    }
}

/// Request/response channel to the privileged process.
///
/// Every call blocks until the host answers.
pub trait Bridge {
    fn save_file(&mut self, filename: &Path, content: &str) -> Result<(), BridgeError>;

    fn save_dialog(&mut self, options: &DialogOptions) -> Result<DialogSelection, BridgeError>;

    fn open_dialog(&mut self, options: &DialogOptions) -> Result<DialogSelection, BridgeError>;

    fn file_stats(&mut self, filename: &Path) -> Result<FileStats, BridgeError>;

    /// Text content of a file, used to fill a freshly mounted widget
    fn read_file(&mut self, filename: &Path) -> Result<String, BridgeError>;
}
