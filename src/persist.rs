//! Session persistence.
//!
//! Keeps the list of open panes across runs of the shell. Buffer contents
//! are not stored; a pane reopens with the file it points at.

use crate::pane::{FileStats, Pane, PaneId};
use crate::state::EditorState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Version for detecting incompatible state format changes.
/// Increment this when the serialization format changes.
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("State version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Persisted application state.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Format version for compatibility checking.
    pub version: u32,
    /// Open panes in tab order.
    pub panes: Vec<PersistedPane>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedPane {
    pub id: PaneId,
    pub filename: Option<PathBuf>,
    pub has_focus: bool,
    pub stats: Option<FileStats>,
}

impl PersistedState {
    /// Save state to a file.
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Load state from a file.
    pub fn load(path: &Path) -> Result<Self, PersistError> {
        let mut file = fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let state: Self = serde_json::from_str(&contents)?;

        if state.version != STATE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: STATE_VERSION,
                found: state.version,
            });
        }

        Ok(state)
    }
}

impl EditorState {
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            version: STATE_VERSION,
            panes: self
                .panes()
                .iter()
                .map(|p| PersistedPane {
                    id: p.id.clone(),
                    filename: p.filename.clone(),
                    has_focus: p.has_focus,
                    stats: p.stats.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild state from disk. Only the first focused pane keeps focus.
    pub fn from_persisted(persisted: PersistedState) -> Self {
        let mut seen_focus = false;
        let panes = persisted
            .panes
            .into_iter()
            .map(|p| {
                let has_focus = p.has_focus && !seen_focus;
                seen_focus |= has_focus;
                Pane {
                    id: p.id,
                    filename: p.filename,
                    has_focus,
                    stats: p.stats,
                }
            })
            .collect();
        EditorState::from_panes(panes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::add_file;

    #[test]
    fn save_and_load_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut state = EditorState::new();
        state.reduce(&add_file(Some("a.txt".into()), None));
        state.reduce(&add_file(None, None));

        state.to_persisted().save(&path).unwrap();
        let restored = EditorState::from_persisted(PersistedState::load(&path).unwrap());
        assert_eq!(restored, state);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"version": 99, "panes": []}"#).unwrap();

        let err = PersistedState::load(&path).unwrap_err();
        assert!(matches!(
            err,
            PersistError::VersionMismatch { expected: STATE_VERSION, found: 99 }
        ));
    }

    #[test]
    fn only_first_focused_pane_keeps_focus() {
        let pane = |id: &str| PersistedPane {
            id: id.into(),
            filename: None,
            has_focus: true,
            stats: None,
        };
        let state = EditorState::from_persisted(PersistedState {
            version: STATE_VERSION,
            panes: vec![pane("a"), pane("b")],
        });

        assert_eq!(state.focused_pane().unwrap().id.as_str(), "a");
        assert!(!state.panes()[1].has_focus);
    }
}
