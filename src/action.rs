//! Plain action records and their creators.
//!
//! Actions are the only way commands request state changes. They carry
//! just the fields their tag needs and serialize as `{"type": "ADD_FILE", ...}`.

use crate::pane::{FileStats, PaneId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Open a new pane, optionally backed by a file on disk
    AddFile {
        filename: Option<PathBuf>,
        stats: Option<FileStats>,
    },
    /// Give input focus to a pane
    FocusFile { id: PaneId },
    /// Remove a pane
    CloseFile { id: PaneId },
    /// A pane's content was written; `filename` is set when it changed
    FileIsSaved {
        id: PaneId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<PathBuf>,
    },
}

pub fn add_file(filename: Option<PathBuf>, stats: Option<FileStats>) -> Action {
    Action::AddFile { filename, stats }
}

pub fn focus_file(id: impl Into<PaneId>) -> Action {
    Action::FocusFile { id: id.into() }
}

pub fn close_file(id: impl Into<PaneId>) -> Action {
    Action::CloseFile { id: id.into() }
}

pub fn file_is_saved(id: impl Into<PaneId>, filename: Option<PathBuf>) -> Action {
    Action::FileIsSaved {
        id: id.into(),
        filename,
    }
}

/// Sink for dispatched actions
pub trait Dispatch {
    fn dispatch(&mut self, action: Action);
}

impl Dispatch for Vec<Action> {
    fn dispatch(&mut self, action: Action) {
        self.push(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn add_file_carries_only_filename_and_stats() {
        let stats = FileStats {
            size: 3,
            is_file: true,
            ..Default::default()
        };
        let action = add_file(Some("a.js".into()), Some(stats.clone()));
        assert_eq!(
            action,
            Action::AddFile {
                filename: Some("a.js".into()),
                stats: Some(stats)
            }
        );

        let value = serde_json::to_value(&action).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&"type") && keys.contains(&"filename") && keys.contains(&"stats"));
        assert_eq!(value["type"], "ADD_FILE");
    }

    #[test]
    fn add_file_without_arguments() {
        let value = serde_json::to_value(add_file(None, None)).unwrap();
        assert_eq!(value, json!({"type": "ADD_FILE", "filename": null, "stats": null}));
    }

    #[test]
    fn focus_and_close_carry_id() {
        assert_eq!(
            serde_json::to_value(focus_file("a")).unwrap(),
            json!({"type": "FOCUS_FILE", "id": "a"})
        );
        assert_eq!(
            serde_json::to_value(close_file("a")).unwrap(),
            json!({"type": "CLOSE_FILE", "id": "a"})
        );
    }

    #[test]
    fn file_is_saved_omits_missing_filename() {
        let value = serde_json::to_value(file_is_saved("a", None)).unwrap();
        assert_eq!(value, json!({"type": "FILE_IS_SAVED", "id": "a"}));

        let value = serde_json::to_value(file_is_saved("a", Some("x.txt".into()))).unwrap();
        assert_eq!(value, json!({"type": "FILE_IS_SAVED", "id": "a", "filename": "x.txt"}));
    }

    #[test]
    fn actions_parse_from_json() {
        let action: Action =
            serde_json::from_value(json!({"type": "FILE_IS_SAVED", "id": "p1"})).unwrap();
        assert_eq!(action, file_is_saved("p1", None));

        let value: Value = serde_json::to_value(close_file("p2")).unwrap();
        let back: Action = serde_json::from_value(value).unwrap();
        assert_eq!(back, close_file("p2"));
    }

    #[test]
    fn vec_collects_dispatched_actions() {
        let mut dispatched: Vec<Action> = Vec::new();
        dispatched.dispatch(focus_file("a"));
        dispatched.dispatch(close_file("a"));
        assert_eq!(dispatched, vec![focus_file("a"), close_file("a")]);
    }
}
