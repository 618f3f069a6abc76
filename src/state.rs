//! Pane state, its reducer, and the store commands run against.

use crate::action::{Action, Dispatch};
use crate::pane::{Pane, PaneId};

/// The open panes, in tab order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    panes: Vec<Pane>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_panes(panes: Vec<Pane>) -> Self {
        Self { panes }
    }

    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    pub fn pane(&self, id: &PaneId) -> Option<&Pane> {
        self.panes.iter().find(|p| p.id == *id)
    }

    /// The pane that currently has input focus
    pub fn focused_pane(&self) -> Option<&Pane> {
        self.panes.iter().find(|p| p.has_focus)
    }

    /// Apply one action. Keeps at most one pane focused.
    pub fn reduce(&mut self, action: &Action) {
        match action {
            Action::AddFile { filename, stats } => {
                let mut pane = Pane::new(PaneId::generate());
                pane.filename = filename.clone();
                pane.stats = stats.clone();
                self.panes.push(pane);
                let last = self.panes.len() - 1;
                self.focus_index(last);
            }
            Action::FocusFile { id } => {
                if let Some(idx) = self.position(id) {
                    self.focus_index(idx);
                }
            }
            Action::CloseFile { id } => {
                let Some(idx) = self.position(id) else {
                    return;
                };
                let removed = self.panes.remove(idx);
                if removed.has_focus && !self.panes.is_empty() {
                    // Focus the pane that slid into the closed slot, or the new last one
                    let next = idx.min(self.panes.len() - 1);
                    self.focus_index(next);
                }
            }
            Action::FileIsSaved { id, filename } => {
                if let (Some(filename), Some(idx)) = (filename, self.position(id)) {
                    self.panes[idx].filename = Some(filename.clone());
                }
            }
        }
    }

    fn position(&self, id: &PaneId) -> Option<usize> {
        self.panes.iter().position(|p| p.id == *id)
    }

    fn focus_index(&mut self, idx: usize) {
        for (i, pane) in self.panes.iter_mut().enumerate() {
            pane.has_focus = i == idx;
        }
    }
}

/// Owns the canonical state. Commands run against a snapshot and their
/// dispatched actions are reduced in order once they return.
#[derive(Debug, Default)]
pub struct Store {
    state: EditorState,
}

impl Store {
    pub fn new(state: EditorState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Run `f` with read access to the state and a dispatcher. Actions
    /// are applied after `f` returns, even when it reports an error.
    pub fn run<R>(&mut self, f: impl FnOnce(&EditorState, &mut Vec<Action>) -> R) -> R {
        let mut dispatched = Vec::new();
        let result = f(&self.state, &mut dispatched);
        for action in dispatched {
            self.dispatch(action);
        }
        result
    }
}

impl Dispatch for Store {
    fn dispatch(&mut self, action: Action) {
        log::debug!("dispatch {:?}", action);
        self.state.reduce(&action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{add_file, close_file, file_is_saved, focus_file};
    use std::path::PathBuf;

    fn state_with(ids: &[&str], focused: &str) -> EditorState {
        let panes = ids
            .iter()
            .map(|id| {
                let mut pane = Pane::new((*id).into());
                pane.has_focus = *id == focused;
                pane
            })
            .collect();
        EditorState::from_panes(panes)
    }

    fn focused_id(state: &EditorState) -> Option<&str> {
        state.focused_pane().map(|p| p.id.as_str())
    }

    #[test]
    fn add_file_appends_focused_pane() {
        let mut state = state_with(&["a"], "a");
        state.reduce(&add_file(Some("x.txt".into()), None));

        assert_eq!(state.panes().len(), 2);
        let added = &state.panes()[1];
        assert!(added.has_focus);
        assert_eq!(added.filename, Some(PathBuf::from("x.txt")));
        assert!(!state.panes()[0].has_focus);
    }

    #[test]
    fn focus_file_moves_focus() {
        let mut state = state_with(&["a", "b", "c"], "a");
        state.reduce(&focus_file("c"));
        assert_eq!(focused_id(&state), Some("c"));
        assert_eq!(state.panes().iter().filter(|p| p.has_focus).count(), 1);
    }

    #[test]
    fn focus_unknown_pane_is_noop() {
        let mut state = state_with(&["a", "b"], "b");
        let before = state.clone();
        state.reduce(&focus_file("zzz"));
        assert_eq!(state, before);
    }

    #[test]
    fn close_focused_pane_focuses_neighbor() {
        let mut state = state_with(&["a", "b", "c"], "b");
        state.reduce(&close_file("b"));
        assert_eq!(focused_id(&state), Some("c"));

        state.reduce(&close_file("c"));
        assert_eq!(focused_id(&state), Some("a"));

        state.reduce(&close_file("a"));
        assert!(state.panes().is_empty());
        assert!(state.focused_pane().is_none());
    }

    #[test]
    fn close_unfocused_pane_keeps_focus() {
        let mut state = state_with(&["a", "b", "c"], "c");
        state.reduce(&close_file("a"));
        assert_eq!(focused_id(&state), Some("c"));
    }

    #[test]
    fn file_is_saved_sets_filename_only_when_given() {
        let mut state = state_with(&["a"], "a");
        state.reduce(&file_is_saved("a", Some("out.txt".into())));
        assert_eq!(state.panes()[0].filename, Some(PathBuf::from("out.txt")));

        state.reduce(&file_is_saved("a", None));
        assert_eq!(state.panes()[0].filename, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn store_applies_dispatched_actions_in_order() {
        let mut store = Store::new(state_with(&["a", "b"], "a"));
        let seen = store.run(|state, dispatch| {
            dispatch.dispatch(focus_file("b"));
            dispatch.dispatch(close_file("a"));
            focused_id(state).map(str::to_string)
        });

        // The closure saw the state before any action was applied
        assert_eq!(seen.as_deref(), Some("a"));
        assert_eq!(store.state().panes().len(), 1);
        assert_eq!(focused_id(store.state()), Some("b"));
    }
}
