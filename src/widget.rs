//! Access to the on-screen editor widgets that back each pane.

use crate::pane::PaneId;
use std::collections::HashMap;

/// Handle to a mounted editor widget
pub trait EditorWidget {
    /// Current text content
    fn value(&self) -> String;

    /// Move input focus to this widget
    fn focus(&mut self);
}

/// Locates the widget mounted for a pane
pub trait WidgetHost {
    fn widget(&mut self, id: &PaneId) -> Option<&mut dyn EditorWidget>;
}

/// Plain in-memory text widget
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBuffer {
    text: String,
    focused: bool,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            focused: false,
        }
    }

    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }
}

impl EditorWidget for TextBuffer {
    fn value(&self) -> String {
        self.text.clone()
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

/// Widgets keyed by the pane they are mounted for
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: HashMap<PaneId, TextBuffer>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, id: PaneId, widget: TextBuffer) {
        self.widgets.insert(id, widget);
    }

    pub fn get(&self, id: &PaneId) -> Option<&TextBuffer> {
        self.widgets.get(id)
    }

    pub fn get_mut(&mut self, id: &PaneId) -> Option<&mut TextBuffer> {
        self.widgets.get_mut(id)
    }

    pub fn contains(&self, id: &PaneId) -> bool {
        self.widgets.contains_key(id)
    }

    /// Mount an empty buffer for every pane in `ids` that has none, and
    /// drop buffers whose pane is gone. Returns the newly mounted ids.
    pub fn sync<'a>(&mut self, ids: impl IntoIterator<Item = &'a PaneId>) -> Vec<PaneId> {
        let live: Vec<&PaneId> = ids.into_iter().collect();
        self.widgets.retain(|id, _| live.contains(&id));

        let mut mounted = Vec::new();
        for id in live {
            if !self.widgets.contains_key(id) {
                self.widgets.insert(id.clone(), TextBuffer::default());
                mounted.push(id.clone());
            }
        }
        mounted
    }
}

impl WidgetHost for WidgetRegistry {
    fn widget(&mut self, id: &PaneId) -> Option<&mut dyn EditorWidget> {
        self.widgets
            .get_mut(id)
            .map(|w| w as &mut dyn EditorWidget)
    }
}
