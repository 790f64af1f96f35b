//! Capabilities the reconciler needs from the native control.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::tree::RenderedContent;

/// A selection in flat display indices. `start > end` for a backwards
/// selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DisplaySelection {
    pub start: usize,
    pub end: usize,
}

impl DisplaySelection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(at: usize) -> Self {
        Self::new(at, at)
    }

    /// The same range with `start <= end`.
    pub fn normalized(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self::new(self.end, self.start)
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// The native text control being driven.
pub trait RenderTarget {
    /// Replace everything the control displays.
    fn set_display_content(&mut self, content: &RenderedContent);

    fn set_selection(&mut self, selection: DisplaySelection);

    /// Group the next content and selection changes into one undoable,
    /// non-notifying edit.
    fn begin_batch_edit(&mut self) {}

    fn end_batch_edit(&mut self) {}

    /// IME support, when the platform has it.
    fn composition_host(&mut self) -> Option<&mut dyn CompositionHost> {
        None
    }
}

/// Where the platform's input method draws its composing underline.
pub trait CompositionHost {
    fn begin_composition(&mut self, range: DisplaySelection);
    fn update_composition(&mut self, range: DisplaySelection);
    fn commit_composition(&mut self, range: DisplaySelection);
    fn cancel_composition(&mut self, range: DisplaySelection);
}

/// Native input, already decoded from platform events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    InsertText { text: String },
    DeleteBackward,
    DeleteForward,
    InsertParagraph,
    /// The IME replaced its composing text with `text`
    CompositionUpdate { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: InputKind,
    /// Native selection at the time of the event, if the platform reports one
    pub selection: Option<DisplaySelection>,
}

impl InputEvent {
    pub fn new(kind: InputKind) -> Self {
        Self {
            kind,
            selection: None,
        }
    }

    pub fn at(kind: InputKind, selection: DisplaySelection) -> Self {
        Self {
            kind,
            selection: Some(selection),
        }
    }

    pub fn insert_text(text: impl Into<String>) -> Self {
        Self::new(InputKind::InsertText { text: text.into() })
    }
}

/// Hardware key events waiting to be replayed as input, oldest first.
///
/// There is no cancellation: events already queued are drained in order.
#[derive(Debug, Clone, Default)]
pub struct KeyEventQueue {
    events: VecDeque<InputEvent>,
}

impl KeyEventQueue {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
