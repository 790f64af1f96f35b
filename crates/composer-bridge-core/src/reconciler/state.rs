use serde::{Deserialize, Serialize};

use super::platform::DisplaySelection;
use crate::tree::RenderedContent;

/// The selection in both coordinate spaces.
///
/// Always derived from the logical pair against the current content, never
/// patched in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    pub anchor: usize,
    pub focus: usize,
    pub start_display: usize,
    pub end_display: usize,
}

impl SelectionState {
    /// Derive the display side of a logical selection. Offsets past the end
    /// of `content` clamp to its end.
    pub fn derive(content: &RenderedContent, anchor: usize, focus: usize) -> Self {
        let mapper = content.mapper();
        let (start, end) = if anchor <= focus {
            (anchor, focus)
        } else {
            (focus, anchor)
        };
        Self {
            anchor,
            focus,
            start_display: mapper.logical_to_index_clamped(start),
            end_display: mapper.logical_to_index_clamped(end),
        }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.focus)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.focus)
    }

    pub fn display(&self) -> DisplaySelection {
        DisplaySelection::new(self.start_display, self.end_display)
    }
}

/// An active IME composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionRegion {
    pub display: DisplaySelection,
    /// What the IME has composed so far
    pub text: String,
}
