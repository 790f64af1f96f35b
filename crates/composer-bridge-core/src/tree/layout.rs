//! # Layout - Display Tree to Flat Display Text
//!
//! Platforms that render into an attributed string (or any single editable
//! text buffer) see the document as one flat run of UTF-16 code units. The
//! layout computes that run once per tree:
//!
//! - the ordered [`Piece`]s that make up the display text, each with its flat
//!   display range, and
//! - the flat range of every node, so `(node, offset)` positions can be turned
//!   into flat indices and back.
//!
//! ## Lines and block boundaries
//!
//! Leaf blocks (paragraphs, list items, code blocks) each start a line, and
//! inline content outside any leaf block starts one when needed. Between two
//! consecutive lines the layout emits a virtual `"\n"` [`PieceKind::Boundary`]
//! worth one logical unit. Boundaries are only ever emitted *between* lines,
//! never after the last, and each is attributed to the innermost inline
//! wrapper that ended the line before it (the block itself for an empty line).
//!
//! ```text
//! <ol><li>Item 1</li><li>Item 2</li></ol><p>Some Text</p>
//!
//! "\t1.\t"  Decoration   0..4
//! "Item 1"  Text         4..10
//! "\n"      Boundary    10..11
//! "\t2.\t"  Decoration  11..15
//! "Item 2"  Text        15..21
//! "\n"      Boundary    21..22
//! "Some Text" Text      22..31
//! ```
//!
//! The walk uses an explicit stack, so pathological nesting cannot overflow
//! the call stack.

use std::borrow::Cow;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::{DisplayTree, NodeId, NodeKind};
use crate::utf16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    /// Real text; one logical unit per code unit
    Text,
    /// Zero logical width
    Decoration,
    /// A mention pill, collapsed to a fixed logical width
    Atomic,
    /// `<br>`, displayed as `"\n"`
    LineBreak,
    /// Virtual `"\n"` between two lines
    Boundary,
}

/// One contiguous run of display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// The node that produced this piece (the attributed node for boundaries)
    pub node: NodeId,
    pub kind: PieceKind,
    pub display: Range<usize>,
}

impl Piece {
    pub fn len(&self) -> usize {
        self.display.end - self.display.start
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layout {
    pub pieces: Vec<Piece>,
    /// Flat display range per node, indexed by [`NodeId`]
    pub ranges: Vec<Range<usize>>,
    /// The full display text
    pub text: String,
}

impl Layout {
    pub fn compute(tree: &DisplayTree) -> Self {
        LayoutWalker::new(tree).run()
    }

    pub fn display_len(&self) -> usize {
        self.ranges.first().map_or(0, |root| root.end)
    }

    pub fn range(&self, node: NodeId) -> Option<Range<usize>> {
        self.ranges.get(node.index()).cloned()
    }

    /// Pieces whose display range touches `index` (start <= index <= end),
    /// in document order.
    pub fn pieces_touching(&self, index: usize) -> &[Piece] {
        let lo = self.pieces.partition_point(|p| p.display.end < index);
        let hi = lo + self.pieces[lo..].partition_point(|p| p.display.start <= index);
        &self.pieces[lo..hi]
    }

    /// The run of adjacent text pieces strictly containing `index`, with its
    /// text. A grapheme cluster can cross an inline wrapper
    /// (`e<strong>\u{301}</strong>`), so clusters are snapped per run, not
    /// per node.
    pub(crate) fn text_run_at<'t>(
        &self,
        tree: &'t DisplayTree,
        index: usize,
    ) -> Option<(Range<usize>, Cow<'t, str>)> {
        let pieces = &self.pieces;
        let is_text = |i: usize| pieces.get(i).is_some_and(|p| p.kind == PieceKind::Text);
        let joined = |a: usize, b: usize| pieces[a].display.end == pieces[b].display.start;

        let lo = pieces.partition_point(|p| p.display.end < index);
        let hit = (lo..pieces.len())
            .take_while(|&i| pieces[i].display.start <= index)
            .find(|&i| is_text(i))?;
        let mut first = hit;
        while first > 0 && is_text(first - 1) && joined(first - 1, first) {
            first -= 1;
        }
        let mut last = hit;
        while is_text(last + 1) && joined(last, last + 1) {
            last += 1;
        }

        let run = pieces[first].display.start..pieces[last].display.end;
        if !(run.start < index && index < run.end) {
            return None;
        }
        let text_of = move |i: usize| -> &'t str {
            tree.kind(pieces[i].node)
                .and_then(NodeKind::text)
                .unwrap_or_default()
        };
        let text = if first == last {
            Cow::Borrowed(text_of(first))
        } else {
            Cow::Owned((first..=last).map(text_of).collect())
        };
        Some((run, text))
    }
}

enum Visit {
    Enter(NodeId),
    Exit(NodeId),
}

struct LayoutWalker<'t> {
    tree: &'t DisplayTree,
    pieces: Vec<Piece>,
    ranges: Vec<Range<usize>>,
    text: String,
    pos: usize,
    line_open: bool,
    /// The current line holds something other than decorations
    line_has_content: bool,
    /// Node a boundary after the current line would be attributed to
    line_owner: NodeId,
    /// Boundary owed before the next line, with its attributed node
    pending_boundary: Option<NodeId>,
    /// Containers entered while a boundary was pending; their start moves
    /// past the boundary once it is emitted
    unsettled: Vec<NodeId>,
}

impl<'t> LayoutWalker<'t> {
    fn new(tree: &'t DisplayTree) -> Self {
        Self {
            tree,
            pieces: Vec::new(),
            ranges: vec![0..0; tree.len()],
            text: String::new(),
            pos: 0,
            line_open: false,
            line_has_content: false,
            line_owner: NodeId::ROOT,
            pending_boundary: None,
            unsettled: Vec::new(),
        }
    }

    fn run(mut self) -> Layout {
        let tree = self.tree;
        let mut stack = vec![Visit::Enter(tree.root())];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(id) => {
                    let Some(node) = tree.get(id) else {
                        continue;
                    };
                    match &node.kind {
                        NodeKind::Text(text) => self.emit(id, PieceKind::Text, text),
                        NodeKind::Decoration { text, .. } => {
                            self.emit(id, PieceKind::Decoration, text)
                        }
                        NodeKind::LineBreak => self.emit(id, PieceKind::LineBreak, "\n"),
                        NodeKind::Mention { .. } => self.mention(id),
                        kind => {
                            self.enter_element(id, kind);
                            stack.push(Visit::Exit(id));
                            stack.extend(node.children.iter().rev().map(|&c| Visit::Enter(c)));
                        }
                    }
                }
                Visit::Exit(id) => self.exit_element(id),
            }
        }

        Layout {
            pieces: self.pieces,
            ranges: self.ranges,
            text: self.text,
        }
    }

    fn enter_element(&mut self, id: NodeId, kind: &NodeKind) {
        if kind.is_leaf_block() {
            // A leaf block opening on a line that so far only holds a list
            // prefix continues that line (`<li><p>text</p></li>`)
            if self.line_open && !self.line_has_content {
                self.line_owner = id;
            } else {
                self.close_line();
                self.open_line(id);
            }
        } else if kind.is_block() {
            self.close_line();
        } else if !self.line_open {
            self.open_line(id);
        }

        self.ranges[id.index()] = self.pos..self.pos;
        if self.pending_boundary.is_some() {
            self.unsettled.push(id);
        }
    }

    fn exit_element(&mut self, id: NodeId) {
        if self.tree.kind(id).is_some_and(NodeKind::is_block) {
            self.close_line();
        }
        self.unsettled.retain(|&u| u != id);
        let start = self.ranges[id.index()].start;
        self.ranges[id.index()] = start..self.pos;
    }

    fn close_line(&mut self) {
        if self.line_open {
            self.line_open = false;
            self.pending_boundary = Some(self.line_owner);
        }
    }

    fn open_line(&mut self, owner: NodeId) {
        if let Some(attributed) = self.pending_boundary.take() {
            let start = self.pos;
            self.push_text("\n");
            self.pieces.push(Piece {
                node: attributed,
                kind: PieceKind::Boundary,
                display: start..self.pos,
            });
            for id in self.unsettled.drain(..) {
                self.ranges[id.index()] = self.pos..self.pos;
            }
        }
        self.line_open = true;
        self.line_has_content = false;
        self.line_owner = owner;
    }

    fn emit(&mut self, id: NodeId, kind: PieceKind, text: &str) {
        if !self.line_open {
            let owner = self.tree.get(id).and_then(|n| n.parent).unwrap_or(id);
            self.open_line(owner);
        }
        let start = self.pos;
        self.push_text(text);
        self.ranges[id.index()] = start..self.pos;
        if text.is_empty() {
            return;
        }
        self.pieces.push(Piece {
            node: id,
            kind,
            display: start..self.pos,
        });
        if kind != PieceKind::Decoration {
            self.line_has_content = true;
        }
        if let Some(parent) = self.tree.get(id).and_then(|n| n.parent) {
            self.line_owner = parent;
        }
    }

    /// A mention is one atomic piece; its label text shares its range.
    fn mention(&mut self, id: NodeId) {
        let label = self.tree.text_content(id);
        self.emit(id, PieceKind::Atomic, &label);
        let range = self.ranges[id.index()].clone();
        let mut stack: Vec<NodeId> = self
            .tree
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        while let Some(child) = stack.pop() {
            self.ranges[child.index()] = range.clone();
            if let Some(node) = self.tree.get(child) {
                stack.extend(node.children.iter().copied());
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
        self.pos += utf16::len(text);
    }
}
