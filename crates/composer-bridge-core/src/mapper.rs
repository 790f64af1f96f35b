//! # Offset Mapper
//!
//! Pure translation between the three ways of pointing into a document:
//!
//! | space | unit | who uses it |
//! |---|---|---|
//! | logical offset | UTF-16 code unit of the engine's linear text | the formatting engine |
//! | flat display index | UTF-16 code unit of the rendered text | attributed-string platforms |
//! | [`DisplayPosition`] | `(node, offset)` into the display tree | DOM-like platforms |
//!
//! Flat index <-> logical offset only needs the
//! [`ReplacementRegistry`](crate::registry::ReplacementRegistry): outside a
//! registered span the two differ by the cumulative delta of every span
//! before the index. Node positions go through the layout's per-node ranges.
//!
//! ## Tie-breaking
//!
//! Several display positions can stand for the same logical offset (both
//! edges of a list prefix, the end of one text node and the start of the
//! next). Logical -> display always picks the **start of the following real
//! content**: logical 0 in `"\t1.\tItem 1"` is display 4, not 0.
//!
//! ```
//! use composer_bridge_core::{RenderOptions, render_html};
//!
//! let content = render_html(
//!     "<ol><li>Item 1</li><li>Item 2</li></ol><p>Some Text</p>",
//!     &RenderOptions::default(),
//! );
//! let mapper = content.mapper();
//! assert_eq!(mapper.logical_to_index(1).unwrap(), 5);
//! assert_eq!(mapper.index_to_logical(4).unwrap(), 0);
//! ```

use crate::error::MapError;
use crate::registry::SpanKind;
use crate::tree::{DisplayPosition, NodeId, NodeKind, PieceKind, RenderedContent};
use crate::utf16;

/// Which way to round an index that falls strictly inside a grapheme
/// cluster or an atomic span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bias {
    /// Caret: cluster floor, atomic span end
    Caret,
    /// Range start: cluster floor, atomic span start
    Start,
    /// Range end: cluster ceiling, atomic span end
    End,
}

/// Result of sweeping the registry for a logical offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    At(usize),
    /// The offset lies beyond the document by `remaining` units
    PastEnd { remaining: usize },
}

/// Borrowing view over one [`RenderedContent`].
#[derive(Debug, Clone, Copy)]
pub struct OffsetMapper<'a> {
    content: &'a RenderedContent,
}

impl<'a> OffsetMapper<'a> {
    pub fn new(content: &'a RenderedContent) -> Self {
        Self { content }
    }

    pub fn display_len(&self) -> usize {
        self.content.display_len()
    }

    pub fn logical_len(&self) -> usize {
        self.content.logical_len()
    }

    // ---- flat index <-> logical ----

    /// Logical offset of a flat display index (`htmlPosition`).
    ///
    /// Inside a decoration resolves to the logical position it collapses to;
    /// strictly inside an atomic span counts as reaching the span's end;
    /// inside a grapheme cluster floors to the cluster start.
    pub fn index_to_logical(&self, index: usize) -> Result<usize, MapError> {
        self.to_logical(index, Bias::Caret)
    }

    /// Flat display index of a logical offset (`attributedPosition`).
    pub fn logical_to_index(&self, logical: usize) -> Result<usize, MapError> {
        match self.resolve(logical) {
            Resolved::At(index) => Ok(index),
            Resolved::PastEnd { .. } => Err(MapError::OutOfBoundsLogicalIndex {
                index: logical,
                len: self.logical_len(),
            }),
        }
    }

    /// Like [`logical_to_index`](Self::logical_to_index), but offsets past
    /// the end of the document resolve to the end of the display.
    ///
    /// Used to normalise selections the engine reports against content
    /// that has since shrunk.
    pub fn logical_to_index_clamped(&self, logical: usize) -> usize {
        match self.resolve(logical) {
            Resolved::At(index) => index,
            Resolved::PastEnd { remaining } => {
                log::debug!("clamping logical {logical} ({remaining} past the end)");
                self.display_len()
            }
        }
    }

    /// Logical range of a display range. Inverted ranges are swapped; a
    /// non-collapsed range is widened so it never splits a grapheme cluster
    /// or an atomic span.
    pub fn display_range_to_logical(
        &self,
        start: usize,
        end: usize,
    ) -> Result<(usize, usize), MapError> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        if start == end {
            let logical = self.index_to_logical(start)?;
            return Ok((logical, logical));
        }
        Ok((self.to_logical(start, Bias::Start)?, self.to_logical(end, Bias::End)?))
    }

    /// Display range of a logical range; inverted ranges are swapped.
    pub fn logical_range_to_display(
        &self,
        start: usize,
        end: usize,
    ) -> Result<(usize, usize), MapError> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Ok((self.logical_to_index(start)?, self.logical_to_index(end)?))
    }

    // ---- node position <-> logical ----

    /// Logical offset of a node position (`displayToLogical`).
    pub fn display_to_logical(&self, position: DisplayPosition) -> Result<usize, MapError> {
        self.index_to_logical(self.position_to_index(position)?)
    }

    /// Canonical node position of a logical offset (`logicalToDisplay`).
    pub fn logical_to_display(&self, logical: usize) -> Result<DisplayPosition, MapError> {
        self.index_to_position(self.logical_to_index(logical)?)
    }

    /// Web-style query: the logical offset of `position`, or `None` when the
    /// position does not exist.
    pub fn count_code_units(&self, position: DisplayPosition) -> Option<usize> {
        self.display_to_logical(position).ok()
    }

    // ---- node position <-> flat index ----

    /// Flat display index of a node position.
    pub fn position_to_index(&self, position: DisplayPosition) -> Result<usize, MapError> {
        let DisplayPosition { node: id, offset } = position;
        let tree = &self.content.tree;
        let node = tree.node(id)?;
        let range = self
            .content
            .layout
            .range(id)
            .ok_or(MapError::UnknownNode(id))?;
        let out_of_bounds = || MapError::OutOfBoundsDisplayIndex {
            index: range.start + offset,
            len: self.display_len(),
        };

        match &node.kind {
            NodeKind::Text(text) | NodeKind::Decoration { text, .. } => {
                if offset > utf16::len(text) {
                    return Err(out_of_bounds());
                }
                Ok(range.start + offset)
            }
            NodeKind::LineBreak => match offset {
                0 => Ok(range.start),
                1 => Ok(range.end),
                _ => Err(out_of_bounds()),
            },
            NodeKind::Mention { .. } => match offset {
                0 => Ok(range.start),
                n if n == node.children.len() => Ok(range.end),
                _ => Err(out_of_bounds()),
            },
            _ => match offset {
                0 => Ok(range.start),
                n if n == node.children.len() => Ok(range.end),
                n if n < node.children.len() => self
                    .content
                    .layout
                    .range(node.children[n])
                    .map(|child| child.start)
                    .ok_or(MapError::UnknownNode(node.children[n])),
                _ => Err(out_of_bounds()),
            },
        }
    }

    /// Canonical node position for a flat display index.
    ///
    /// Ties prefer, in order: the start of a text node, the inside of one, the
    /// start of a mention or line break, the end of a text node, then mention,
    /// line-break and decoration edges. An index touching none of those (an
    /// empty line) resolves to the deepest element starting, then ending, at
    /// it.
    pub fn index_to_position(&self, index: usize) -> Result<DisplayPosition, MapError> {
        let len = self.display_len();
        if index > len {
            return Err(MapError::OutOfBoundsDisplayIndex { index, len });
        }
        let tree = &self.content.tree;

        let mut best: Option<(u8, DisplayPosition)> = None;
        for piece in self.content.layout.pieces_touching(index) {
            let at_start = piece.display.start == index;
            let at_end = piece.display.end == index;
            let inside = !at_start && !at_end;
            let end_offset = || match tree.get(piece.node) {
                Some(node) if matches!(node.kind, NodeKind::Mention { .. }) => node.children.len(),
                _ => piece.len(),
            };

            let candidate = match piece.kind {
                PieceKind::Text if at_start => Some((0, 0)),
                PieceKind::Text if inside => Some((1, index - piece.display.start)),
                PieceKind::Atomic | PieceKind::LineBreak if at_start => Some((2, 0)),
                PieceKind::Text if at_end => Some((3, piece.len())),
                PieceKind::Atomic if inside => {
                    // Strictly inside a pill: the label text at the same offset
                    let label = tree
                        .get(piece.node)
                        .and_then(|n| n.children.first().copied());
                    if let Some(label) = label {
                        let position =
                            DisplayPosition::new(label, index - piece.display.start);
                        best = pick(best, (4, position));
                    }
                    None
                }
                PieceKind::Atomic | PieceKind::LineBreak if at_end => Some((5, end_offset())),
                PieceKind::Decoration => Some((6, index - piece.display.start)),
                _ => None,
            };
            if let Some((rank, offset)) = candidate {
                best = pick(best, (rank, DisplayPosition::new(piece.node, offset)));
            }
        }

        if let Some((_, position)) = best {
            return Ok(position);
        }
        Ok(self.element_edge_at(index))
    }

    /// Deepest element whose range starts at `index`, else the deepest one
    /// ending there. The root spans the whole display, so one always exists
    /// for the index of an empty line or the document end.
    fn element_edge_at(&self, index: usize) -> DisplayPosition {
        let tree = &self.content.tree;
        let ranges = &self.content.layout.ranges;
        let depth = |id: NodeId| tree.ancestors(id).count();
        let elements = || {
            tree.ids().filter(|&id| {
                tree.kind(id)
                    .is_some_and(|k| !k.is_text_like() && !matches!(k, NodeKind::LineBreak))
            })
        };

        if let Some(id) = elements()
            .filter(|id| ranges[id.index()].start == index)
            .max_by_key(|&id| depth(id))
        {
            return DisplayPosition::new(id, 0);
        }
        let id = elements()
            .filter(|id| ranges[id.index()].end == index)
            .max_by_key(|&id| depth(id))
            .unwrap_or(NodeId::ROOT);
        let children = tree.get(id).map_or(0, |n| n.children.len());
        DisplayPosition::new(id, children)
    }

    // ---- internals ----

    fn to_logical(&self, index: usize, bias: Bias) -> Result<usize, MapError> {
        let len = self.display_len();
        if index > len {
            return Err(MapError::OutOfBoundsDisplayIndex { index, len });
        }
        let registry = &self.content.registry;

        if let Some(span) = registry.span_containing(index) {
            let start = self.logical_at(span.display.start);
            return Ok(match (span.kind, bias) {
                (SpanKind::Decorative(_), _) => start,
                (SpanKind::Atomic(_), Bias::Start) => start,
                (SpanKind::Atomic(_), _) => start + span.logical_width,
            });
        }

        let index = match self.content.layout.text_run_at(&self.content.tree, index) {
            Some((run, text)) => {
                let offset = index - run.start;
                let snapped = match bias {
                    Bias::End => utf16::ceil_cluster(&text, offset),
                    Bias::Caret | Bias::Start => utf16::floor_cluster(&text, offset),
                };
                run.start + snapped
            }
            None => index,
        };
        Ok(self.logical_at(index))
    }

    /// `index - delta` for an index not strictly inside any span.
    fn logical_at(&self, index: usize) -> usize {
        let delta = self.content.registry.cumulative_delta_before(index);
        (index as isize - delta).max(0) as usize
    }

    /// Sweep the registry in display order, skipping decorations at or
    /// before the target and stepping over atomic spans.
    fn resolve(&self, logical: usize) -> Resolved {
        let logical_len = self.logical_len();
        if logical > logical_len {
            return Resolved::PastEnd {
                remaining: logical - logical_len,
            };
        }

        let target = logical as isize;
        let mut delta: isize = 0;
        for span in self.content.registry.spans() {
            let span_logical = span.display.start as isize - delta;
            match span.kind {
                SpanKind::Decorative(_) => {
                    if span_logical > target {
                        break;
                    }
                }
                SpanKind::Atomic(_) => {
                    let span_end = span_logical + span.logical_width as isize;
                    if target <= span_logical {
                        break;
                    }
                    if target < span_end {
                        return Resolved::At(span.display.end);
                    }
                }
            }
            delta += span.delta();
        }
        Resolved::At((target + delta).max(0) as usize)
    }
}

/// Keep the lower-ranked candidate; the first one wins ties.
fn pick(
    best: Option<(u8, DisplayPosition)>,
    candidate: (u8, DisplayPosition),
) -> Option<(u8, DisplayPosition)> {
    match best {
        Some(current) if current.0 <= candidate.0 => Some(current),
        _ => Some(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RenderOptions;
    use crate::tree::render_html;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const LISTS: &str = "<ol><li>Item 1</li><li>Item 2</li></ol><p>Some Text</p>";
    const MENTION: &str = r#"<p>hi <a data-mention-type="user" href="https://matrix.to/#/@alice:example.org">Alice</a> there</p>"#;

    fn render(html: &str) -> RenderedContent {
        render_html(html, &RenderOptions::default())
    }

    #[rstest]
    #[case(0, 4)]
    #[case(1, 5)]
    #[case(6, 10)]
    #[case(7, 15)]
    #[case(13, 21)]
    #[case(14, 22)]
    #[case(23, 31)]
    fn list_logical_to_index(#[case] logical: usize, #[case] index: usize) {
        let content = render(LISTS);
        assert_eq!(content.mapper().logical_to_index(logical), Ok(index));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(2, 0)]
    #[case(4, 0)]
    #[case(5, 1)]
    #[case(10, 6)]
    #[case(11, 7)]
    #[case(13, 7)]
    #[case(15, 7)]
    #[case(31, 23)]
    fn list_index_to_logical(#[case] index: usize, #[case] logical: usize) {
        let content = render(LISTS);
        assert_eq!(content.mapper().index_to_logical(index), Ok(logical));
    }

    #[test]
    fn out_of_bounds_errors() {
        let content = render(LISTS);
        let mapper = content.mapper();
        assert_eq!(
            mapper.index_to_logical(32),
            Err(MapError::OutOfBoundsDisplayIndex { index: 32, len: 31 })
        );
        assert_eq!(
            mapper.logical_to_index(24),
            Err(MapError::OutOfBoundsLogicalIndex { index: 24, len: 23 })
        );
        assert_eq!(mapper.logical_to_index_clamped(100), 31);
    }

    #[test]
    fn mention_interior_is_atomic() {
        // "hi Alice there": the pill covers display 3..8, logical 3..4
        let content = render(MENTION);
        let mapper = content.mapper();
        assert_eq!(content.logical_len(), 10);
        assert_eq!(mapper.index_to_logical(3), Ok(3));
        for inside in 4..8 {
            assert_eq!(mapper.index_to_logical(inside), Ok(4));
        }
        assert_eq!(mapper.index_to_logical(8), Ok(4));
        assert_eq!(mapper.logical_to_index(3), Ok(3));
        assert_eq!(mapper.logical_to_index(4), Ok(8));
        assert_eq!(mapper.display_range_to_logical(5, 6), Ok((3, 4)));
    }

    #[test]
    fn wide_mention_interior_resolves_to_end() {
        let options = RenderOptions {
            mention_width: 3,
            ..RenderOptions::default()
        };
        let content = render_html(MENTION, &options);
        let mapper = content.mapper();
        assert_eq!(mapper.logical_to_index(4), Ok(8));
        assert_eq!(mapper.logical_to_index(6), Ok(8));
        assert_eq!(mapper.index_to_logical(8), Ok(6));
    }

    #[test]
    fn text_node_count_code_units() {
        let content = render("abcdefgh");
        let mapper = content.mapper();
        let text = content.tree.node(content.tree.root()).unwrap().children[0];
        for k in 0..=8 {
            assert_eq!(mapper.count_code_units(DisplayPosition::new(text, k)), Some(k));
        }
        assert_eq!(mapper.count_code_units(DisplayPosition::new(text, 9)), None);
        assert_eq!(mapper.count_code_units(DisplayPosition::new(NodeId(99), 0)), None);
    }

    #[test]
    fn root_end_is_logical_length() {
        let content = render(LISTS);
        let root = content.tree.root();
        let children = content.tree.node(root).unwrap().children.len();
        assert_eq!(
            content.mapper().display_to_logical(DisplayPosition::new(root, children)),
            Ok(23)
        );
        assert!(
            content
                .mapper()
                .display_to_logical(DisplayPosition::new(root, children + 1))
                .is_err()
        );
    }

    #[test]
    fn logical_to_display_prefers_following_text() {
        let content = render(LISTS);
        let mapper = content.mapper();
        let position = mapper.logical_to_display(7).unwrap();
        assert_eq!(
            content.tree.kind(position.node),
            Some(&NodeKind::Text("Item 2".into()))
        );
        assert_eq!(position.offset, 0);
    }

    #[test]
    fn line_break_end_defers_to_next_sibling() {
        let content = render("<p>a<br />b</p>");
        let mapper = content.mapper();
        let position = mapper.logical_to_display(2).unwrap();
        assert_eq!(content.tree.kind(position.node), Some(&NodeKind::Text("b".into())));
        assert_eq!(position.offset, 0);
    }

    #[test]
    fn cluster_interior_floors_for_caret_and_ceils_for_range_end() {
        let content = render("<p>a\u{1F469}\u{1F3FF}\u{200D}\u{1F680}bcd</p>");
        let mapper = content.mapper();
        assert_eq!(mapper.index_to_logical(4), Ok(1));
        assert_eq!(mapper.display_range_to_logical(0, 4), Ok((0, 8)));
        assert_eq!(mapper.display_range_to_logical(4, 2), Ok((1, 8)));
    }

    #[test]
    fn cluster_split_across_inline_wrappers_is_snapped() {
        // "e" + U+0301 is one cluster even though the accent is bold
        let content = render("<p>e<strong>\u{301}</strong>x</p>");
        let mapper = content.mapper();
        assert_eq!(content.display_text(), "e\u{301}x");
        assert_eq!(mapper.index_to_logical(1), Ok(0));
        assert_eq!(mapper.display_range_to_logical(0, 1), Ok((0, 2)));
        assert_eq!(mapper.display_range_to_logical(1, 3), Ok((0, 3)));
        assert_eq!(mapper.index_to_logical(2), Ok(2));
    }

    #[test]
    fn round_trip_over_every_logical_offset() {
        for html in [LISTS, MENTION, "<p>a</p><p></p><p>b<br />c</p>", "<blockquote><p>q</p></blockquote><ul><li></li></ul>"] {
            let content = render(html);
            let mapper = content.mapper();
            for logical in 0..=content.logical_len() {
                let position = mapper.logical_to_display(logical).unwrap();
                assert_eq!(mapper.display_to_logical(position), Ok(logical), "{html} @ {logical}");
            }
        }
    }

    #[test]
    fn every_index_position_round_trips() {
        let bare = RenderOptions {
            empty_block_placeholder: None,
            ..RenderOptions::default()
        };
        let documents = [
            render("<p>x</p><p></p><ul><li>a<ul><li>b</li></ul></li></ul>"),
            render_html("<p>x</p><p></p><p>y</p>", &bare),
            render(""),
        ];
        for content in &documents {
            let mapper = content.mapper();
            for index in 0..=content.display_len() {
                let position = mapper.index_to_position(index).unwrap();
                assert_eq!(mapper.position_to_index(position), Ok(index), "index {index}");
            }
        }
    }

    #[test]
    fn empty_line_resolves_to_its_block() {
        let bare = RenderOptions {
            empty_block_placeholder: None,
            ..RenderOptions::default()
        };
        let content = render_html("<p>x</p><p></p><p>y</p>", &bare);
        assert_eq!(content.display_text(), "x\n\ny");
        let position = content.mapper().index_to_position(2).unwrap();
        assert_eq!(content.tree.kind(position.node), Some(&NodeKind::Paragraph));
        assert_eq!(position, DisplayPosition::new(NodeId(3), 0));
    }
}
