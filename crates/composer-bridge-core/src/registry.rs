//! # Replacement Registry
//!
//! Records the display ranges whose logical width differs from their display
//! width:
//!
//! - **decorative** spans (list prefixes, placeholders, quote prefixes) are
//!   worth zero logical units;
//! - **atomic** spans (mention pills, `@room`) are worth a fixed number of
//!   logical units however long their label is.
//!
//! Spans are registered in display order while the layout is built, and the
//! registry keeps a running sum of `display_width - logical_width` so that
//! [`cumulative_delta_before`](ReplacementRegistry::cumulative_delta_before)
//! is a binary search.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::mention::MentionKind;
use crate::tree::DecorationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanKind {
    Decorative(DecorationKind),
    Atomic(MentionKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementSpan {
    pub display: Range<usize>,
    pub logical_width: usize,
    pub kind: SpanKind,
}

impl ReplacementSpan {
    pub fn display_width(&self) -> usize {
        self.display.end - self.display.start
    }

    /// `display_width - logical_width`; negative when the span is wider in
    /// logical space.
    pub fn delta(&self) -> isize {
        self.display_width() as isize - self.logical_width as isize
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self.kind, SpanKind::Atomic(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementRegistry {
    spans: Vec<ReplacementSpan>,
    /// `prefix[i]` is the summed delta of `spans[..=i]`
    prefix: Vec<isize>,
}

impl ReplacementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a span.
    ///
    /// # Panics
    ///
    /// If the range is inverted, or starts before the end of the previously
    /// registered span. Both are bugs in the caller, not bad input.
    pub fn register(&mut self, display: Range<usize>, logical_width: usize, kind: SpanKind) {
        assert!(
            display.start <= display.end,
            "inverted replacement span {display:?}"
        );
        if let Some(last) = self.spans.last() {
            assert!(
                last.display.end <= display.start,
                "replacement span {display:?} overlaps or precedes {:?}",
                last.display
            );
        }

        let span = ReplacementSpan {
            display,
            logical_width,
            kind,
        };
        let total = self.total_delta() + span.delta();
        self.spans.push(span);
        self.prefix.push(total);
    }

    /// Sum of `display_width - logical_width` over every span that ends at
    /// or before `display`.
    pub fn cumulative_delta_before(&self, display: usize) -> isize {
        match self.preceding(display) {
            0 => 0,
            n => self.prefix[n - 1],
        }
    }

    /// The span strictly enclosing `display` (`start < display < end`).
    pub fn span_containing(&self, display: usize) -> Option<&ReplacementSpan> {
        self.spans
            .get(self.preceding(display))
            .filter(|span| span.display.start < display && display < span.display.end)
    }

    pub fn clear(&mut self) {
        self.spans.clear();
        self.prefix.clear();
    }

    pub fn spans(&self) -> &[ReplacementSpan] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn total_delta(&self) -> isize {
        self.prefix.last().copied().unwrap_or(0)
    }

    /// Number of spans that end at or before `display`.
    fn preceding(&self, display: usize) -> usize {
        self.spans.partition_point(|span| span.display.end <= display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const PREFIX: SpanKind = SpanKind::Decorative(DecorationKind::ListPrefix);
    const USER: SpanKind = SpanKind::Atomic(MentionKind::User);

    /// Two list prefixes and a mention: `[0,4) [11,15) [18,23)`
    #[fixture]
    fn registry() -> ReplacementRegistry {
        let mut registry = ReplacementRegistry::new();
        registry.register(0..4, 0, PREFIX);
        registry.register(11..15, 0, PREFIX);
        registry.register(18..23, 1, USER);
        registry
    }

    #[rstest]
    #[case(0, 0)]
    #[case(3, 0)]
    #[case(4, 4)]
    #[case(11, 4)]
    #[case(15, 8)]
    #[case(20, 8)]
    #[case(23, 12)]
    #[case(100, 12)]
    fn cumulative_delta(registry: ReplacementRegistry, #[case] at: usize, #[case] delta: isize) {
        assert_eq!(registry.cumulative_delta_before(at), delta);
    }

    #[rstest]
    #[case(0, None)]
    #[case(2, Some(0..4))]
    #[case(4, None)]
    #[case(11, None)]
    #[case(19, Some(18..23))]
    #[case(23, None)]
    fn containing(
        registry: ReplacementRegistry,
        #[case] at: usize,
        #[case] expected: Option<Range<usize>>,
    ) {
        assert_eq!(
            registry.span_containing(at).map(|s| s.display.clone()),
            expected
        );
    }

    #[rstest]
    fn clear_forgets_everything(mut registry: ReplacementRegistry) {
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.cumulative_delta_before(50), 0);
        assert_eq!(registry.total_delta(), 0);
    }

    #[test]
    fn logically_wider_span_has_negative_delta() {
        let mut registry = ReplacementRegistry::new();
        registry.register(2..3, 4, USER);
        assert_eq!(registry.cumulative_delta_before(3), -3);
    }

    #[test]
    #[should_panic(expected = "overlaps")]
    fn overlapping_registration_panics() {
        let mut registry = ReplacementRegistry::new();
        registry.register(0..4, 0, PREFIX);
        registry.register(3..6, 0, PREFIX);
    }

    #[test]
    #[should_panic(expected = "overlaps or precedes")]
    fn out_of_order_registration_panics() {
        let mut registry = ReplacementRegistry::new();
        registry.register(10..12, 0, PREFIX);
        registry.register(0..2, 0, PREFIX);
    }

    #[test]
    #[should_panic(expected = "inverted")]
    #[allow(clippy::reversed_empty_ranges)]
    fn inverted_registration_panics() {
        let mut registry = ReplacementRegistry::new();
        registry.register(5..2, 0, PREFIX);
    }
}
