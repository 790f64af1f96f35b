//! UTF-16 code-unit arithmetic over Rust strings.
//!
//! Both coordinate spaces count UTF-16 code units (the engine's offsets and
//! the platforms' native string indices), while the tree stores `String`s.
//! These helpers convert between the two and find grapheme-cluster
//! boundaries so that no offset ever splits a surrogate pair or an emoji
//! sequence.

use unicode_segmentation::UnicodeSegmentation;

/// Length of `s` in UTF-16 code units.
pub fn len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Byte index for a UTF-16 offset, or `None` past the end.
///
/// An offset in the middle of a surrogate pair floors to the start of that
/// character.
pub fn to_byte(s: &str, offset: usize) -> Option<usize> {
    let mut units = 0;
    for (byte, ch) in s.char_indices() {
        if units == offset {
            return Some(byte);
        }
        let next = units + ch.len_utf16();
        if offset < next {
            return Some(byte);
        }
        units = next;
    }
    (units == offset).then_some(s.len())
}

/// UTF-16 offset of a byte index (clamped to the string).
pub fn from_byte(s: &str, byte: usize) -> usize {
    let byte = byte.min(s.len());
    s.char_indices()
        .take_while(|(i, _)| *i < byte)
        .map(|(_, ch)| ch.len_utf16())
        .sum()
}

/// UTF-16 offsets of every extended grapheme cluster boundary in `s`,
/// including `0` and `len(s)`.
pub fn cluster_boundaries(s: &str) -> Vec<usize> {
    let mut boundaries = Vec::with_capacity(s.len() + 1);
    let mut units = 0;
    boundaries.push(0);
    for grapheme in s.graphemes(true) {
        units += len(grapheme);
        boundaries.push(units);
    }
    boundaries
}

/// The largest cluster boundary `<= offset`.
pub fn floor_cluster(s: &str, offset: usize) -> usize {
    let boundaries = cluster_boundaries(s);
    match boundaries.binary_search(&offset) {
        Ok(i) => boundaries[i],
        Err(0) => 0,
        Err(i) => boundaries[i - 1],
    }
}

/// The smallest cluster boundary `>= offset` (clamped to the end).
pub fn ceil_cluster(s: &str, offset: usize) -> usize {
    let boundaries = cluster_boundaries(s);
    match boundaries.binary_search(&offset) {
        Ok(i) => boundaries[i],
        Err(i) => boundaries.get(i).copied().unwrap_or_else(|| len(s)),
    }
}

/// Remove the UTF-16 range `start..end` from `s`, widened to cluster
/// boundaries so that no grapheme is left half-deleted.
pub fn remove_clusters(s: &str, start: usize, end: usize) -> String {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    if start == end {
        return s.to_string();
    }
    let start = floor_cluster(s, start);
    let end = ceil_cluster(s, end);
    let start_byte = to_byte(s, start).unwrap_or(s.len());
    let end_byte = to_byte(s, end).unwrap_or(s.len());
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..start_byte]);
    out.push_str(&s[end_byte..]);
    out
}
