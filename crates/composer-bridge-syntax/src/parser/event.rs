//! # Parser Events
//!
//! The parser does not build a tree. It emits a **flat sequence** of events
//! describing one, and the consumer (the composer's display-tree builder)
//! keeps its own stack of open nodes:
//!
//! ```text
//! <p>a<strong>b</strong></p>
//!
//! Start(p)
//!   Text("a")
//!   Start(strong)
//!     Text("b")
//!   Finish
//! Finish
//! ```
//!
//! Start and Finish are always balanced, even for malformed input; void
//! elements such as `<br>` arrive as a single [`Event::Void`].

use crate::tag::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Open an element. Paired with a later [`Event::Finish`].
    Start(Element),
    /// Entity-decoded character data.
    Text(String),
    /// An element that has no content and no `Finish`.
    Void(Element),
    /// Close the most recently started element.
    Finish,
}

impl Event {
    pub fn text(s: &str) -> Self {
        Event::Text(s.to_string())
    }
}
