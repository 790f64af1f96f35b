//! # composer-bridge-syntax
//!
//! Reads the canonical HTML produced by the formatting engine into a flat,
//! balanced stream of events that the composer core turns into its display
//! tree.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source HTML → Lexer → Tokens → Parser → Events → (composer-bridge-core builder)
//!               (Logos)          (open-element stack)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! Uses [Logos] to split input into open tags, close tags, declarations and
//! text runs. Every byte lands in a token.
//!
//! ### 2. Tags ([`tag`] module)
//!
//! Resolves tag names to the closed [`Tag`] set and scans attributes with a
//! small byte [`cursor`].
//!
//! ### 3. Parser ([`parser`] module)
//!
//! Repairs nesting (implicit `</li>` and `</p>`, unmatched closes, unclosed
//! elements at EOF) and decodes entities, producing [`Event`]s whose Start and
//! Finish are always balanced.
//!
//! ## Quick Start
//!
//! ```
//! use composer_bridge_syntax::{parse, Event, Tag};
//!
//! let events = parse("<p>Hello <strong>world</strong></p>");
//! assert!(matches!(&events[0], Event::Start(el) if el.tag == Tag::P));
//! assert_eq!(events[1], Event::Text("Hello ".to_string()));
//! ```
//!
//! [Logos]: https://docs.rs/logos

pub mod cursor;
pub mod lexer;
pub mod parser;
pub mod tag;

pub use parser::event::Event;
pub use parser::parse;
pub use tag::{Element, Tag};

#[cfg(test)]
mod tests {
    use super::*;

    /// Render events back into an indented outline for snapshotting.
    fn outline(html: &str) -> String {
        let mut lines = Vec::new();
        let mut depth = 0;
        for event in parse(html) {
            match event {
                Event::Start(el) => {
                    lines.push(format!("{}{:?}", "  ".repeat(depth), el.tag));
                    depth += 1;
                }
                Event::Finish => depth -= 1,
                Event::Text(text) => {
                    lines.push(format!("{}{:?}", "  ".repeat(depth), text));
                }
                Event::Void(el) => {
                    lines.push(format!("{}{:?}/", "  ".repeat(depth), el.tag));
                }
            }
        }
        lines.join("\n")
    }

    #[test]
    fn outline_of_mixed_document() {
        insta::assert_snapshot!(
            outline("<ol><li>Item 1</li><li><em>Item</em><br />2</li></ol><p>Some Text</p>"),
            @r#"
        Ol
          Li
            "Item 1"
          Li
            Em
              "Item"
            Br/
            "2"
        P
          "Some Text"
        "#
        );
    }

    #[test]
    fn code_block_text_keeps_newlines() {
        let events = parse("<pre><code>a\n  b</code></pre>");
        assert_eq!(events[2], Event::Text("a\n  b".to_string()));
    }
}
