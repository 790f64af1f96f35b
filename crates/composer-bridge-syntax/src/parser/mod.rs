//! # Parser - Tokens to Balanced Events
//!
//! Consumes the lexer's token stream and emits [`Event`]s with a guaranteed
//! nesting structure. The engine's serializer produces well-formed markup,
//! but platforms also feed pasted or hand-written HTML through here, so the
//! parser repairs instead of rejecting:
//!
//! - A closing tag with no matching open element is ignored.
//! - A closing tag for an outer element closes everything opened inside it.
//! - `<li>` implicitly closes a still-open sibling `<li>`.
//! - A block element implicitly closes an open `<p>`.
//! - Elements still open at end of input are finished.
//!
//! The open-element stack is an explicit `Vec`, so nesting depth is bounded by
//! memory rather than by the call stack.
//!
//! ```
//! use composer_bridge_syntax::{parse, Event};
//!
//! let events = parse("<p>one<p>two");
//! let finishes = events.iter().filter(|e| matches!(e, Event::Finish)).count();
//! assert_eq!(finishes, 2);
//! ```

pub mod event;

use crate::lexer::{Token, TokenKind, lex};
use crate::tag::{Element, Tag, parse_close};
use event::Event;

/// The parser state machine: token stream, open-element stack, output.
pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    open: Vec<Tag>,
    events: Vec<Event>,
}

impl<'t, 'input> Parser<'t, 'input> {
    pub fn new(tokens: &'t [Token<'input>]) -> Self {
        Self {
            tokens,
            open: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Run the parser to completion.
    pub fn parse(mut self) -> Vec<Event> {
        for token in self.tokens {
            match token.kind {
                TokenKind::OpenTag => match Element::parse_open(token.text) {
                    Some(element) => self.open_element(element),
                    None => self.text(token.text),
                },
                TokenKind::CloseTag => {
                    if let Some(tag) = parse_close(token.text) {
                        self.close_element(&tag);
                    }
                }
                TokenKind::Declaration => {}
                TokenKind::Text => self.text(token.text),
            }
        }

        while self.open.pop().is_some() {
            self.events.push(Event::Finish);
        }
        self.events
    }

    fn open_element(&mut self, element: Element) {
        match element.tag {
            Tag::Li => self.close_open_list_item(),
            Tag::P | Tag::Ol | Tag::Ul | Tag::Blockquote | Tag::Pre => {
                self.close_open_paragraph()
            }
            _ => {}
        }

        if element.tag.is_void() {
            self.events.push(Event::Void(element));
        } else if element.self_closing {
            self.events.push(Event::Start(element));
            self.events.push(Event::Finish);
        } else {
            self.open.push(element.tag.clone());
            self.events.push(Event::Start(element));
        }
    }

    fn close_element(&mut self, tag: &Tag) {
        if tag.is_void() {
            // `</br>` is a quirk some serializers emit; nothing to close
            return;
        }
        if let Some(depth) = self.open.iter().rposition(|open| open == tag) {
            self.finish_to(depth);
        }
    }

    /// Finish elements until the stack has `depth` entries left.
    fn finish_to(&mut self, depth: usize) {
        while self.open.len() > depth {
            self.open.pop();
            self.events.push(Event::Finish);
        }
    }

    fn close_open_list_item(&mut self) {
        let nearest = self
            .open
            .iter()
            .rposition(|tag| matches!(tag, Tag::Li | Tag::Ol | Tag::Ul));
        if let Some(depth) = nearest
            && self.open[depth] == Tag::Li
        {
            self.finish_to(depth);
        }
    }

    fn close_open_paragraph(&mut self) {
        let nearest = self.open.iter().rposition(|tag| {
            matches!(
                tag,
                Tag::P | Tag::Li | Tag::Ol | Tag::Ul | Tag::Blockquote | Tag::Pre
            )
        });
        if let Some(depth) = nearest
            && self.open[depth] == Tag::P
        {
            self.finish_to(depth);
        }
    }

    fn text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let decoded = html_escape::decode_html_entities(raw);
        self.events.push(Event::Text(decoded.into_owned()));
    }
}

/// Parse canonical HTML into balanced events.
pub fn parse(input: &str) -> Vec<Event> {
    let tokens = lex(input);
    Parser::new(&tokens).parse()
}
