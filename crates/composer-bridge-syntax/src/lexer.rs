//! # Lexer - Tokenizing Canonical HTML
//!
//! First stage of reading the engine's HTML: break the source into a flat
//! sequence of tags and text runs using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte of the input appears in exactly one token. Characters the
//! grammar does not recognise (a stray `<`, an unterminated tag) come out as
//! [`TokenKind::Text`] instead of being dropped, so a malformed document still
//! renders *something* and offsets stay accountable:
//!
//! ```
//! use composer_bridge_syntax::lexer::lex;
//!
//! let input = "<p>a < b</p>";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Token Design
//!
//! The canonical profile is small and machine-generated, so tokens are
//! coarse: a whole `<tag attr="..">` is one token and attribute scanning is
//! left to [`crate::tag`]. Entity decoding happens in the parser, not here.

use logos::Logos;

/// Token kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<name ...>` or `<name ... />`
    #[regex(r"<[a-zA-Z][^>]*>")]
    OpenTag,

    /// `</name>`
    #[regex(r"</[a-zA-Z][^>]*>")]
    CloseTag,

    /// `<!...>` declarations and short comments; ignored by the parser
    #[regex(r"<![^>]*>")]
    Declaration,

    /// Character data between tags
    #[regex(r"[^<]+")]
    Text,
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_with_spans(input)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

/// Lex and return tokens along with their byte spans.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        // Logos error means an unrecognized character (a lone `<`) - keep it as text
        let kind = result.unwrap_or(TokenKind::Text);
        tokens.push((Token { kind, text }, span));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(kind: TokenKind, text: &str) -> Token<'_> {
        Token { kind, text }
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_plain_text() {
        assert_eq!(lex("hello"), vec![token(TokenKind::Text, "hello")]);
    }

    #[test]
    fn lex_paragraph() {
        assert_eq!(
            lex("<p>hi</p>"),
            vec![
                token(TokenKind::OpenTag, "<p>"),
                token(TokenKind::Text, "hi"),
                token(TokenKind::CloseTag, "</p>"),
            ]
        );
    }

    #[test]
    fn lex_self_closing_break() {
        assert_eq!(
            lex("a<br />b"),
            vec![
                token(TokenKind::Text, "a"),
                token(TokenKind::OpenTag, "<br />"),
                token(TokenKind::Text, "b"),
            ]
        );
    }

    #[test]
    fn lex_mention_anchor_is_one_token() {
        let html = r#"<a data-mention-type="user" href="https://matrix.to/#/@alice:matrix.org" contenteditable="false">Alice</a>"#;
        let tokens = lex(html);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::OpenTag);
        assert_eq!(tokens[1], token(TokenKind::Text, "Alice"));
        assert_eq!(tokens[2], token(TokenKind::CloseTag, "</a>"));
    }

    #[test]
    fn lex_declaration() {
        assert_eq!(
            lex("<!DOCTYPE html>x"),
            vec![
                token(TokenKind::Declaration, "<!DOCTYPE html>"),
                token(TokenKind::Text, "x"),
            ]
        );
    }

    #[test]
    fn stray_angle_bracket_becomes_text() {
        let tokens = lex("1 < 2");
        let reconstructed: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(reconstructed, "1 < 2");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Text));
    }

    #[test]
    fn all_bytes_preserved_complex() {
        let input = "<ol><li><strong>a</strong></li></ol><blockquote><p>q &amp; a</p></blockquote><pre><code>x\ny</code></pre>";
        let tokens = lex(input);
        let reconstructed: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(input, reconstructed);
    }

    #[test]
    fn spans_are_correct() {
        let input = "<em>hello</em> world";
        for (token, span) in lex_with_spans(input) {
            assert_eq!(token.text, &input[span]);
        }
    }
}
