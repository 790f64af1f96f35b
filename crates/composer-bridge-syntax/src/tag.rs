//! Tag names and attribute scanning for the canonical HTML profile.

use crate::cursor::Cursor;

/// Element names the composer understands. Anything else is [`Tag::Other`]
/// and treated as a transparent wrapper by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    P,
    Ol,
    Ul,
    Li,
    Blockquote,
    Pre,
    Code,
    Strong,
    Em,
    U,
    Del,
    A,
    Br,
    Other(String),
}

impl Tag {
    /// Resolve a tag name (case-insensitive). Synonyms collapse onto one
    /// variant: `b` is `Strong`, `i` is `Em`, `s`/`strike` are `Del`.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "p" => Tag::P,
            "ol" => Tag::Ol,
            "ul" => Tag::Ul,
            "li" => Tag::Li,
            "blockquote" => Tag::Blockquote,
            "pre" => Tag::Pre,
            "code" => Tag::Code,
            "strong" | "b" => Tag::Strong,
            "em" | "i" => Tag::Em,
            "u" => Tag::U,
            "del" | "s" | "strike" => Tag::Del,
            "a" => Tag::A,
            "br" => Tag::Br,
            other => Tag::Other(other.to_string()),
        }
    }

    /// Void elements never have content or a closing tag.
    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Br)
            || matches!(self, Tag::Other(name) if matches!(name.as_str(), "img" | "hr" | "wbr"))
    }
}

/// An opening tag with its decoded attributes, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: Tag,
    pub attributes: Vec<(String, String)>,
    /// Written as `<name ... />`
    pub self_closing: bool,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    /// First value of the attribute `name` (case-insensitive).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parse an opening-tag token such as `<a href="x" contenteditable=false>`.
    ///
    /// Returns `None` when the token is not an opening tag.
    pub fn parse_open(token: &str) -> Option<Self> {
        let inner = token.strip_prefix('<')?.strip_suffix('>')?;
        let (inner, self_closing) = match inner.strip_suffix('/') {
            Some(rest) => (rest, true),
            None => (inner, false),
        };

        let mut cur = Cursor::new(inner);
        let name = cur.take_while(is_name_byte);
        if name.is_empty() {
            return None;
        }

        let mut element = Element {
            tag: Tag::from_name(name),
            attributes: Vec::new(),
            self_closing,
        };

        loop {
            cur.skip_whitespace();
            if cur.eof() {
                break;
            }
            let key = cur.take_while(|b| !b.is_ascii_whitespace() && b != b'=');
            if key.is_empty() {
                // A lone `=`; skip it rather than looping forever
                cur.bump();
                continue;
            }
            cur.skip_whitespace();
            let value = if cur.eat(b'=') {
                cur.skip_whitespace();
                read_attribute_value(&mut cur)
            } else {
                ""
            };
            element.attributes.push((
                key.to_ascii_lowercase(),
                html_escape::decode_html_entities(value).into_owned(),
            ));
        }

        Some(element)
    }
}

/// Name of a closing-tag token such as `</strong >`.
pub fn parse_close(token: &str) -> Option<Tag> {
    let inner = token.strip_prefix("</")?.strip_suffix('>')?;
    let name = inner.trim();
    if name.is_empty() {
        return None;
    }
    Some(Tag::from_name(name))
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

fn read_attribute_value<'a>(cur: &mut Cursor<'a>) -> &'a str {
    match cur.peek() {
        Some(quote @ (b'"' | b'\'')) => {
            cur.bump();
            let value = cur.take_while(|b| b != quote);
            cur.eat(quote);
            value
        }
        _ => cur.take_while(|b| !b.is_ascii_whitespace()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("p", Tag::P)]
    #[case("LI", Tag::Li)]
    #[case("b", Tag::Strong)]
    #[case("i", Tag::Em)]
    #[case("strike", Tag::Del)]
    #[case("s", Tag::Del)]
    #[case("span", Tag::Other("span".to_string()))]
    fn tag_names(#[case] name: &str, #[case] expected: Tag) {
        assert_eq!(Tag::from_name(name), expected);
    }

    #[test]
    fn parse_plain_open_tag() {
        let el = Element::parse_open("<strong>").unwrap();
        assert_eq!(el, Element::new(Tag::Strong));
    }

    #[test]
    fn parse_self_closing_break() {
        let el = Element::parse_open("<br />").unwrap();
        assert_eq!(el.tag, Tag::Br);
        assert!(el.self_closing);
        assert!(el.attributes.is_empty());
    }

    #[test]
    fn parse_mention_attributes() {
        let el = Element::parse_open(
            r#"<a data-mention-type="user" href="https://matrix.to/#/@alice:matrix.org" contenteditable="false">"#,
        )
        .unwrap();
        assert_eq!(el.tag, Tag::A);
        assert_eq!(el.attribute("data-mention-type"), Some("user"));
        assert_eq!(
            el.attribute("href"),
            Some("https://matrix.to/#/@alice:matrix.org")
        );
        assert_eq!(el.attribute("contenteditable"), Some("false"));
    }

    #[test]
    fn parse_unquoted_and_bare_attributes() {
        let el = Element::parse_open("<ol start=3 reversed>").unwrap();
        assert_eq!(el.attribute("start"), Some("3"));
        assert_eq!(el.attribute("reversed"), Some(""));
    }

    #[test]
    fn attribute_entities_are_decoded() {
        let el = Element::parse_open(r#"<a href="https://x.org/?a=1&amp;b=2">"#).unwrap();
        assert_eq!(el.attribute("href"), Some("https://x.org/?a=1&b=2"));
    }

    #[test]
    fn single_quoted_value_with_spaces() {
        let el = Element::parse_open("<a title='two words'>").unwrap();
        assert_eq!(el.attribute("TITLE"), Some("two words"));
    }

    #[test]
    fn parse_close_tags() {
        assert_eq!(parse_close("</p>"), Some(Tag::P));
        assert_eq!(parse_close("</em >"), Some(Tag::Em));
        assert_eq!(parse_close("</>"), None);
    }

    #[test]
    fn void_elements() {
        assert!(Tag::Br.is_void());
        assert!(Tag::from_name("img").is_void());
        assert!(!Tag::P.is_void());
    }
}
