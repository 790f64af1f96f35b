//! Property tests: every logical offset survives a trip through the display,
//! and every display index survives a trip through a node position.

use composer_bridge_core::{RenderOptions, render_html};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Inline {
    Text(String),
    Bold(String),
    Mention(String),
    Break,
}

#[derive(Debug, Clone)]
enum Block {
    Paragraph(Vec<Inline>),
    List { ordered: bool, items: Vec<Vec<Inline>> },
    Quote(Vec<Inline>),
    Code(String),
}

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 éß中]{1,6}"
}

fn inline() -> impl Strategy<Value = Inline> {
    prop_oneof![
        4 => text().prop_map(Inline::Text),
        1 => text().prop_map(Inline::Bold),
        1 => "[a-z]{1,5}".prop_map(Inline::Mention),
        1 => Just(Inline::Break),
    ]
}

fn inlines() -> impl Strategy<Value = Vec<Inline>> {
    prop::collection::vec(inline(), 0..4)
}

fn block() -> impl Strategy<Value = Block> {
    prop_oneof![
        3 => inlines().prop_map(Block::Paragraph),
        2 => (any::<bool>(), prop::collection::vec(inlines(), 1..4))
            .prop_map(|(ordered, items)| Block::List { ordered, items }),
        1 => inlines().prop_map(Block::Quote),
        1 => "[a-z\n]{0,8}".prop_map(Block::Code),
    ]
}

fn inline_html(inlines: &[Inline]) -> String {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(text) => html_escape::encode_text(text).into_owned(),
            Inline::Bold(text) => format!("<strong>{}</strong>", html_escape::encode_text(text)),
            Inline::Mention(name) => format!(
                r#"<a data-mention-type="user" href="https://matrix.to/#/@{name}:example.org" contenteditable="false">{name}</a>"#
            ),
            Inline::Break => "<br />".to_string(),
        })
        .collect()
}

fn document_html(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|block| match block {
            Block::Paragraph(inlines) => format!("<p>{}</p>", inline_html(inlines)),
            Block::List { ordered, items } => {
                let tag = if *ordered { "ol" } else { "ul" };
                let items: String = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", inline_html(item)))
                    .collect();
                format!("<{tag}>{items}</{tag}>")
            }
            Block::Quote(inlines) => format!("<blockquote>{}</blockquote>", inline_html(inlines)),
            Block::Code(code) => format!("<pre><code>{code}</code></pre>"),
        })
        .collect()
}

fn options(placeholder: bool) -> RenderOptions {
    RenderOptions {
        empty_block_placeholder: placeholder.then(|| "\u{a0}".to_string()),
        ..RenderOptions::default()
    }
}

proptest! {
    #[test]
    fn logical_offsets_round_trip(
        blocks in prop::collection::vec(block(), 0..5),
        placeholder in any::<bool>(),
    ) {
        let html = document_html(&blocks);
        let content = render_html(&html, &options(placeholder));
        let mapper = content.mapper();

        for logical in 0..=content.logical_len() {
            let position = mapper.logical_to_display(logical).unwrap();
            prop_assert_eq!(mapper.display_to_logical(position), Ok(logical), "{} @ {}", html, logical);
        }
        prop_assert!(mapper.logical_to_index(content.logical_len() + 1).is_err());
    }

    #[test]
    fn display_indices_round_trip(
        blocks in prop::collection::vec(block(), 0..5),
        placeholder in any::<bool>(),
    ) {
        let html = document_html(&blocks);
        let content = render_html(&html, &options(placeholder));
        let mapper = content.mapper();

        let mut previous = 0;
        for index in 0..=content.display_len() {
            let position = mapper.index_to_position(index).unwrap();
            prop_assert_eq!(mapper.position_to_index(position), Ok(index), "{} @ {}", html, index);

            let logical = mapper.index_to_logical(index).unwrap();
            prop_assert!(logical >= previous, "logical offsets go backwards in {}", html);
            previous = logical;
        }
    }
}
