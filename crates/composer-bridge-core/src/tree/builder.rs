//! Building a [`DisplayTree`] (plus its layout and replacement registry) from
//! canonical HTML.
//!
//! The builder consumes the balanced event stream from
//! `composer-bridge-syntax` with a stack of open frames. Each frame is either
//! a real node or a *transparent* element (an unknown tag, the `<code>` inside
//! `<pre>`, anything nested in a mention) whose content flows into the nearest
//! real ancestor.

use composer_bridge_syntax::{Element, Event, Tag};

use super::layout::{Layout, PieceKind};
use super::{DecorationKind, DisplayTree, ListKind, NodeId, NodeKind};
use crate::mapper::OffsetMapper;
use crate::mention::{MentionKind, detect_permalink};
use crate::options::RenderOptions;
use crate::registry::{ReplacementRegistry, SpanKind};

/// A display tree with everything the mapper needs to translate positions.
///
/// Rebuilt from scratch for every new canonical HTML; never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub tree: DisplayTree,
    pub layout: Layout,
    pub registry: ReplacementRegistry,
}

impl Default for RenderedContent {
    fn default() -> Self {
        Self::from_tree(DisplayTree::new(), &RenderOptions::default())
    }
}

impl RenderedContent {
    /// Lay out `tree` and register its decorative and atomic spans.
    pub fn from_tree(tree: DisplayTree, options: &RenderOptions) -> Self {
        let layout = Layout::compute(&tree);
        let mut content = Self {
            tree,
            layout,
            registry: ReplacementRegistry::new(),
        };
        content.register_spans(options);
        content
    }

    /// Replace this content with the rendering of `html`. The registry is
    /// cleared and refilled rather than reallocated.
    pub fn rerender(&mut self, html: &str, options: &RenderOptions) {
        self.tree = parse_tree(html, options);
        self.layout = Layout::compute(&self.tree);
        self.register_spans(options);
    }

    fn register_spans(&mut self, options: &RenderOptions) {
        self.registry.clear();
        for piece in &self.layout.pieces {
            match (piece.kind, self.tree.kind(piece.node)) {
                (PieceKind::Decoration, Some(NodeKind::Decoration { kind, .. })) => {
                    self.registry
                        .register(piece.display.clone(), 0, SpanKind::Decorative(*kind));
                }
                (PieceKind::Atomic, Some(NodeKind::Mention { kind, .. })) => {
                    self.registry.register(
                        piece.display.clone(),
                        options.mention_width,
                        SpanKind::Atomic(*kind),
                    );
                }
                _ => {}
            }
        }
    }

    pub fn mapper(&self) -> OffsetMapper<'_> {
        OffsetMapper::new(self)
    }

    /// The flat display text.
    pub fn display_text(&self) -> &str {
        &self.layout.text
    }

    pub fn display_len(&self) -> usize {
        self.layout.display_len()
    }

    /// Length of the logical text this display represents.
    pub fn logical_len(&self) -> usize {
        (self.display_len() as isize - self.registry.total_delta()).max(0) as usize
    }

    /// Indented dump of the tree with each node's flat display range.
    pub fn debug_tree(&self) -> String {
        let mut lines = Vec::new();
        let mut stack = vec![(self.tree.root(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            let range = self.layout.range(id).unwrap_or(0..0);
            lines.push(format!(
                "{}{} {}..{}",
                "  ".repeat(depth),
                node.kind.label(),
                range.start,
                range.end
            ));
            stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        }
        lines.join("\n")
    }
}

/// Parse canonical HTML and render it for display.
pub fn render_html(html: &str, options: &RenderOptions) -> RenderedContent {
    RenderedContent::from_tree(parse_tree(html, options), options)
}

fn parse_tree(html: &str, options: &RenderOptions) -> DisplayTree {
    let tree = TreeBuilder::new(options).build(composer_bridge_syntax::parse(html));
    log::trace!("rendered {} nodes from {} bytes of html", tree.len(), html.len());
    tree
}

struct Frame {
    /// `None` for transparent elements
    node: Option<NodeId>,
    /// Opened a list; pop the counter on finish
    list: bool,
}

struct ListCounter {
    kind: ListKind,
    next: u64,
}

struct TreeBuilder<'o> {
    options: &'o RenderOptions,
    tree: DisplayTree,
    frames: Vec<Frame>,
    lists: Vec<ListCounter>,
}

impl<'o> TreeBuilder<'o> {
    fn new(options: &'o RenderOptions) -> Self {
        Self {
            options,
            tree: DisplayTree::new(),
            frames: Vec::new(),
            lists: Vec::new(),
        }
    }

    fn build(mut self, events: Vec<Event>) -> DisplayTree {
        for event in events {
            match event {
                Event::Start(element) => self.start(element),
                Event::Finish => self.finish(),
                Event::Text(text) => self.text(&text),
                Event::Void(element) => {
                    if element.tag == Tag::Br && self.open_mention().is_none() {
                        let parent = self.current();
                        self.tree.push(parent, NodeKind::LineBreak);
                    }
                }
            }
        }
        while !self.frames.is_empty() {
            self.finish();
        }
        self.tree
    }

    /// Innermost real node.
    fn current(&self) -> NodeId {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.node)
            .unwrap_or(NodeId::ROOT)
    }

    fn open_mention(&self) -> Option<NodeId> {
        self.frames.iter().filter_map(|f| f.node).find(|&id| {
            matches!(self.tree.kind(id), Some(NodeKind::Mention { .. }))
        })
    }

    fn inside(&self, kind: fn(&NodeKind) -> bool) -> bool {
        self.frames
            .iter()
            .filter_map(|f| f.node)
            .any(|id| self.tree.kind(id).is_some_and(kind))
    }

    fn start(&mut self, element: Element) {
        if self.open_mention().is_some() {
            self.frames.push(Frame {
                node: None,
                list: false,
            });
            return;
        }

        let parent = self.current();
        let mut list = false;
        let kind = match &element.tag {
            Tag::P => Some(NodeKind::Paragraph),
            Tag::Ol | Tag::Ul => {
                let kind = if element.tag == Tag::Ol {
                    ListKind::Ordered
                } else {
                    ListKind::Unordered
                };
                let first = element
                    .attribute("start")
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .unwrap_or(1);
                self.lists.push(ListCounter { kind, next: first });
                list = true;
                Some(NodeKind::List(kind))
            }
            Tag::Li => Some(NodeKind::ListItem),
            Tag::Blockquote => Some(NodeKind::Quote),
            Tag::Pre => Some(NodeKind::CodeBlock),
            Tag::Code if self.inside(|k| matches!(k, NodeKind::CodeBlock)) => None,
            Tag::Code => Some(NodeKind::InlineCode),
            Tag::Strong => Some(NodeKind::Bold),
            Tag::Em => Some(NodeKind::Italic),
            Tag::U => Some(NodeKind::Underline),
            Tag::Del => Some(NodeKind::StrikeThrough),
            Tag::A => Some(self.anchor(&element)),
            Tag::Br | Tag::Other(_) => None,
        };

        let node = kind.map(|kind| {
            let id = self.tree.push(parent, kind);
            self.decorate_on_open(id);
            id
        });
        self.frames.push(Frame { node, list });
    }

    fn anchor(&self, element: &Element) -> NodeKind {
        let url = element.attribute("href").unwrap_or_default().to_string();
        let kind = element
            .attribute("data-mention-type")
            .and_then(MentionKind::from_attribute)
            .or_else(|| {
                self.options
                    .detect_permalink_mentions
                    .then(|| detect_permalink(&url))
                    .flatten()
            });
        match kind {
            Some(kind) => NodeKind::Mention { kind, url },
            None => NodeKind::Link { url },
        }
    }

    /// First-child decorations: list prefixes and quote prefixes.
    fn decorate_on_open(&mut self, id: NodeId) {
        match self.tree.kind(id) {
            Some(NodeKind::ListItem) => {
                let text = self.list_prefix();
                self.push_decoration(id, DecorationKind::ListPrefix, text);
            }
            Some(NodeKind::Paragraph)
                if !self.options.quote_prefix.is_empty()
                    && self.inside(|k| matches!(k, NodeKind::Quote)) =>
            {
                let text = self.options.quote_prefix.clone();
                self.push_decoration(id, DecorationKind::QuotePrefix, text);
            }
            _ => {}
        }
    }

    fn list_prefix(&mut self) -> String {
        let depth = self.lists.len().max(1);
        let marker = match self.lists.last_mut() {
            Some(ListCounter {
                kind: ListKind::Ordered,
                next,
            }) => {
                let n = *next;
                *next += 1;
                format!("{n}{}", self.options.ordered_suffix)
            }
            _ => self.options.bullet.clone(),
        };
        format!(
            "{}{}{}",
            self.options.list_indent.repeat(depth),
            marker,
            self.options.marker_separator
        )
    }

    fn push_decoration(&mut self, parent: NodeId, kind: DecorationKind, text: String) {
        if !text.is_empty() {
            self.tree.push(parent, NodeKind::Decoration { kind, text });
        }
    }

    fn finish(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        if frame.list {
            self.lists.pop();
        }
        let Some(id) = frame.node else {
            return;
        };

        match self.tree.kind(id) {
            Some(NodeKind::Paragraph | NodeKind::CodeBlock | NodeKind::Quote) => {
                let has_content = self
                    .tree
                    .get(id)
                    .is_some_and(|node| node.children.iter().any(|&c| !self.is_decoration(c)));
                if !has_content {
                    if let Some(text) = self.options.empty_block_placeholder.clone() {
                        self.push_decoration(id, DecorationKind::Placeholder, text);
                    }
                }
            }
            // A pill must display something, or its logical width is lost
            Some(NodeKind::Mention { kind, url }) => {
                if self.tree.text_content(id).is_empty() {
                    let label = match kind {
                        MentionKind::User | MentionKind::Room if !url.is_empty() => url.clone(),
                        _ => kind.fallback_label().to_string(),
                    };
                    self.tree.push(id, NodeKind::Text(label));
                }
            }
            _ => {}
        }
    }

    fn is_decoration(&self, id: NodeId) -> bool {
        matches!(self.tree.kind(id), Some(NodeKind::Decoration { .. }))
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let parent = self.open_mention().unwrap_or_else(|| self.current());
        let container = matches!(
            self.tree.kind(parent),
            Some(NodeKind::Root | NodeKind::List(_) | NodeKind::Quote)
        );
        // Inter-block whitespace from pretty-printed markup
        if container && text.trim().is_empty() {
            return;
        }

        let last_text = self
            .tree
            .get(parent)
            .and_then(|node| node.children.last().copied())
            .filter(|&last| matches!(self.tree.kind(last), Some(NodeKind::Text(_))));
        match last_text {
            Some(last) => {
                if let NodeKind::Text(existing) = &mut self.tree.node_mut(last).kind {
                    existing.push_str(text);
                }
            }
            None => {
                self.tree.push(parent, NodeKind::Text(text.to_string()));
            }
        }
    }
}
