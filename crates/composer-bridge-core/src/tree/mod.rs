//! # Display Tree
//!
//! The rendered form of a canonical HTML document, as a platform shows it.
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by
//! [`NodeId`], so the tree can be walked with explicit stacks, cloned cheaply
//! across the FFI boundary and unit tested without any UI runtime. Node 0 is
//! always the root.
//!
//! Tag names are resolved once, while building, into the closed [`NodeKind`]
//! enum; nothing downstream looks at strings to decide how a node behaves.
//!
//! ```text
//! <ol><li>Item 1</li></ol>
//!
//! Root
//!   List(Ordered)
//!     ListItem
//!       Decoration(ListPrefix, "\t1.\t")
//!       Text("Item 1")
//! ```

pub mod builder;
pub mod layout;

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::mention::MentionKind;

pub use builder::{RenderedContent, render_html};
pub use layout::{Layout, Piece, PieceKind};

/// Index of a node in a [`DisplayTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// Rendered content that has no counterpart in the logical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecorationKind {
    /// `"\t1.\t"` or `"\t•\t"` in front of a list item
    ListPrefix,
    /// Stand-in content that keeps an empty block visible
    Placeholder,
    /// Marker in front of each paragraph inside a quote
    QuotePrefix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Paragraph,
    List(ListKind),
    ListItem,
    Quote,
    CodeBlock,
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    InlineCode,
    Link { url: String },
    /// Atomic pill; its label is a single `Text` child
    Mention { kind: MentionKind, url: String },
    LineBreak,
    Text(String),
    Decoration { kind: DecorationKind, text: String },
}

impl NodeKind {
    /// Structural nodes that start and end lines.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Root
                | NodeKind::Paragraph
                | NodeKind::List(_)
                | NodeKind::ListItem
                | NodeKind::Quote
                | NodeKind::CodeBlock
        )
    }

    /// Blocks whose own content forms a line.
    pub fn is_leaf_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph | NodeKind::ListItem | NodeKind::CodeBlock
        )
    }

    /// Nodes whose offsets count UTF-16 code units rather than children.
    pub fn is_text_like(&self) -> bool {
        matches!(self, NodeKind::Text(_) | NodeKind::Decoration { .. })
    }

    /// The text a text-like node displays.
    pub fn text(&self) -> Option<&str> {
        match self {
            NodeKind::Text(text) | NodeKind::Decoration { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Short label used by debug dumps.
    pub fn label(&self) -> String {
        match self {
            NodeKind::Root => "Root".to_string(),
            NodeKind::Paragraph => "Paragraph".to_string(),
            NodeKind::List(kind) => format!("List({kind:?})"),
            NodeKind::ListItem => "ListItem".to_string(),
            NodeKind::Quote => "Quote".to_string(),
            NodeKind::CodeBlock => "CodeBlock".to_string(),
            NodeKind::Bold => "Bold".to_string(),
            NodeKind::Italic => "Italic".to_string(),
            NodeKind::Underline => "Underline".to_string(),
            NodeKind::StrikeThrough => "StrikeThrough".to_string(),
            NodeKind::InlineCode => "InlineCode".to_string(),
            NodeKind::Link { url } => format!("Link({url})"),
            NodeKind::Mention { kind, url } => format!("Mention({kind:?}, {url})"),
            NodeKind::LineBreak => "LineBreak".to_string(),
            NodeKind::Text(text) => format!("Text({text:?})"),
            NodeKind::Decoration { kind, text } => format!("Decoration({kind:?}, {text:?})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// A position in the display tree.
///
/// For text-like nodes `offset` counts UTF-16 code units; for every other
/// node it is a child index, so `(node, children.len())` is the end of the
/// node (the DOM convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayPosition {
    pub node: NodeId,
    pub offset: usize,
}

impl DisplayPosition {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Arena of display nodes rooted at [`NodeId::ROOT`].
///
/// Nodes are appended in document order, so a node's id is always greater
/// than its parent's and than every node that precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTree {
    nodes: Vec<Node>,
}

impl Default for DisplayTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Like [`get`](Self::get), failing with [`MapError::UnknownNode`].
    pub fn node(&self, id: NodeId) -> Result<&Node, MapError> {
        self.get(id).ok_or(MapError::UnknownNode(id))
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|node| &node.kind)
    }

    /// Append a new last child of `parent`.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.get(id)?.parent?;
        self.get(parent)?.children.iter().position(|&c| c == id)
    }

    /// Every node from `id` (inclusive) up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), |&current| {
            self.get(current).and_then(|node| node.parent)
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Concatenated display text of every text-like descendant of `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            if let Some(text) = node.kind.text() {
                out.push_str(text);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }
}
