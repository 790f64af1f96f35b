//! # composer-bridge-core
//!
//! Position reconciliation between a rich-text formatting engine and the
//! native controls that display its content.
//!
//! The engine speaks **logical offsets**: UTF-16 code units into its
//! canonical linear text. Platforms speak **display positions**: indices into
//! what they actually render, which includes list markers, placeholders and
//! mention pills the logical text does not have. This crate translates
//! between the two once, for every platform.
//!
//! ## Pieces
//!
//! - [`tree`]: canonical HTML to an arena display tree and its flat layout
//! - [`registry`]: display spans whose logical width differs (decorative or
//!   atomic)
//! - [`mapper`]: the pure, bidirectional [`OffsetMapper`]
//! - [`reconciler`]: the edit/selection lifecycle against a
//!   [`ComposerEngine`](reconciler::ComposerEngine) and a
//!   [`RenderTarget`](reconciler::RenderTarget)
//! - [`action_log`]: optional record of engine calls for bug reproduction
//!
//! ```
//! use composer_bridge_core::{RenderOptions, render_html};
//!
//! let content = render_html("<ul><li>milk</li></ul>", &RenderOptions::default());
//! assert_eq!(content.display_text(), "\t•\tmilk");
//! assert_eq!(content.mapper().logical_to_index(0).unwrap(), 3);
//! ```

pub mod action_log;
pub mod error;
pub mod mapper;
pub mod mention;
pub mod options;
pub mod reconciler;
pub mod registry;
pub mod tree;
pub mod utf16;

pub use action_log::{Action, ActionLog};
pub use error::{ComposerError, MapError};
pub use mapper::OffsetMapper;
pub use mention::MentionKind;
pub use options::{ReconcilerOptions, RenderOptions};
pub use reconciler::{Outcome, SelectionReconciler};
pub use registry::{ReplacementRegistry, ReplacementSpan, SpanKind};
pub use tree::{DisplayPosition, DisplayTree, NodeId, NodeKind, RenderedContent, render_html};
