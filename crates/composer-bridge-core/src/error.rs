use crate::tree::NodeId;

/// Failures translating between display and logical coordinates.
///
/// Ambiguous-but-valid positions (the edge of a list marker, the boundary
/// between two mentions) are never errors; they resolve by tie-break rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("Logical index {index} is out of bounds (logical length {len})")]
    OutOfBoundsLogicalIndex { index: usize, len: usize },
    #[error("Display index {index} is out of bounds (display length {len})")]
    OutOfBoundsDisplayIndex { index: usize, len: usize },
    #[error("Node {0:?} is not part of the display tree")]
    UnknownNode(NodeId),
}

/// Errors surfaced by the selection reconciler.
///
/// Engine failures are recoverable: they are reported through an
/// [`ErrorCollector`](crate::reconciler::ErrorCollector) and the composer
/// keeps the display it had before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposerError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("Engine call `{command}` failed: {reason}")]
    EngineInvocationFailed { command: String, reason: String },
    /// An edit arrived from inside a render-target callback, while the
    /// composer was still applying the previous one
    #[error("`{entry}` called while an update was being applied")]
    ReentrantCall { entry: String },
}
