//! Where recoverable composer errors go.

use std::sync::{Arc, Mutex};

use crate::error::ComposerError;

/// Receives errors the reconciler recovered from.
pub trait ErrorCollector: Send {
    fn report(&mut self, error: &ComposerError);
}

/// Logs every error at `warn`. The default collector.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCollector;

impl ErrorCollector for LogCollector {
    fn report(&mut self, error: &ComposerError) {
        log::warn!("{error}");
    }
}

/// Keeps every reported error; clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct CollectedErrors {
    errors: Arc<Mutex<Vec<ComposerError>>>,
}

impl CollectedErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<ComposerError> {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}

impl ErrorCollector for CollectedErrors {
    fn report(&mut self, error: &ComposerError) {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_errors() {
        let errors = CollectedErrors::new();
        let mut handle = errors.clone();
        handle.report(&ComposerError::EngineInvocationFailed {
            command: "bold".into(),
            reason: "nope".into(),
        });
        assert_eq!(errors.errors().len(), 1);
        assert!(!errors.is_empty());
    }
}
