//! Append-only record of what a composer sent to its engine.
//!
//! Attach one to a reconciler with
//! [`SelectionReconciler::with_action_log`](crate::reconciler::SelectionReconciler::with_action_log)
//! while reproducing a bug; [`ActionLog::to_test_case`] then prints the
//! session as a snippet that can be pasted into a test.

use serde::{Deserialize, Serialize};

use crate::reconciler::EngineCommand;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// A command forwarded to the engine, in logical offsets
    Command(EngineCommand),
    /// The engine failed the previous command
    Failed { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLog {
    actions: Vec<Action>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The recorded session as Rust statements against a `model` binding.
    pub fn to_test_case(&self) -> String {
        let mut lines = vec!["let mut model = cm(\"|\");".to_string()];
        for action in &self.actions {
            match action {
                Action::Command(command) => lines.push(format!("model.{};", command.to_call())),
                Action::Failed { reason } => lines.push(format!("// failed: {reason}")),
            }
        }
        lines.join("\n")
    }
}
