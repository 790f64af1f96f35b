//! The contract with the external formatting engine.
//!
//! The engine owns the canonical document, its selection, undo history and
//! serialisation. This crate only ever talks to it through
//! [`ComposerEngine::execute`] and the read-only queries.

use serde::{Deserialize, Serialize};

/// Trigger character of a suggestion (`@alice`, `#room`, `/command`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKey {
    At,
    Hash,
    Slash,
}

/// The suggestion text the user typed, in logical offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuggestionPattern {
    pub key: PatternKey,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Every call the composer makes into the engine. Offsets are logical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineCommand {
    Select { start: usize, end: usize },
    ReplaceText { text: String },
    Backspace,
    Delete,
    Enter,
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    InlineCode,
    Undo,
    Redo,
    OrderedList,
    UnorderedList,
    Indent,
    Unindent,
    SetLink { url: String },
    RemoveLinks,
    InsertMentionAtSuggestion {
        url: String,
        text: String,
        pattern: SuggestionPattern,
        attributes: Vec<(String, String)>,
    },
    SetContentFromHtml { html: String },
}

impl EngineCommand {
    /// The engine method this command invokes.
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::Select { .. } => "select",
            EngineCommand::ReplaceText { .. } => "replace_text",
            EngineCommand::Backspace => "backspace",
            EngineCommand::Delete => "delete",
            EngineCommand::Enter => "enter",
            EngineCommand::Bold => "bold",
            EngineCommand::Italic => "italic",
            EngineCommand::Underline => "underline",
            EngineCommand::StrikeThrough => "strike_through",
            EngineCommand::InlineCode => "inline_code",
            EngineCommand::Undo => "undo",
            EngineCommand::Redo => "redo",
            EngineCommand::OrderedList => "ordered_list",
            EngineCommand::UnorderedList => "unordered_list",
            EngineCommand::Indent => "indent",
            EngineCommand::Unindent => "unindent",
            EngineCommand::SetLink { .. } => "set_link",
            EngineCommand::RemoveLinks => "remove_links",
            EngineCommand::InsertMentionAtSuggestion { .. } => "insert_mention_at_suggestion",
            EngineCommand::SetContentFromHtml { .. } => "set_content_from_html",
        }
    }

    /// The command as a method call with Rust literal arguments.
    pub fn to_call(&self) -> String {
        let args = match self {
            EngineCommand::Select { start, end } => format!("{start}, {end}"),
            EngineCommand::ReplaceText { text } => format!("{text:?}"),
            EngineCommand::SetLink { url } => format!("{url:?}"),
            EngineCommand::SetContentFromHtml { html } => format!("{html:?}"),
            EngineCommand::InsertMentionAtSuggestion {
                url,
                text,
                pattern,
                attributes,
            } => format!(
                "{url:?}, {text:?}, SuggestionPattern {{ key: PatternKey::{:?}, text: {:?}.into(), start: {}, end: {} }}, vec!{attributes:?}",
                pattern.key, pattern.text, pattern.start, pattern.end
            ),
            _ => String::new(),
        };
        format!("{}({args})", self.name())
    }
}

/// What the engine wants applied to the display after a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Update {
    /// Nothing changed
    Keep,
    /// Only the selection moved
    Select { start: usize, end: usize },
    /// New canonical content and selection
    ReplaceAll {
        html: String,
        start: usize,
        end: usize,
    },
}

/// The engine rejected or failed a call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct EngineError {
    pub reason: String,
}

impl EngineError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The formatting engine, as seen by the reconciler.
pub trait ComposerEngine {
    fn execute(&mut self, command: EngineCommand) -> Result<Update, EngineError>;

    fn content_as_html(&self) -> String;

    fn content_as_markdown(&self) -> String;

    /// Debug dump of the engine's own model.
    fn to_tree(&self) -> String;
}

impl<E: ComposerEngine + ?Sized> ComposerEngine for Box<E> {
    fn execute(&mut self, command: EngineCommand) -> Result<Update, EngineError> {
        (**self).execute(command)
    }

    fn content_as_html(&self) -> String {
        (**self).content_as_html()
    }

    fn content_as_markdown(&self) -> String {
        (**self).content_as_markdown()
    }

    fn to_tree(&self) -> String {
        (**self).to_tree()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EngineCommand::Bold, "bold()")]
    #[case(EngineCommand::Select { start: 1, end: 4 }, "select(1, 4)")]
    #[case(EngineCommand::ReplaceText { text: "a\"b".into() }, r#"replace_text("a\"b")"#)]
    #[case(EngineCommand::SetLink { url: "https://x".into() }, r#"set_link("https://x")"#)]
    fn renders_as_call(#[case] command: EngineCommand, #[case] expected: &str) {
        assert_eq!(command.to_call(), expected);
    }

    #[test]
    fn engine_error_displays_reason() {
        assert_eq!(EngineError::new("boom").to_string(), "boom");
    }
}
