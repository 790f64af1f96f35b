//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use composer_bridge_core::reconciler::{
    ComposerEngine, CompositionHost, DisplaySelection, EngineCommand, EngineError, RenderTarget,
    Update,
};
use composer_bridge_core::{RenderOptions, RenderedContent, render_html, utf16};
use std::collections::VecDeque;

fn selects(commands: &[EngineCommand]) -> Vec<(usize, usize)> {
    commands
        .iter()
        .filter_map(|c| match c {
            EngineCommand::Select { start, end } => Some((*start, *end)),
            _ => None,
        })
        .collect()
}

/// A plain-paragraph engine: the logical text is the paragraphs joined with
/// `\n`, one `<p>` per line.
#[derive(Debug, Default)]
pub struct FakeEngine {
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Every command received, in order
    pub commands: Vec<EngineCommand>,
    /// Commands (by name) that fail instead of running
    pub failing: Vec<&'static str>,
    /// Answer `select` with an explicit `Update::Select` instead of `Keep`
    pub echo_select: bool,
}

impl FakeEngine {
    pub fn with_text(text: &str) -> Self {
        let len = utf16::len(text);
        Self {
            text: text.to_string(),
            start: len,
            end: len,
            ..Self::default()
        }
    }

    pub fn selects(&self) -> Vec<(usize, usize)> {
        selects(&self.commands)
    }

    fn html(&self) -> String {
        self.text
            .split('\n')
            .map(|line| format!("<p>{}</p>", html_escape::encode_text(line)))
            .collect()
    }

    fn replace(&mut self, start: usize, end: usize, with: &str) -> Update {
        let removed = utf16::remove_clusters(&self.text, start, end);
        let cut = if start == end {
            start
        } else {
            utf16::floor_cluster(&self.text, start)
        };
        let byte = utf16::to_byte(&removed, cut).unwrap_or(removed.len());
        let mut text = removed;
        text.insert_str(byte, with);
        self.text = text;
        let caret = cut + utf16::len(with);
        self.start = caret;
        self.end = caret;
        self.replace_all()
    }

    fn replace_all(&self) -> Update {
        Update::ReplaceAll {
            html: self.html(),
            start: self.start,
            end: self.end,
        }
    }
}

impl ComposerEngine for FakeEngine {
    fn execute(&mut self, command: EngineCommand) -> Result<Update, EngineError> {
        self.commands.push(command.clone());
        if self.failing.contains(&command.name()) {
            return Err(EngineError::new(format!("{} is broken", command.name())));
        }

        let (start, end) = (self.start.min(self.end), self.start.max(self.end));
        Ok(match command {
            EngineCommand::Select { start, end } => {
                self.start = start;
                self.end = end;
                if self.echo_select {
                    Update::Select { start, end }
                } else {
                    Update::Keep
                }
            }
            EngineCommand::ReplaceText { text } => self.replace(start, end, &text),
            EngineCommand::Enter => self.replace(start, end, "\n"),
            EngineCommand::Backspace if start == end => {
                if start == 0 {
                    return Ok(Update::Keep);
                }
                let from = utf16::floor_cluster(&self.text, start - 1);
                self.replace(from, start, "")
            }
            EngineCommand::Delete if start == end => {
                let to = utf16::ceil_cluster(&self.text, start + 1);
                if to == start {
                    return Ok(Update::Keep);
                }
                self.replace(start, to, "")
            }
            EngineCommand::Backspace | EngineCommand::Delete => self.replace(start, end, ""),
            EngineCommand::SetContentFromHtml { html } => {
                let bare = RenderOptions {
                    empty_block_placeholder: None,
                    ..RenderOptions::default()
                };
                self.text = render_html(&html, &bare).display_text().to_string();
                self.start = utf16::len(&self.text);
                self.end = self.start;
                self.replace_all()
            }
            _ => Update::Keep,
        })
    }

    fn content_as_html(&self) -> String {
        self.html()
    }

    fn content_as_markdown(&self) -> String {
        self.text.replace('\n', "\n\n")
    }

    fn to_tree(&self) -> String {
        format!("text {:?} selection {}..{}", self.text, self.start, self.end)
    }
}

/// Answers each command with the next queued [`Update`], or `Keep` once the
/// script runs out. For documents the paragraph engine cannot produce
/// (lists, mentions, empty blocks).
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    pub html: String,
    pub commands: Vec<EngineCommand>,
    pub script: VecDeque<Update>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, update: Update) -> Self {
        self.script.push_back(update);
        self
    }

    /// Queue a `ReplaceAll` with a collapsed logical selection.
    pub fn then_show(self, html: &str, caret: usize) -> Self {
        self.then(Update::ReplaceAll {
            html: html.to_string(),
            start: caret,
            end: caret,
        })
    }

    pub fn selects(&self) -> Vec<(usize, usize)> {
        selects(&self.commands)
    }
}

impl ComposerEngine for ScriptedEngine {
    fn execute(&mut self, command: EngineCommand) -> Result<Update, EngineError> {
        self.commands.push(command);
        let update = self.script.pop_front().unwrap_or(Update::Keep);
        if let Update::ReplaceAll { html, .. } = &update {
            self.html = html.clone();
        }
        Ok(update)
    }

    fn content_as_html(&self) -> String {
        self.html.clone()
    }

    fn content_as_markdown(&self) -> String {
        String::new()
    }

    fn to_tree(&self) -> String {
        format!("scripted, {} updates left", self.script.len())
    }
}

/// Everything the platform side of the composer saw.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub contents: Vec<String>,
    pub selections: Vec<DisplaySelection>,
    pub batches_opened: usize,
    pub batches_closed: usize,
    pub ime: Option<RecordingIme>,
}

impl RecordingTarget {
    pub fn with_ime() -> Self {
        Self {
            ime: Some(RecordingIme::default()),
            ..Self::default()
        }
    }

    pub fn last_content(&self) -> Option<&str> {
        self.contents.last().map(String::as_str)
    }

    pub fn ime_events(&self) -> &[(&'static str, DisplaySelection)] {
        match &self.ime {
            Some(ime) => &ime.events,
            None => &[],
        }
    }
}

impl RenderTarget for RecordingTarget {
    fn set_display_content(&mut self, content: &RenderedContent) {
        self.contents.push(content.display_text().to_string());
    }

    fn set_selection(&mut self, selection: DisplaySelection) {
        self.selections.push(selection);
    }

    fn begin_batch_edit(&mut self) {
        self.batches_opened += 1;
    }

    fn end_batch_edit(&mut self) {
        self.batches_closed += 1;
    }

    fn composition_host(&mut self) -> Option<&mut dyn CompositionHost> {
        self.ime.as_mut().map(|ime| ime as &mut dyn CompositionHost)
    }
}

#[derive(Debug, Default)]
pub struct RecordingIme {
    pub events: Vec<(&'static str, DisplaySelection)>,
}

impl CompositionHost for RecordingIme {
    fn begin_composition(&mut self, range: DisplaySelection) {
        self.events.push(("begin", range));
    }

    fn update_composition(&mut self, range: DisplaySelection) {
        self.events.push(("update", range));
    }

    fn commit_composition(&mut self, range: DisplaySelection) {
        self.events.push(("commit", range));
    }

    fn cancel_composition(&mut self, range: DisplaySelection) {
        self.events.push(("cancel", range));
    }
}
