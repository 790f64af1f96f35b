//! # Selection Reconciler
//!
//! Owns the edit lifecycle between a native text control and the formatting
//! engine:
//!
//! ```text
//! native event ──► normalise + map display → logical ──► engine command
//!                                                           │
//! target ◄── map logical → display ◄── rebuild tree ◄── Update
//! ```
//!
//! Every entry point takes `&mut self`, so a second engine call can never
//! start while the result of the first is still being applied. Each call runs
//! `Idle → LocalEditCaptured → EngineInvoked → Idle` and reports how it ended
//! as an [`Outcome`].
//!
//! Engine failures are not fatal: the error goes to the configured
//! [`ErrorCollector`], the display is left as it was and the call returns
//! [`Outcome::Fallback`] so the platform can apply its default behaviour.

pub mod collector;
pub mod engine;
pub mod platform;
pub mod state;

pub use collector::{CollectedErrors, ErrorCollector, LogCollector};
pub use engine::{
    ComposerEngine, EngineCommand, EngineError, PatternKey, SuggestionPattern, Update,
};
pub use platform::{
    CompositionHost, DisplaySelection, InputEvent, InputKind, KeyEventQueue, RenderTarget,
};
pub use state::{CompositionRegion, SelectionState};

use crate::action_log::{Action, ActionLog};
use crate::error::ComposerError;
use crate::options::{ReconcilerOptions, RenderOptions};
use crate::tree::{DisplayPosition, RenderedContent, render_html};
use crate::utf16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LocalEditCaptured,
    EngineInvoked,
}

/// How a reconciler call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// New content was rendered and pushed to the target
    TreeReplaced,
    /// Only the selection changed
    SelectionOnlyMoved,
    /// The engine kept everything as it was
    NoOp,
    /// The selection was already known to the engine; nothing was sent
    Suppressed,
    /// The engine failed; the display is unchanged
    Fallback,
}

pub struct SelectionReconciler<E, T> {
    engine: E,
    target: T,
    options: ReconcilerOptions,
    render_options: RenderOptions,
    content: RenderedContent,
    selection: SelectionState,
    composition: Option<CompositionRegion>,
    /// `(anchor, focus)` the engine last agreed to
    last_sent: Option<(usize, usize)>,
    phase: Phase,
    keys: KeyEventQueue,
    collector: Box<dyn ErrorCollector>,
    action_log: Option<ActionLog>,
}

impl<E: ComposerEngine, T: RenderTarget> SelectionReconciler<E, T> {
    /// The initial display is rendered from the engine's current content but
    /// not pushed to `target`; call [`set_content_from_html`](Self::set_content_from_html)
    /// to load a document.
    pub fn new(
        engine: E,
        target: T,
        options: ReconcilerOptions,
        render_options: RenderOptions,
    ) -> Self {
        let content = render_html(&engine.content_as_html(), &render_options);
        let action_log = options.record_actions.then(ActionLog::new);
        Self {
            engine,
            target,
            options,
            render_options,
            content,
            selection: SelectionState::default(),
            composition: None,
            last_sent: None,
            phase: Phase::Idle,
            keys: KeyEventQueue::default(),
            collector: Box::new(LogCollector),
            action_log,
        }
    }

    pub fn with_defaults(engine: E, target: T) -> Self {
        Self::new(
            engine,
            target,
            ReconcilerOptions::default(),
            RenderOptions::default(),
        )
    }

    pub fn with_error_collector(mut self, collector: impl ErrorCollector + 'static) -> Self {
        self.collector = Box::new(collector);
        self
    }

    /// Record every command sent to the engine into `log`.
    pub fn with_action_log(mut self, log: ActionLog) -> Self {
        self.action_log = Some(log);
        self
    }

    pub fn action_log(&self) -> Option<&ActionLog> {
        self.action_log.as_ref()
    }

    pub fn take_action_log(&mut self) -> Option<ActionLog> {
        self.action_log.take()
    }

    pub fn content(&self) -> &RenderedContent {
        &self.content
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn composition(&self) -> Option<&CompositionRegion> {
        self.composition.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    // ---- queries ----

    pub fn content_as_html(&self) -> String {
        self.engine.content_as_html()
    }

    pub fn content_as_markdown(&self) -> String {
        self.engine.content_as_markdown()
    }

    /// The engine's own debug tree.
    pub fn debug_tree(&self) -> String {
        self.engine.to_tree()
    }

    // ---- entry points ----

    /// Replace the whole document. Selection, composition and the last
    /// selection known to the engine all start over.
    pub fn set_content_from_html(&mut self, html: &str) -> Outcome {
        self.finish_composition(false);
        self.last_sent = None;
        self.selection = SelectionState::default();
        self.phase = Phase::LocalEditCaptured;

        let command = EngineCommand::SetContentFromHtml {
            html: html.to_string(),
        };
        match self.invoke(command) {
            Some(update) => self.apply(update),
            None => Outcome::Fallback,
        }
    }

    /// The native selection moved (flat display indices, possibly
    /// backwards, clamped to the display).
    pub fn on_selection_changed(&mut self, selection: DisplaySelection) -> Outcome {
        self.phase = Phase::LocalEditCaptured;
        let outcome = self.select_display(selection);
        self.phase = Phase::Idle;
        outcome
    }

    /// DOM-style variant of [`on_selection_changed`](Self::on_selection_changed).
    pub fn on_selection_changed_at(
        &mut self,
        anchor: DisplayPosition,
        focus: DisplayPosition,
    ) -> Outcome {
        let mapper = self.content.mapper();
        let indices = mapper
            .position_to_index(anchor)
            .and_then(|a| Ok((a, mapper.position_to_index(focus)?)));
        match indices {
            Ok((anchor, focus)) => self.on_selection_changed(DisplaySelection::new(anchor, focus)),
            Err(error) => {
                self.collector.report(&ComposerError::from(error));
                Outcome::Fallback
            }
        }
    }

    /// Native text input.
    pub fn handle_input(&mut self, event: InputEvent) -> Outcome {
        self.phase = Phase::LocalEditCaptured;

        let command = match event.kind {
            InputKind::CompositionUpdate { text } => return self.update_composition(&text),
            InputKind::InsertText { text } => EngineCommand::ReplaceText { text },
            InputKind::DeleteBackward => EngineCommand::Backspace,
            InputKind::DeleteForward => EngineCommand::Delete,
            InputKind::InsertParagraph => EngineCommand::Enter,
        };
        let ends_composition = matches!(command, EngineCommand::ReplaceText { .. });

        // An active composition decides what the edit applies to
        let selection = self
            .composition
            .as_ref()
            .map(|region| region.display)
            .or(event.selection);
        if let Some(selection) = selection {
            if self.select_display(selection) == Outcome::Fallback {
                self.phase = Phase::Idle;
                return Outcome::Fallback;
            }
        }

        let outcome = match self.invoke(command) {
            Some(update) => self.apply(update),
            None => Outcome::Fallback,
        };
        if ends_composition && outcome != Outcome::Fallback {
            self.finish_composition(true);
        }
        outcome
    }

    /// Toolbar-style command against the current selection.
    pub fn execute(&mut self, command: EngineCommand) -> Outcome {
        self.phase = Phase::LocalEditCaptured;
        match self.invoke(command) {
            Some(update) => self.apply(update),
            None => Outcome::Fallback,
        }
    }

    /// The IME's composing text is now `text`.
    ///
    /// Starts a composition at the current selection if none is active.
    pub fn update_composition(&mut self, text: &str) -> Outcome {
        self.phase = Phase::LocalEditCaptured;
        let starting = self.composition.is_none();
        let range = match &self.composition {
            Some(region) => region.display,
            None => self.selection.display(),
        };

        if self.select_display(range) == Outcome::Fallback {
            self.phase = Phase::Idle;
            return Outcome::Fallback;
        }
        let Some(update) = self.invoke(EngineCommand::ReplaceText {
            text: text.to_string(),
        }) else {
            return Outcome::Fallback;
        };

        self.composition = Some(CompositionRegion {
            display: range,
            text: text.to_string(),
        });
        if starting {
            if let Some(host) = self.target.composition_host() {
                host.begin_composition(range);
            }
        }
        self.apply(update)
    }

    pub fn commit_composition(&mut self) -> Outcome {
        self.finish_composition(true);
        Outcome::NoOp
    }

    pub fn cancel_composition(&mut self) -> Outcome {
        self.finish_composition(false);
        Outcome::NoOp
    }

    /// Queue a hardware key event to be replayed as input.
    pub fn enqueue_key_event(&mut self, event: InputEvent) {
        self.keys.push(event);
    }

    pub fn pending_key_events(&self) -> usize {
        self.keys.len()
    }

    /// Replay queued key events in arrival order.
    pub fn drain_key_events(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(self.keys.len());
        while let Some(event) = self.keys.pop() {
            outcomes.push(self.handle_input(event));
        }
        outcomes
    }

    // ---- internals ----

    /// Send a display selection to the engine unless it already knows it.
    fn select_display(&mut self, selection: DisplaySelection) -> Outcome {
        let len = self.content.display_len();
        let anchor = selection.start.min(len);
        let focus = selection.end.min(len);

        let (start, end) = match self.content.mapper().display_range_to_logical(anchor, focus) {
            Ok(range) => range,
            Err(error) => {
                self.collector.report(&ComposerError::from(error));
                return Outcome::Fallback;
            }
        };
        let (anchor, focus) = if anchor <= focus {
            (start, end)
        } else {
            (end, start)
        };

        if self.is_known(anchor, focus) {
            log::trace!("selection {anchor}..{focus} already known to the engine");
            return Outcome::Suppressed;
        }

        let Some(update) = self.invoke(EngineCommand::Select { start, end }) else {
            return Outcome::Fallback;
        };
        self.last_sent = Some((anchor, focus));
        self.selection = SelectionState::derive(&self.content, anchor, focus);
        match self.apply(update) {
            Outcome::NoOp => Outcome::SelectionOnlyMoved,
            outcome => outcome,
        }
    }

    fn is_known(&self, anchor: usize, focus: usize) -> bool {
        match self.last_sent {
            Some(last) if last == (anchor, focus) => true,
            Some(last) => self.options.suppress_mirrored_selection && last == (focus, anchor),
            None => false,
        }
    }

    fn invoke(&mut self, command: EngineCommand) -> Option<Update> {
        self.phase = Phase::EngineInvoked;
        let name = command.name();
        log::debug!("engine <- {}", command.to_call());
        if let Some(log) = &mut self.action_log {
            log.record(Action::Command(command.clone()));
        }

        match self.engine.execute(command) {
            Ok(update) => Some(update),
            Err(error) => {
                log::debug!("engine call {name} failed, keeping current display");
                if let Some(log) = &mut self.action_log {
                    log.record(Action::Failed {
                        reason: error.reason.clone(),
                    });
                }
                self.collector.report(&ComposerError::EngineInvocationFailed {
                    command: name.to_string(),
                    reason: error.reason,
                });
                self.phase = Phase::Idle;
                None
            }
        }
    }

    fn apply(&mut self, update: Update) -> Outcome {
        let outcome = match update {
            Update::Keep => Outcome::NoOp,
            Update::Select { start, end } => {
                self.last_sent = Some((start, end));
                self.selection = SelectionState::derive(&self.content, start, end);
                self.target.set_selection(self.selection.display());
                Outcome::SelectionOnlyMoved
            }
            Update::ReplaceAll { html, start, end } => {
                self.target.begin_batch_edit();
                self.content.rerender(&html, &self.render_options);
                self.target.set_display_content(&self.content);
                self.last_sent = Some((start, end));
                self.selection = SelectionState::derive(&self.content, start, end);
                self.target.set_selection(self.selection.display());
                self.reopen_composition();
                self.target.end_batch_edit();
                Outcome::TreeReplaced
            }
        };
        log::trace!("update applied: {outcome:?}");
        self.phase = Phase::Idle;
        outcome
    }

    /// Move an active composition onto the new content: it ends at the
    /// selection end and starts the composed text's length before it.
    fn reopen_composition(&mut self) {
        if !self.options.reopen_composition_after_replace {
            self.finish_composition(false);
            return;
        }
        let Some(region) = &mut self.composition else {
            return;
        };

        let end = self.selection.end();
        let start = end.saturating_sub(utf16::len(&region.text));
        let mapper = self.content.mapper();
        region.display = DisplaySelection::new(
            mapper.logical_to_index_clamped(start),
            mapper.logical_to_index_clamped(end),
        );
        let display = region.display;
        if let Some(host) = self.target.composition_host() {
            host.update_composition(display);
        }
    }

    fn finish_composition(&mut self, commit: bool) {
        let Some(region) = self.composition.take() else {
            return;
        };
        if let Some(host) = self.target.composition_host() {
            if commit {
                host.commit_composition(region.display);
            } else {
                host.cancel_composition(region.display);
            }
        }
    }
}
