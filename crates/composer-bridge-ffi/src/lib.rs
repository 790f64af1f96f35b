//! UniFFI bindings for the mobile composers
//!
//! The Kotlin and Swift editors implement [`ForeignEngine`] (a thin wrapper
//! over their formatting engine binding) and [`ForeignTarget`] (the native
//! text control), then drive a [`ComposerHandle`]. All position translation
//! happens here, so both platforms share one implementation.

use composer_bridge_core::reconciler::{
    CollectedErrors, ComposerEngine, CompositionHost, DisplaySelection, EngineCommand,
    EngineError, ErrorCollector, InputEvent, InputKind, PatternKey, RenderTarget,
    SelectionState, SuggestionPattern, Update,
};
use composer_bridge_core::tree::DecorationKind;
use composer_bridge_core::{
    ComposerError, DisplayPosition, MapError, NodeId, OffsetMapper, Outcome, ReconcilerOptions,
    RenderOptions, RenderedContent, SelectionReconciler, SpanKind,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

uniffi::setup_scaffolding!();

// ============ Errors ============

/// Errors that can cross the FFI boundary
/// Note: Field is named `reason` not `message` to avoid conflict with Throwable.message in Kotlin
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiError {
    #[error("Engine error: {reason}")]
    EngineError { reason: String },
    #[error("Mapping error: {reason}")]
    MappingError { reason: String },
    #[error("Callback error: {reason}")]
    CallbackError { reason: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for FfiError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        FfiError::CallbackError { reason: e.reason }
    }
}

impl From<MapError> for FfiError {
    fn from(e: MapError) -> Self {
        FfiError::MappingError {
            reason: e.to_string(),
        }
    }
}

// ============ Foreign Interfaces ============

/// The formatting engine, implemented on the platform side.
#[uniffi::export(with_foreign)]
pub trait ForeignEngine: Send + Sync {
    fn execute(&self, command: CommandDto) -> Result<UpdateDto, FfiError>;
    fn content_as_html(&self) -> String;
    fn content_as_markdown(&self) -> String;
    fn to_tree(&self) -> String;
}

/// The native text control, implemented on the platform side.
#[uniffi::export(with_foreign)]
pub trait ForeignTarget: Send + Sync {
    fn set_display_content(&self, content: DisplayContentDto);
    fn set_selection(&self, start: u32, end: u32);
    fn begin_batch_edit(&self);
    fn end_batch_edit(&self);
    /// Called for every IME composition change; ignore it if the platform
    /// manages composing regions itself.
    fn composition_changed(&self, phase: CompositionPhase, start: u32, end: u32);
}

struct EngineAdapter(Arc<dyn ForeignEngine>);

impl ComposerEngine for EngineAdapter {
    fn execute(&mut self, command: EngineCommand) -> Result<Update, EngineError> {
        self.0
            .execute(CommandDto::from_core(command))
            .map(UpdateDto::into_core)
            .map_err(|e| EngineError::new(e.to_string()))
    }

    fn content_as_html(&self) -> String {
        self.0.content_as_html()
    }

    fn content_as_markdown(&self) -> String {
        self.0.content_as_markdown()
    }

    fn to_tree(&self) -> String {
        self.0.to_tree()
    }
}

struct TargetAdapter {
    target: Arc<dyn ForeignTarget>,
    /// Last content handed to `target`, readable while a callback runs
    shown: Arc<Mutex<DisplayContentDto>>,
}

impl TargetAdapter {
    fn new(target: Arc<dyn ForeignTarget>) -> Self {
        Self {
            target,
            shown: Arc::new(Mutex::new(DisplayContentDto::from_core(
                &RenderedContent::default(),
            ))),
        }
    }

    fn composition(&self, phase: CompositionPhase, range: DisplaySelection) {
        self.target
            .composition_changed(phase, range.start as u32, range.end as u32);
    }
}

impl RenderTarget for TargetAdapter {
    fn set_display_content(&mut self, content: &RenderedContent) {
        let dto = DisplayContentDto::from_core(content);
        *lock(&self.shown) = dto.clone();
        self.target.set_display_content(dto);
    }

    fn set_selection(&mut self, selection: DisplaySelection) {
        self.target
            .set_selection(selection.start as u32, selection.end as u32);
    }

    fn begin_batch_edit(&mut self) {
        self.target.begin_batch_edit();
    }

    fn end_batch_edit(&mut self) {
        self.target.end_batch_edit();
    }

    fn composition_host(&mut self) -> Option<&mut dyn CompositionHost> {
        Some(self as &mut dyn CompositionHost)
    }
}

impl CompositionHost for TargetAdapter {
    fn begin_composition(&mut self, range: DisplaySelection) {
        self.composition(CompositionPhase::Begin, range);
    }

    fn update_composition(&mut self, range: DisplaySelection) {
        self.composition(CompositionPhase::Update, range);
    }

    fn commit_composition(&mut self, range: DisplaySelection) {
        self.composition(CompositionPhase::Commit, range);
    }

    fn cancel_composition(&mut self, range: DisplaySelection) {
        self.composition(CompositionPhase::Cancel, range);
    }
}

// ============ Composer Handle ============

type Reconciler = SelectionReconciler<EngineAdapter, TargetAdapter>;

/// A composer session: one engine, one native control.
///
/// Native controls fire their listeners synchronously, so a [`ForeignTarget`]
/// callback may call straight back into the handle on the same thread. Those
/// calls never wait for the lock the caller already holds:
///
/// - `select`/`select_at` return [`OutcomeDto::Suppressed`]; the selection is
///   the one being applied
/// - other edits return [`OutcomeDto::Fallback`] and are reported in
///   [`errors`](ComposerHandle::errors)
/// - key events are queued and replayed by the next `drain_key_events`
/// - queries answer from the content already pushed to the target and the
///   selection as of the previous call
#[derive(uniffi::Object)]
pub struct ComposerHandle {
    inner: Mutex<Reconciler>,
    /// Thread currently holding `inner`
    applying: Mutex<Option<ThreadId>>,
    engine: Arc<dyn ForeignEngine>,
    shown: Arc<Mutex<DisplayContentDto>>,
    selection: Mutex<SelectionDto>,
    deferred_keys: Mutex<Vec<InputEvent>>,
    errors: CollectedErrors,
}

/// Clears the owning thread when the call returns or unwinds.
struct Applying<'a>(&'a Mutex<Option<ThreadId>>);

impl<'a> Applying<'a> {
    fn enter(owner: &'a Mutex<Option<ThreadId>>) -> Self {
        *lock(owner) = Some(thread::current().id());
        Self(owner)
    }
}

impl Drop for Applying<'_> {
    fn drop(&mut self) {
        *lock(self.0) = None;
    }
}

// Recover from poisoned mutex (another thread panicked while holding lock)
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl ComposerHandle {
    fn build(
        engine: Arc<dyn ForeignEngine>,
        target: Arc<dyn ForeignTarget>,
        options: ComposerOptionsDto,
    ) -> Self {
        let errors = CollectedErrors::new();
        let (reconciler_options, render_options) = options.into_core();
        let target = TargetAdapter::new(target);
        let shown = Arc::clone(&target.shown);
        let reconciler = SelectionReconciler::new(
            EngineAdapter(Arc::clone(&engine)),
            target,
            reconciler_options,
            render_options,
        )
        .with_error_collector(errors.clone());
        *lock(&shown) = DisplayContentDto::from_core(reconciler.content());

        Self {
            inner: Mutex::new(reconciler),
            applying: Mutex::new(None),
            engine,
            shown,
            selection: Mutex::new(SelectionDto::from_core(SelectionState::default())),
            deferred_keys: Mutex::new(Vec::new()),
            errors,
        }
    }

    /// Run `f` on the reconciler, or `None` when this thread is already
    /// inside it.
    fn with<R>(&self, f: impl FnOnce(&mut Reconciler) -> R) -> Option<R> {
        if *lock(&self.applying) == Some(thread::current().id()) {
            return None;
        }
        let mut reconciler = lock(&self.inner);
        let _applying = Applying::enter(&self.applying);
        for event in lock(&self.deferred_keys).drain(..) {
            reconciler.enqueue_key_event(event);
        }

        let result = f(&mut reconciler);
        *lock(&self.selection) = SelectionDto::from_core(reconciler.selection());
        Some(result)
    }

    fn edit(&self, entry: &str, f: impl FnOnce(&mut Reconciler) -> Outcome) -> OutcomeDto {
        match self.with(f) {
            Some(outcome) => outcome.into(),
            None => {
                log::warn!("{entry} called from a target callback, ignoring");
                self.errors.clone().report(&ComposerError::ReentrantCall {
                    entry: entry.to_string(),
                });
                OutcomeDto::Fallback
            }
        }
    }

    fn select_with(&self, f: impl FnOnce(&mut Reconciler) -> Outcome) -> OutcomeDto {
        self.with(f).map_or_else(
            || {
                log::trace!("selection echoed from a target callback");
                OutcomeDto::Suppressed
            },
            OutcomeDto::from,
        )
    }

    fn map<R>(
        &self,
        f: impl FnOnce(&OffsetMapper<'_>) -> Result<R, MapError>,
    ) -> Result<R, FfiError> {
        match self.with(|r| f(&r.content().mapper())) {
            Some(result) => Ok(result?),
            None => Err(FfiError::MappingError {
                reason: "the composer is applying an update".to_string(),
            }),
        }
    }
}

#[uniffi::export]
impl ComposerHandle {
    /// Create a composer with the default mobile rendering.
    #[uniffi::constructor]
    pub fn new(engine: Arc<dyn ForeignEngine>, target: Arc<dyn ForeignTarget>) -> Self {
        Self::build(engine, target, ComposerOptionsDto::default())
    }

    #[uniffi::constructor]
    pub fn with_options(
        engine: Arc<dyn ForeignEngine>,
        target: Arc<dyn ForeignTarget>,
        options: ComposerOptionsDto,
    ) -> Self {
        Self::build(engine, target, options)
    }

    pub fn set_content_from_html(&self, html: String) -> OutcomeDto {
        self.edit("set_content_from_html", |r| r.set_content_from_html(&html))
    }

    /// The native selection changed, in flat display indices.
    pub fn select(&self, start: u32, end: u32) -> OutcomeDto {
        self.select_with(|r| {
            r.on_selection_changed(DisplaySelection::new(start as usize, end as usize))
        })
    }

    /// The native selection changed, as node positions.
    pub fn select_at(&self, anchor: PositionDto, focus: PositionDto) -> OutcomeDto {
        self.select_with(|r| r.on_selection_changed_at(anchor.into_core(), focus.into_core()))
    }

    pub fn handle_input(&self, event: InputEventDto) -> OutcomeDto {
        self.edit("handle_input", |r| r.handle_input(event.into_core()))
    }

    /// Toolbar and formatting actions.
    pub fn execute(&self, command: CommandDto) -> OutcomeDto {
        self.edit("execute", |r| r.execute(command.into_core()))
    }

    pub fn update_composition(&self, text: String) -> OutcomeDto {
        self.edit("update_composition", |r| r.update_composition(&text))
    }

    pub fn commit_composition(&self) -> OutcomeDto {
        self.edit("commit_composition", |r| r.commit_composition())
    }

    pub fn cancel_composition(&self) -> OutcomeDto {
        self.edit("cancel_composition", |r| r.cancel_composition())
    }

    pub fn enqueue_key_event(&self, event: InputEventDto) {
        lock(&self.deferred_keys).push(event.into_core());
    }

    pub fn drain_key_events(&self) -> Vec<OutcomeDto> {
        self.with(|r| r.drain_key_events())
            .unwrap_or_default()
            .into_iter()
            .map(OutcomeDto::from)
            .collect()
    }

    pub fn selection(&self) -> SelectionDto {
        *lock(&self.selection)
    }

    pub fn display_content(&self) -> DisplayContentDto {
        lock(&self.shown).clone()
    }

    pub fn logical_to_index(&self, logical: u32) -> Result<u32, FfiError> {
        self.map(|mapper| mapper.logical_to_index(logical as usize))
            .map(|index| index as u32)
    }

    pub fn index_to_logical(&self, index: u32) -> Result<u32, FfiError> {
        self.map(|mapper| mapper.index_to_logical(index as usize))
            .map(|logical| logical as u32)
    }

    pub fn content_as_html(&self) -> String {
        self.engine.content_as_html()
    }

    pub fn content_as_markdown(&self) -> String {
        self.engine.content_as_markdown()
    }

    /// The engine's model dump followed by the display tree.
    pub fn debug_tree(&self) -> String {
        let display = self.with(|r| r.content().debug_tree()).unwrap_or_default();
        format!("{}\n{display}", self.engine.to_tree())
    }

    /// The recorded session as a Rust test case, when recording is enabled.
    pub fn action_log_test_case(&self) -> Option<String> {
        self.with(|r| r.action_log().map(|log| log.to_test_case()))
            .flatten()
    }

    /// Every error the composer recovered from so far.
    pub fn errors(&self) -> Vec<String> {
        self.errors.errors().iter().map(|e| e.to_string()).collect()
    }
}

// ============ DTOs ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum OutcomeDto {
    TreeReplaced,
    SelectionOnlyMoved,
    NoOp,
    Suppressed,
    Fallback,
}

impl From<Outcome> for OutcomeDto {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::TreeReplaced => OutcomeDto::TreeReplaced,
            Outcome::SelectionOnlyMoved => OutcomeDto::SelectionOnlyMoved,
            Outcome::NoOp => OutcomeDto::NoOp,
            Outcome::Suppressed => OutcomeDto::Suppressed,
            Outcome::Fallback => OutcomeDto::Fallback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum CompositionPhase {
    Begin,
    Update,
    Commit,
    Cancel,
}

/// Rendering and reconciliation settings. `None` keeps the default.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct ComposerOptionsDto {
    pub bullet: Option<String>,
    pub list_indent: Option<String>,
    pub ordered_suffix: Option<String>,
    pub marker_separator: Option<String>,
    /// An empty string disables placeholders
    pub empty_block_placeholder: Option<String>,
    pub quote_prefix: Option<String>,
    pub mention_width: Option<u32>,
    pub detect_permalink_mentions: Option<bool>,
    pub suppress_mirrored_selection: Option<bool>,
    pub reopen_composition_after_replace: Option<bool>,
    pub record_actions: Option<bool>,
}

impl ComposerOptionsDto {
    fn into_core(self) -> (ReconcilerOptions, RenderOptions) {
        let mut render = RenderOptions::default();
        if let Some(bullet) = self.bullet {
            render.bullet = bullet;
        }
        if let Some(indent) = self.list_indent {
            render.list_indent = indent;
        }
        if let Some(suffix) = self.ordered_suffix {
            render.ordered_suffix = suffix;
        }
        if let Some(separator) = self.marker_separator {
            render.marker_separator = separator;
        }
        if let Some(placeholder) = self.empty_block_placeholder {
            render.empty_block_placeholder = (!placeholder.is_empty()).then_some(placeholder);
        }
        if let Some(prefix) = self.quote_prefix {
            render.quote_prefix = prefix;
        }
        if let Some(width) = self.mention_width {
            render.mention_width = width as usize;
        }
        if let Some(detect) = self.detect_permalink_mentions {
            render.detect_permalink_mentions = detect;
        }

        let mut reconciler = ReconcilerOptions::default();
        if let Some(suppress) = self.suppress_mirrored_selection {
            reconciler.suppress_mirrored_selection = suppress;
        }
        if let Some(reopen) = self.reopen_composition_after_replace {
            reconciler.reopen_composition_after_replace = reopen;
        }
        if let Some(record) = self.record_actions {
            reconciler.record_actions = record;
        }
        (reconciler, render)
    }
}

/// What the native control should display.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct DisplayContentDto {
    pub text: String,
    /// Length of `text` in UTF-16 code units
    pub display_len: u32,
    pub logical_len: u32,
    /// Spans whose logical width differs from their display width
    pub spans: Vec<SpanDto>,
}

impl DisplayContentDto {
    fn from_core(content: &RenderedContent) -> Self {
        Self {
            text: content.display_text().to_string(),
            display_len: content.display_len() as u32,
            logical_len: content.logical_len() as u32,
            spans: content
                .registry
                .spans()
                .iter()
                .map(|span| SpanDto {
                    start: span.display.start as u32,
                    end: span.display.end as u32,
                    logical_width: span.logical_width as u32,
                    kind: span_kind_name(span.kind).to_string(),
                })
                .collect(),
        }
    }
}

fn span_kind_name(kind: SpanKind) -> &'static str {
    match kind {
        SpanKind::Decorative(DecorationKind::ListPrefix) => "list_prefix",
        SpanKind::Decorative(DecorationKind::Placeholder) => "placeholder",
        SpanKind::Decorative(DecorationKind::QuotePrefix) => "quote_prefix",
        SpanKind::Atomic(mention) => mention.as_attribute(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct SpanDto {
    pub start: u32,
    pub end: u32,
    pub logical_width: u32,
    /// `list_prefix`, `placeholder`, `quote_prefix`, or the mention type
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Record)]
pub struct SelectionDto {
    pub anchor: u32,
    pub focus: u32,
    pub start_display: u32,
    pub end_display: u32,
}

impl SelectionDto {
    fn from_core(state: SelectionState) -> Self {
        Self {
            anchor: state.anchor as u32,
            focus: state.focus as u32,
            start_display: state.start_display as u32,
            end_display: state.end_display as u32,
        }
    }
}

/// A node position in the display tree (DOM-style platforms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Record)]
pub struct PositionDto {
    pub node: u32,
    pub offset: u32,
}

impl PositionDto {
    fn into_core(self) -> DisplayPosition {
        DisplayPosition::new(NodeId(self.node), self.offset as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum InputKindDto {
    InsertText { text: String },
    DeleteBackward,
    DeleteForward,
    InsertParagraph,
    CompositionUpdate { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct InputEventDto {
    pub kind: InputKindDto,
    /// Native selection start at the time of the event, if known
    pub start: Option<u32>,
    pub end: Option<u32>,
}

impl InputEventDto {
    fn into_core(self) -> InputEvent {
        let kind = match self.kind {
            InputKindDto::InsertText { text } => InputKind::InsertText { text },
            InputKindDto::DeleteBackward => InputKind::DeleteBackward,
            InputKindDto::DeleteForward => InputKind::DeleteForward,
            InputKindDto::InsertParagraph => InputKind::InsertParagraph,
            InputKindDto::CompositionUpdate { text } => InputKind::CompositionUpdate { text },
        };
        match (self.start, self.end) {
            (Some(start), end) => {
                let end = end.unwrap_or(start);
                InputEvent::at(kind, DisplaySelection::new(start as usize, end as usize))
            }
            (None, _) => InputEvent::new(kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum PatternKeyDto {
    At,
    Hash,
    Slash,
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct SuggestionPatternDto {
    pub key: PatternKeyDto,
    pub text: String,
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct AttributeDto {
    pub name: String,
    pub value: String,
}

/// An engine call. Offsets are logical.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum CommandDto {
    Select {
        start: u32,
        end: u32,
    },
    ReplaceText {
        text: String,
    },
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
    SetLink {
        url: String,
    },
    RemoveLinks,
    InsertMentionAtSuggestion {
        url: String,
        text: String,
        pattern: SuggestionPatternDto,
        attributes: Vec<AttributeDto>,
    },
    SetContentFromHtml {
        html: String,
    },
}

impl CommandDto {
    fn from_core(command: EngineCommand) -> Self {
        match command {
            EngineCommand::Select { start, end } => CommandDto::Select {
                start: start as u32,
                end: end as u32,
            },
            EngineCommand::ReplaceText { text } => CommandDto::ReplaceText { text },
            EngineCommand::Backspace => CommandDto::Backspace,
            EngineCommand::Delete => CommandDto::Delete,
            EngineCommand::Enter => CommandDto::Enter,
            EngineCommand::Bold => CommandDto::Bold,
            EngineCommand::Italic => CommandDto::Italic,
            EngineCommand::Underline => CommandDto::Underline,
            EngineCommand::StrikeThrough => CommandDto::StrikeThrough,
            EngineCommand::InlineCode => CommandDto::InlineCode,
            EngineCommand::Undo => CommandDto::Undo,
            EngineCommand::Redo => CommandDto::Redo,
            EngineCommand::OrderedList => CommandDto::OrderedList,
            EngineCommand::UnorderedList => CommandDto::UnorderedList,
            EngineCommand::Indent => CommandDto::Indent,
            EngineCommand::Unindent => CommandDto::Unindent,
            EngineCommand::SetLink { url } => CommandDto::SetLink { url },
            EngineCommand::RemoveLinks => CommandDto::RemoveLinks,
            EngineCommand::InsertMentionAtSuggestion {
                url,
                text,
                pattern,
                attributes,
            } => CommandDto::InsertMentionAtSuggestion {
                url,
                text,
                pattern: SuggestionPatternDto {
                    key: match pattern.key {
                        PatternKey::At => PatternKeyDto::At,
                        PatternKey::Hash => PatternKeyDto::Hash,
                        PatternKey::Slash => PatternKeyDto::Slash,
                    },
                    text: pattern.text,
                    start: pattern.start as u32,
                    end: pattern.end as u32,
                },
                attributes: attributes
                    .into_iter()
                    .map(|(name, value)| AttributeDto { name, value })
                    .collect(),
            },
            EngineCommand::SetContentFromHtml { html } => CommandDto::SetContentFromHtml { html },
        }
    }

    fn into_core(self) -> EngineCommand {
        match self {
            CommandDto::Select { start, end } => EngineCommand::Select {
                start: start as usize,
                end: end as usize,
            },
            CommandDto::ReplaceText { text } => EngineCommand::ReplaceText { text },
            CommandDto::Backspace => EngineCommand::Backspace,
            CommandDto::Delete => EngineCommand::Delete,
            CommandDto::Enter => EngineCommand::Enter,
            CommandDto::Bold => EngineCommand::Bold,
            CommandDto::Italic => EngineCommand::Italic,
            CommandDto::Underline => EngineCommand::Underline,
            CommandDto::StrikeThrough => EngineCommand::StrikeThrough,
            CommandDto::InlineCode => EngineCommand::InlineCode,
            CommandDto::Undo => EngineCommand::Undo,
            CommandDto::Redo => EngineCommand::Redo,
            CommandDto::OrderedList => EngineCommand::OrderedList,
            CommandDto::UnorderedList => EngineCommand::UnorderedList,
            CommandDto::Indent => EngineCommand::Indent,
            CommandDto::Unindent => EngineCommand::Unindent,
            CommandDto::SetLink { url } => EngineCommand::SetLink { url },
            CommandDto::RemoveLinks => EngineCommand::RemoveLinks,
            CommandDto::InsertMentionAtSuggestion {
                url,
                text,
                pattern,
                attributes,
            } => EngineCommand::InsertMentionAtSuggestion {
                url,
                text,
                pattern: SuggestionPattern {
                    key: match pattern.key {
                        PatternKeyDto::At => PatternKey::At,
                        PatternKeyDto::Hash => PatternKey::Hash,
                        PatternKeyDto::Slash => PatternKey::Slash,
                    },
                    text: pattern.text,
                    start: pattern.start as usize,
                    end: pattern.end as usize,
                },
                attributes: attributes
                    .into_iter()
                    .map(|attribute| (attribute.name, attribute.value))
                    .collect(),
            },
            CommandDto::SetContentFromHtml { html } => EngineCommand::SetContentFromHtml { html },
        }
    }
}

/// The engine's answer to a command.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum UpdateDto {
    Keep,
    Select { start: u32, end: u32 },
    ReplaceAll { html: String, start: u32, end: u32 },
}

impl UpdateDto {
    fn into_core(self) -> Update {
        match self {
            UpdateDto::Keep => Update::Keep,
            UpdateDto::Select { start, end } => Update::Select {
                start: start as usize,
                end: end as usize,
            },
            UpdateDto::ReplaceAll { html, start, end } => Update::ReplaceAll {
                html,
                start: start as usize,
                end: end as usize,
            },
        }
    }
}

// ============ Standalone Functions ============

/// Render canonical HTML with the default mobile options.
#[uniffi::export]
pub fn render_html(html: String) -> DisplayContentDto {
    let content = composer_bridge_core::render_html(&html, &RenderOptions::default());
    DisplayContentDto::from_core(&content)
}

/// Logical offset of a display index in the rendering of `html`.
#[uniffi::export]
pub fn html_position(html: String, display_index: u32) -> Result<u32, FfiError> {
    let content = composer_bridge_core::render_html(&html, &RenderOptions::default());
    let logical = content.mapper().index_to_logical(display_index as usize)?;
    Ok(logical as u32)
}

/// Display index of a logical offset in the rendering of `html`.
#[uniffi::export]
pub fn attributed_position(html: String, logical: u32) -> Result<u32, FfiError> {
    let content = composer_bridge_core::render_html(&html, &RenderOptions::default());
    let index = content.mapper().logical_to_index(logical as usize)?;
    Ok(index as u32)
}

/// Route `log` output to logcat on Android and stderr elsewhere. Safe to call
/// more than once.
#[uniffi::export]
pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("ComposerBridge"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .try_init();
    }

    log::info!("composer-bridge logging initialised");
}
