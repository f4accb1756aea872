//! The card board: any number of titled timelines, each an ordered card
//! sequence with elbow connectors drawn on an overlay.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tijdlijn_protocol::{Rect, RenderCommand, Size};

use crate::codec::cards::cards_from_json;
use crate::codec::{CARDS_STORAGE_KEY, CardsDocument, deserialize_cards, serialize_cards};
use crate::config::EditorConfig;
use crate::model::{Direction, MoveDirection, NodeKind, Timeline};
use crate::parsers::{ImportError, SheetReader, import_sheet};
use crate::routing::draw_card_connectors;
use crate::scheduler::{FlushMode, FrameId, FrameScheduler, RedrawScope, Scheduled};
use crate::store::{AutoSaver, KeyValueStore, StoreError};
use crate::views::cards::content_size;
use crate::views::{CardLayoutMode, CardMetrics, TimelineContent, layout_cards, render_timeline};

/// Short user-facing status messages ("flash").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Saved,
    Restored,
    NothingToRestore,
    RestoreFailed,
    AllCleared,
    Imported,
    ImportFailed,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::Saved => "Opgeslagen ✅",
            Notice::Restored => "Hersteld",
            Notice::NothingToRestore => "Niets te herstellen",
            Notice::RestoreFailed => "Herstellen mislukt",
            Notice::AllCleared => "Alle tijdlijnen verwijderd 🗑️",
            Notice::Imported => "Import voltooid ✅",
            Notice::ImportFailed => "Import mislukt ❌",
        }
    }
}

pub struct TimelineEditor {
    timelines: Vec<Timeline>,
    metrics: CardMetrics,
    dpr: f64,
    wrapper_width: f64,
    overlays: Vec<Vec<RenderCommand>>,
    scheduler: FrameScheduler,
    autosave: AutoSaver,
    notice: Option<Notice>,
}

impl TimelineEditor {
    /// An empty board. Most hosts want [`TimelineEditor::open`].
    pub fn new(config: &EditorConfig, mode: FlushMode) -> Self {
        Self {
            timelines: Vec::new(),
            metrics: config.card_metrics(),
            dpr: config.device_pixel_ratio,
            wrapper_width: config.board.w,
            overlays: Vec::new(),
            scheduler: FrameScheduler::new(mode),
            autosave: AutoSaver::new(CARDS_STORAGE_KEY, config.autosave_delay()),
            notice: None,
        }
    }

    /// Start from the persisted board. Without usable data the board starts
    /// with one fresh timeline.
    pub fn open(config: &EditorConfig, mode: FlushMode, store: &dyn KeyValueStore) -> Self {
        let mut editor = Self::new(config, mode);
        let restored = match store.get(CARDS_STORAGE_KEY) {
            Ok(Some(json)) => match cards_from_json(&json) {
                Ok(doc) => Some(deserialize_cards(&doc)),
                Err(err) => {
                    tracing::warn!("ignoring corrupt card board: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("could not read card board: {err}");
                None
            }
        };
        editor.replace(restored.unwrap_or_else(|| vec![Timeline::new()]));
        editor
    }

    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    pub fn timeline(&self, index: usize) -> Option<&Timeline> {
        self.timelines.get(index)
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    /// Take (and forget) the latest status message.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    fn replace(&mut self, timelines: Vec<Timeline>) {
        self.overlays = vec![Vec::new(); timelines.len()];
        self.timelines = timelines;
        self.request_redraw(RedrawScope::All);
    }

    pub fn add_timeline(&mut self, now: Instant) -> usize {
        self.timelines.push(Timeline::new());
        self.overlays.push(Vec::new());
        self.request_redraw(RedrawScope::All);
        self.autosave.mark_dirty(now);
        self.timelines.len() - 1
    }

    pub fn remove_timeline(&mut self, index: usize, now: Instant) -> Option<Timeline> {
        if index >= self.timelines.len() {
            return None;
        }
        self.overlays.remove(index);
        let removed = self.timelines.remove(index);
        self.request_redraw(RedrawScope::All);
        self.autosave.mark_dirty(now);
        Some(removed)
    }

    /// Drop every timeline and the persisted record.
    pub fn clear_all(&mut self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        self.timelines.clear();
        self.overlays.clear();
        self.autosave.cancel();
        store.remove(CARDS_STORAGE_KEY)?;
        self.request_redraw(RedrawScope::All);
        self.notice = Some(Notice::AllCleared);
        Ok(())
    }

    pub fn set_title(&mut self, index: usize, title: impl Into<String>, now: Instant) -> bool {
        let Some(timeline) = self.timelines.get_mut(index) else {
            return false;
        };
        timeline.title = title.into();
        self.autosave.mark_dirty(now);
        true
    }

    /// Edit a card's text. Text can change the card height, so the
    /// timeline is rerouted.
    pub fn set_card_text(
        &mut self,
        index: usize,
        card: usize,
        title: Option<String>,
        description: Option<String>,
        now: Instant,
    ) -> bool {
        let Some(target) = self
            .timelines
            .get_mut(index)
            .and_then(|tl| tl.card_mut(card))
        else {
            return false;
        };
        if let Some(title) = title {
            target.title = title;
        }
        if let Some(description) = description {
            target.description = description;
        }
        self.reroute(index);
        self.autosave.mark_dirty(now);
        true
    }

    pub fn move_card(
        &mut self,
        index: usize,
        card: usize,
        direction: MoveDirection,
        now: Instant,
    ) -> Option<usize> {
        let to = self.timelines.get_mut(index)?.move_card(card, direction)?;
        self.reroute(index);
        self.autosave.mark_dirty(now);
        Some(to)
    }

    pub fn add_card(&mut self, index: usize, now: Instant) -> bool {
        let Some(timeline) = self.timelines.get_mut(index) else {
            return false;
        };
        timeline.add_card();
        self.reroute(index);
        self.autosave.mark_dirty(now);
        true
    }

    /// Remove the last card; a timeline never drops below one card.
    pub fn remove_last_card(&mut self, index: usize, now: Instant) -> bool {
        let removed = self
            .timelines
            .get_mut(index)
            .is_some_and(Timeline::remove_last);
        if removed {
            self.reroute(index);
            self.autosave.mark_dirty(now);
        }
        removed
    }

    pub fn reset_timeline(&mut self, index: usize, now: Instant) -> bool {
        let Some(timeline) = self.timelines.get_mut(index) else {
            return false;
        };
        timeline.reset();
        self.reroute(index);
        self.autosave.mark_dirty(now);
        true
    }

    /// Flip the card's type badge. The badge width changes, so every
    /// canvas is redrawn on the next frame.
    pub fn toggle_kind(&mut self, index: usize, card: usize, now: Instant) -> Option<NodeKind> {
        let kind = self.timelines.get_mut(index)?.toggle_kind(card)?;
        self.request_redraw(RedrawScope::All);
        self.autosave.mark_dirty(now);
        Some(kind)
    }

    pub fn toggle_direction(&mut self, index: usize, card: usize, now: Instant) -> Option<Direction> {
        let direction = self.timelines.get_mut(index)?.toggle_direction(card)?;
        self.autosave.mark_dirty(now);
        Some(direction)
    }

    /// The page (and with it every wrapper) changed width. Hidden or
    /// collapsed hosts report zero and are ignored.
    pub fn set_wrapper_width(&mut self, width: f64) -> Option<FrameId> {
        if !(width.is_finite() && width >= 2.0) {
            return None;
        }
        self.wrapper_width = width;
        self.request_redraw(RedrawScope::All)
    }

    pub fn set_device_pixel_ratio(&mut self, dpr: f64) -> Option<FrameId> {
        self.dpr = dpr;
        self.request_redraw(RedrawScope::All)
    }

    /// Card boxes for one timeline at the current wrapper width.
    pub fn card_boxes(&self, index: usize) -> Vec<Rect> {
        let count = self.timelines.get(index).map_or(0, Timeline::len);
        layout_cards(
            count,
            CardLayoutMode::Wrap {
                width: self.wrapper_width,
            },
            &self.metrics,
        )
    }

    /// Cached connector overlay of one timeline.
    pub fn overlay(&self, index: usize) -> Option<&[RenderCommand]> {
        self.overlays.get(index).map(Vec::as_slice)
    }

    /// Full drawing (cards and connectors) of one timeline.
    pub fn render(&self, index: usize, mode: CardLayoutMode) -> Option<TimelineContent> {
        let timeline = self.timelines.get(index)?;
        Some(render_timeline(timeline, index, mode, &self.metrics))
    }

    pub fn card_metrics(&self) -> &CardMetrics {
        &self.metrics
    }

    pub fn wrapper_width(&self) -> f64 {
        self.wrapper_width
    }

    /// Redraw one timeline now, unless a full redraw is already queued and
    /// will cover it anyway.
    fn reroute(&mut self, index: usize) {
        if self.scheduler.is_global_pending() {
            return;
        }
        self.draw_overlay(index);
    }

    fn draw_overlay(&mut self, index: usize) {
        let boxes = self.card_boxes(index);
        let wrapper = Size::new(self.wrapper_width, content_size(&boxes).h);
        let commands = draw_card_connectors(wrapper, self.dpr, &boxes);
        // A hidden wrapper keeps whatever it showed last.
        if commands.is_empty() {
            return;
        }
        if let Some(slot) = self.overlays.get_mut(index) {
            *slot = commands;
        }
    }

    /// Queue a redraw. Returns the frame the host should call back with, or
    /// `None` when the redraw already happened (synchronous mode).
    pub fn request_redraw(&mut self, scope: RedrawScope) -> Option<FrameId> {
        match self.scheduler.schedule(scope) {
            Scheduled::Frame(id) => Some(id),
            Scheduled::Now(scope) => {
                self.apply(&scope);
                None
            }
        }
    }

    /// Animation-frame callback. Stale frames do nothing.
    pub fn on_frame(&mut self, frame: FrameId) -> bool {
        match self.scheduler.on_frame(frame) {
            Some(scope) => {
                self.apply(&scope);
                true
            }
            None => false,
        }
    }

    /// Run any queued redraw immediately.
    pub fn flush_redraws(&mut self) -> bool {
        match self.scheduler.flush() {
            Some(scope) => {
                self.apply(&scope);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, scope: &RedrawScope) {
        for index in 0..self.timelines.len() {
            if scope.covers(index) {
                self.draw_overlay(index);
            }
        }
    }

    pub fn to_document(&self, now: DateTime<Utc>) -> CardsDocument {
        serialize_cards(&self.timelines, now)
    }

    /// Replace the board with a document's timelines (JSON or tabular
    /// import) and queue a save.
    pub fn load_document(&mut self, doc: &CardsDocument, now: Instant) {
        self.replace(deserialize_cards(doc));
        self.autosave.mark_dirty(now);
    }

    pub fn import_timelines(&mut self, timelines: Vec<Timeline>, now: Instant) {
        self.replace(timelines);
        self.autosave.mark_dirty(now);
    }

    /// One timeline per day of `data`. A sheet that yields nothing leaves
    /// the board untouched.
    pub fn import_sheet(
        &mut self,
        reader: &dyn SheetReader,
        data: &[u8],
        now: Instant,
    ) -> Result<usize, ImportError> {
        match import_sheet(reader, data) {
            Ok(timelines) => {
                let count = timelines.len();
                self.import_timelines(timelines, now);
                self.notice = Some(Notice::Imported);
                Ok(count)
            }
            Err(err) => {
                tracing::warn!("import failed: {err}");
                self.notice = Some(Notice::ImportFailed);
                Err(err)
            }
        }
    }

    /// Write the board if the debounce window has passed since the last edit.
    pub fn poll_autosave(&mut self, now: Instant, store: &mut dyn KeyValueStore) -> Result<bool, StoreError> {
        let timelines = &self.timelines;
        let written = self.autosave.poll(now, store, || snapshot(timelines))?;
        if written {
            self.notice = Some(Notice::Saved);
        }
        Ok(written)
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Save right away, dropping any pending debounced save.
    pub fn save(&mut self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        self.autosave.cancel();
        store.set(CARDS_STORAGE_KEY, &snapshot(&self.timelines)?)?;
        self.notice = Some(Notice::Saved);
        Ok(())
    }

    /// Reload the persisted board. Missing data or a corrupt record leaves
    /// the current board as it is and posts a notice.
    pub fn restore(&mut self, store: &dyn KeyValueStore) -> Notice {
        let json = match store.get(CARDS_STORAGE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return self.post(Notice::NothingToRestore),
            Err(err) => {
                tracing::warn!("could not read card board: {err}");
                return self.post(Notice::RestoreFailed);
            }
        };
        match cards_from_json(&json) {
            Ok(doc) => {
                self.replace(deserialize_cards(&doc));
                self.post(Notice::Restored)
            }
            Err(err) => {
                tracing::warn!("restore failed: {err}");
                self.post(Notice::RestoreFailed)
            }
        }
    }

    fn post(&mut self, notice: Notice) -> Notice {
        self.notice = Some(notice);
        notice
    }
}

fn snapshot(timelines: &[Timeline]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(&serialize_cards(timelines, Utc::now()))?)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::MemoryStore;

    fn editor(mode: FlushMode) -> TimelineEditor {
        let mut ed = TimelineEditor::new(&EditorConfig::default(), mode);
        ed.replace(vec![Timeline::new(), Timeline::new()]);
        ed.flush_redraws();
        ed
    }

    fn polylines(cmds: &[RenderCommand]) -> usize {
        cmds.iter()
            .filter(|c| matches!(c, RenderCommand::DrawPolyline { .. }))
            .count()
    }

    #[test]
    fn first_run_starts_with_one_timeline() {
        let store = MemoryStore::new();
        let ed = TimelineEditor::open(&EditorConfig::default(), FlushMode::Synchronous, &store);
        assert_eq!(ed.len(), 1);
        assert_eq!(ed.timelines()[0].len(), 4);
        assert_eq!(polylines(ed.overlay(0).unwrap()), 3);
    }

    #[test]
    fn corrupt_record_on_open_falls_back_to_fresh_board() {
        let mut store = MemoryStore::new();
        store.set(CARDS_STORAGE_KEY, "{{{").unwrap();
        let ed = TimelineEditor::open(&EditorConfig::default(), FlushMode::Synchronous, &store);
        assert_eq!(ed.len(), 1);
    }

    #[test]
    fn move_reroutes_only_its_timeline() {
        let mut ed = editor(FlushMode::Batched);
        let now = Instant::now();
        ed.add_card(0, now);
        assert_eq!(polylines(ed.overlay(0).unwrap()), 4);
        assert_eq!(polylines(ed.overlay(1).unwrap()), 3);
        assert_eq!(ed.move_card(0, 4, MoveDirection::Left, now), Some(3));
        assert_eq!(ed.move_card(0, 0, MoveDirection::Left, now), None);
    }

    #[test]
    fn pending_global_redraw_defers_local_reroute() {
        let mut ed = editor(FlushMode::Batched);
        let now = Instant::now();
        let frame = ed.set_wrapper_width(2000.0).unwrap();
        ed.add_card(1, now);
        // still the old overlay: 3 connectors
        assert_eq!(polylines(ed.overlay(1).unwrap()), 3);
        assert!(ed.on_frame(frame));
        assert_eq!(polylines(ed.overlay(1).unwrap()), 4);
    }

    #[test]
    fn newer_frame_supersedes_older() {
        let mut ed = editor(FlushMode::Batched);
        let now = Instant::now();
        let first = ed.set_wrapper_width(900.0).unwrap();
        ed.add_timeline(now);
        let second = ed.set_wrapper_width(1000.0).unwrap();
        assert!(!ed.on_frame(first));
        assert!(ed.on_frame(second));
        assert_eq!(polylines(ed.overlay(2).unwrap()), 3);
    }

    #[test]
    fn zero_width_resize_is_ignored() {
        let mut ed = editor(FlushMode::Synchronous);
        let before = ed.overlay(0).unwrap().to_vec();
        assert_eq!(ed.set_wrapper_width(0.0), None);
        assert_eq!(ed.wrapper_width(), 1200.0);
        assert_eq!(ed.overlay(0).unwrap(), before.as_slice());
    }

    #[test]
    fn single_card_overlay_only_clears() {
        let mut ed = editor(FlushMode::Synchronous);
        let now = Instant::now();
        for _ in 0..5 {
            ed.remove_last_card(0, now);
        }
        assert_eq!(ed.timelines()[0].len(), 1);
        let overlay = ed.overlay(0).unwrap();
        assert_eq!(polylines(overlay), 0);
        assert!(overlay.iter().any(|c| matches!(c, RenderCommand::Clear { .. })));
    }

    #[test]
    fn autosave_is_debounced() {
        let mut ed = editor(FlushMode::Synchronous);
        let mut store = MemoryStore::new();
        let t0 = Instant::now();
        ed.toggle_direction(0, 0, t0);
        ed.set_title(0, "Maandag", t0 + Duration::from_millis(200));
        assert!(!ed.poll_autosave(t0 + Duration::from_millis(300), &mut store).unwrap());
        assert!(ed.poll_autosave(t0 + Duration::from_millis(450), &mut store).unwrap());
        assert_eq!(ed.take_notice(), Some(Notice::Saved));
        let saved = store.get(CARDS_STORAGE_KEY).unwrap().unwrap();
        assert!(saved.contains("\"title\":\"Maandag\""));
        assert!(saved.contains("\"direction\":\"OUT\""));
        assert!(!ed.poll_autosave(t0 + Duration::from_secs(5), &mut store).unwrap());
    }

    #[test]
    fn restore_outcomes() {
        let mut ed = editor(FlushMode::Synchronous);
        let mut store = MemoryStore::new();
        assert_eq!(ed.restore(&store), Notice::NothingToRestore);

        store.set(CARDS_STORAGE_KEY, "not json").unwrap();
        assert_eq!(ed.restore(&store), Notice::RestoreFailed);
        assert_eq!(ed.len(), 2);

        ed.remove_timeline(1, Instant::now());
        ed.save(&mut store).unwrap();
        ed.add_timeline(Instant::now());
        assert_eq!(ed.restore(&store), Notice::Restored);
        assert_eq!(ed.len(), 1);
    }

    #[test]
    fn clear_all_removes_the_record() {
        let mut ed = editor(FlushMode::Synchronous);
        let mut store = MemoryStore::new();
        ed.save(&mut store).unwrap();
        ed.clear_all(&mut store).unwrap();
        assert!(ed.is_empty());
        assert_eq!(store.get(CARDS_STORAGE_KEY).unwrap(), None);
        assert_eq!(ed.take_notice(), Some(Notice::AllCleared));
    }

    #[test]
    fn sheet_import_replaces_the_board() {
        use crate::parsers::DelimitedReader;

        let mut ed = editor(FlushMode::Synchronous);
        let now = Instant::now();
        let csv = b"Datum;Tijd;Status;Plaats\n2024-03-01;08:00;START;Gent\n2024-03-02;17:00;STOP;Brugge\n";
        assert_eq!(ed.import_sheet(&DelimitedReader::default(), csv, now).unwrap(), 2);
        assert_eq!(ed.take_notice(), Some(Notice::Imported));
        assert_eq!(ed.timelines()[1].title, "2024-03-02");
        assert!(ed.autosave_pending());

        assert!(ed.import_sheet(&DelimitedReader::default(), b"Datum;Tijd\n", now).is_err());
        assert_eq!(ed.take_notice(), Some(Notice::ImportFailed));
        assert_eq!(ed.len(), 2);
    }
}
