//! The free-canvas editor: one value owning nodes, baseline, colors,
//! selection, notes, undo and drag state.

use tijdlijn_protocol::{HexColor, Point, RenderCommand, Size};

use crate::baseline::{Baseline, BaselineDrag, clamp_baseline, compute_baseline};
use crate::codec::{
    CanvasDocument, CanvasSnapshot, CodecError, deserialize_canvas, serialize_canvas,
};
use crate::codec::canvas::{canvas_from_json, canvas_to_json};
use crate::colors::RecentColors;
use crate::config::EditorConfig;
use crate::drag::{DragController, DragTarget, place_in_board};
use crate::grid::GridSize;
use crate::model::note::{NOTE_HEIGHT, NOTE_WIDTH};
use crate::model::{NodeId, NodeKind, NodeMetrics, NodeRegistry, Note, TableMetrics};
use crate::segments::{SegmentColors, SegmentKey, SegmentKeyError};
use crate::selection::Selection;
use crate::store::{KeyValueStore, StoreError};
use crate::undo::{UndoAction, UndoLog};
use crate::views::{CanvasScene, render_canvas};

/// Vertical distance between the baseline and a freshly added note.
pub const NOTE_BASELINE_OFFSET: f64 = 24.0;

pub struct EditorSession {
    board: Size,
    grid: GridSize,
    snap: bool,
    margin: f64,
    metrics: Box<dyn NodeMetrics + Send>,
    nodes: NodeRegistry,
    baseline: Baseline,
    colors: SegmentColors,
    recent: RecentColors,
    selection: Selection,
    undo: UndoLog,
    notes: Vec<Note>,
    next_note_id: u64,
    drags: DragController,
    baseline_drag: Option<BaselineDrag>,
}

impl EditorSession {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            board: config.board,
            grid: config.grid,
            snap: config.snap,
            margin: config.margin,
            metrics: Box::new(TableMetrics),
            nodes: NodeRegistry::new(),
            baseline: Baseline::default(),
            colors: SegmentColors::new(),
            recent: RecentColors::new(config.recent_colors_limit),
            selection: Selection::default(),
            undo: UndoLog::default(),
            notes: Vec::new(),
            next_note_id: 1,
            drags: DragController::default(),
            baseline_drag: None,
        }
    }

    /// Replace the per-kind size table with a measuring collaborator.
    pub fn with_metrics(mut self, metrics: Box<dyn NodeMetrics + Send>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn board(&self) -> Size {
        self.board
    }

    /// The board was resized by its host. Nodes keep their pixel positions;
    /// the baseline is pulled back inside the new margins.
    pub fn resize_board(&mut self, size: Size) {
        if size.is_degenerate() {
            return;
        }
        self.board = size;
        self.clamp_stored_baseline();
    }

    fn clamp_stored_baseline(&mut self) {
        if let Some(y) = self.baseline.value() {
            self.baseline
                .set(Some(clamp_baseline(y, self.board.h, self.margin)));
        }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Change the snapping quantum. Existing nodes do not move.
    pub fn set_grid(&mut self, grid: GridSize) {
        self.grid = grid;
    }

    pub fn set_grid_input(&mut self, input: &str) {
        self.grid = GridSize::parse_lossy(input);
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap
    }

    pub fn set_snap(&mut self, enabled: bool) {
        self.snap = enabled;
    }

    fn active_snap(&self) -> Option<GridSize> {
        self.snap.then_some(self.grid)
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn timeline_y(&self) -> Option<f64> {
        self.baseline.value()
    }

    pub fn segment_colors(&self) -> &SegmentColors {
        &self.colors
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn recent_colors(&self) -> &[HexColor] {
        self.recent.colors()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Baseline to use for new notes: the stored one, or what it would be.
    fn effective_baseline(&self) -> f64 {
        let sorted = self.nodes.sorted_by_x(self.metrics.as_ref());
        self.baseline.resolve(&sorted, self.board.h, self.grid)
    }

    fn establish_baseline(&mut self) {
        let sorted = self.nodes.sorted_by_x(self.metrics.as_ref());
        self.baseline.establish(&sorted, self.board.h, self.grid);
    }

    /// Drop a palette item with the pointer at `pointer` (board-local).
    pub fn drop_node(&mut self, kind: NodeKind, pointer: Point) -> NodeId {
        let size = self.metrics.node_size(kind);
        let mut x = pointer.x - size.w / 2.0;
        let mut y = pointer.y - size.h / 2.0;
        if let Some(grid) = self.active_snap() {
            x = grid.snap(x);
            y = grid.snap(y);
        }
        self.add_node(kind, x, y)
    }

    /// Place a node at an exact top-left position. Undoable.
    pub fn add_node(&mut self, kind: NodeKind, x: f64, y: f64) -> NodeId {
        let id = self.nodes.add(kind, x, y);
        self.undo.push(UndoAction::AddNode { id });
        tracing::debug!(%id, %kind, x, y, "node added");
        if self.nodes.len() == 2 {
            self.establish_baseline();
        }
        id
    }

    /// Remove the most recently added node that still exists.
    pub fn undo_last(&mut self) -> Option<NodeId> {
        let nodes = &self.nodes;
        let UndoAction::AddNode { id } = self.undo.pop_live(|action| match action {
            UndoAction::AddNode { id } => nodes.contains(*id),
        })?;
        self.remove_node(id);
        Some(id)
    }

    fn remove_node(&mut self, id: NodeId) {
        if self.nodes.remove(id).is_none() {
            return;
        }
        self.colors.prune(id);
        self.selection.forget_node(id);
        self.drags.cancel_if(DragTarget::Node(id));
        if self.nodes.len() < 2 {
            self.baseline.reset();
        }
    }

    /// Recompute from the node extremes. No-op with fewer than two nodes.
    pub fn recenter_baseline(&mut self) -> bool {
        let sorted = self.nodes.sorted_by_x(self.metrics.as_ref());
        self.baseline.recompute(&sorted, self.board.h, self.grid)
    }

    /// Double-click on the overlay behaves like "recenter".
    pub fn double_click_baseline(&mut self) -> bool {
        self.recenter_baseline()
    }

    pub fn begin_node_drag(&mut self, id: NodeId, pointer: Point) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let start = Point::new(node.x, node.y);
        self.drags.begin(DragTarget::Node(id), pointer, start)
    }

    pub fn begin_note_drag(&mut self, id: u64, pointer: Point) -> bool {
        let Some(note) = self.notes.iter().find(|n| n.id == id) else {
            return false;
        };
        let start = Point::new(note.x, note.y);
        self.drags.begin(DragTarget::Note(id), pointer, start)
    }

    /// Start dragging the baseline; `client_y` is the pointer's y.
    pub fn begin_baseline_drag(&mut self, client_y: f64) -> bool {
        let Some(current) = self.baseline.value() else {
            return false;
        };
        if !self.drags.begin(
            DragTarget::Baseline,
            Point::new(0.0, client_y),
            Point::new(0.0, current),
        ) {
            return false;
        }
        self.baseline_drag = Some(BaselineDrag::begin(current, client_y));
        true
    }

    /// Pointer moved during a drag. Returns false when no drag is active.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        let Some(session) = self.drags.active().copied() else {
            return false;
        };
        let snap = self.active_snap();
        match session.target {
            DragTarget::Node(id) => {
                let Some(node) = self.nodes.get(id) else {
                    return false;
                };
                let size = self.metrics.node_size(node.kind);
                let pos = place_in_board(session.moved_to(pointer), size, self.board, snap);
                self.nodes.move_to(id, pos.x, pos.y)
            }
            DragTarget::Note(id) => {
                let pos = place_in_board(
                    session.moved_to(pointer),
                    Size::new(NOTE_WIDTH, NOTE_HEIGHT),
                    self.board,
                    snap,
                );
                match self.notes.iter_mut().find(|n| n.id == id) {
                    Some(note) => {
                        note.x = pos.x;
                        note.y = pos.y;
                        true
                    }
                    None => false,
                }
            }
            DragTarget::Baseline => match self.baseline_drag {
                Some(drag) => {
                    let y = drag.position(pointer.y, snap, self.board.h, self.margin);
                    self.baseline.set(Some(y));
                    true
                }
                None => false,
            },
        }
    }

    /// Pointer released. Only the first call after a begin does anything.
    pub fn end_drag(&mut self) -> bool {
        self.baseline_drag = None;
        self.drags.end().is_some()
    }

    pub fn add_note(&mut self) -> u64 {
        let id = self.next_note_id;
        self.next_note_id += 1;
        let y = self.grid.snap(self.effective_baseline() + NOTE_BASELINE_OFFSET);
        let x = self.grid.snap((self.board.w - NOTE_WIDTH) / 2.0);
        self.notes.push(Note {
            id,
            x,
            y,
            text: String::new(),
        });
        id
    }

    pub fn set_note_text(&mut self, id: u64, text: impl Into<String>) -> bool {
        match self.notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                note.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn select_segment(&mut self, key: &str) -> Result<SegmentKey, SegmentKeyError> {
        let key: SegmentKey = key.parse()?;
        self.selection.select_segment(key);
        Ok(key)
    }

    /// Color of the selected segment, black when none is selected or set.
    pub fn selected_segment_color(&self) -> HexColor {
        self.selection
            .segment()
            .map(|key| self.colors.get(&key))
            .unwrap_or_default()
    }

    /// Color the selected segment. Hex literals also become the most recent
    /// color. `None` when no segment is selected.
    pub fn set_segment_color(&mut self, input: &str) -> Option<HexColor> {
        let key = self.selection.segment()?;
        let color = self.colors.set(key, input);
        self.recent.push(input);
        Some(color)
    }

    pub fn load_recent_colors(&mut self, store: &dyn KeyValueStore) {
        self.recent = RecentColors::load(store, self.recent.limit());
    }

    pub fn save_recent_colors(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        self.recent.save(store)
    }

    /// Remove nodes, notes, baseline, undo history, colors and selection.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.notes.clear();
        self.baseline.reset();
        self.undo.clear();
        self.colors.clear();
        self.selection.clear();
        self.drags.end();
        self.baseline_drag = None;
    }

    /// Project the canvas. Establishes the baseline first when two or more
    /// nodes exist and none is set yet.
    pub fn render(&mut self) -> Vec<RenderCommand> {
        if self.nodes.len() >= 2 {
            self.establish_baseline();
        }
        let timeline_y = if self.nodes.len() >= 2 {
            self.baseline.value()
        } else {
            None
        };
        render_canvas(&CanvasScene {
            board: self.board,
            nodes: &self.nodes,
            metrics: self.metrics.as_ref(),
            timeline_y,
            colors: &self.colors,
            selection: &self.selection,
            notes: &self.notes,
        })
    }

    pub fn to_document(&self) -> CanvasDocument {
        serialize_canvas(&CanvasSnapshot {
            nodes: &self.nodes,
            board: self.board,
            grid: self.grid,
            timeline_y: self.baseline.value(),
            colors: &self.colors,
        })
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        canvas_to_json(&self.to_document())
    }

    /// Replace nodes, grid, baseline and colors with the document's, scaled
    /// to the current board. Notes are kept.
    ///
    /// Restored positions are never snapped, whatever the snap setting; the
    /// setting itself is left as it was. A stored baseline is clamped to the
    /// board; a missing one is established once two nodes exist.
    pub fn load_document(&mut self, doc: &CanvasDocument) {
        let restored = deserialize_canvas(doc, self.board);
        if doc.grid.is_some() {
            self.grid = restored.grid;
        }
        self.baseline.set(restored.timeline_y);
        self.colors = restored.colors;
        self.nodes = restored.nodes;
        self.clamp_stored_baseline();
        if self.nodes.len() >= 2 {
            self.establish_baseline();
        }
        // Ids may be reused by the new document.
        self.undo.clear();
        self.selection.clear();
        self.drags.end();
        self.baseline_drag = None;
        tracing::debug!(nodes = self.nodes.len(), "canvas document loaded");
    }

    /// Parse and load. On error nothing changes.
    pub fn load_json(&mut self, json: &str) -> Result<(), CodecError> {
        let doc = canvas_from_json(json)?;
        self.load_document(&doc);
        Ok(())
    }

    /// The baseline the engine would compute right now, ignoring any stored
    /// value.
    pub fn computed_baseline(&self) -> f64 {
        let sorted = self.nodes.sorted_by_x(self.metrics.as_ref());
        compute_baseline(&sorted, self.board.h, self.grid)
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}
