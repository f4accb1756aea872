use std::sync::{Mutex, MutexGuard};

use chrono::DateTime;
use tijdlijn_core::codec::cards::cards_from_json;
use tijdlijn_core::codec::deserialize_cards;
use tijdlijn_core::export::{PrintDocument, PrintLayout};
use tijdlijn_core::model::{NodeId, NodeKind, Timeline};
use tijdlijn_core::parsers::{DelimitedReader, import_sheet};
use tijdlijn_core::views::{CardLayoutMode, render_timeline};
use tijdlijn_core::{EditorConfig, EditorSession};
use tijdlijn_protocol::{Point, Size};
use wasm_bindgen::prelude::*;

static SESSIONS: Mutex<Vec<EditorSession>> = Mutex::new(Vec::new());

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn sessions() -> Result<MutexGuard<'static, Vec<EditorSession>>, JsError> {
    SESSIONS.lock().map_err(|_| JsError::new("session table poisoned"))
}

fn with_session<T>(
    handle: usize,
    f: impl FnOnce(&mut EditorSession) -> Result<T, JsError>,
) -> Result<T, JsError> {
    let mut sessions = sessions()?;
    let session = sessions
        .get_mut(handle)
        .ok_or_else(|| JsError::new("invalid session handle"))?;
    f(session)
}

fn board(json: &str) -> Result<Vec<Timeline>, JsError> {
    Ok(deserialize_cards(&cards_from_json(json).map_err(js_err)?))
}

/// Open a free canvas session. `config` is editor settings JSON and may be empty.
/// Returns a handle for later calls.
#[wasm_bindgen]
pub fn open_canvas(config: &str, width: f64, height: f64) -> Result<usize, JsError> {
    let mut config = if config.trim().is_empty() {
        EditorConfig::default()
    } else {
        EditorConfig::from_json(config).map_err(js_err)?
    };
    config.board = Size::new(width, height);
    let mut sessions = sessions()?;
    sessions.push(EditorSession::new(&config));
    Ok(sessions.len() - 1)
}

#[wasm_bindgen]
pub fn resize_canvas(handle: usize, width: f64, height: f64) -> Result<(), JsError> {
    with_session(handle, |s| {
        s.resize_board(Size::new(width, height));
        Ok(())
    })
}

/// Drop a palette item at a pointer position. Returns the new node id.
#[wasm_bindgen]
pub fn drop_node(handle: usize, kind: &str, x: f64, y: f64) -> Result<u64, JsError> {
    let kind = NodeKind::from_label_lossy(kind);
    with_session(handle, |s| Ok(s.drop_node(kind, Point::new(x, y)).0))
}

#[wasm_bindgen]
pub fn begin_node_drag(handle: usize, id: u64, x: f64, y: f64) -> Result<bool, JsError> {
    with_session(handle, |s| Ok(s.begin_node_drag(NodeId(id), Point::new(x, y))))
}

#[wasm_bindgen]
pub fn begin_baseline_drag(handle: usize, client_y: f64) -> Result<bool, JsError> {
    with_session(handle, |s| Ok(s.begin_baseline_drag(client_y)))
}

#[wasm_bindgen]
pub fn drag_to(handle: usize, x: f64, y: f64) -> Result<bool, JsError> {
    with_session(handle, |s| Ok(s.drag_to(Point::new(x, y))))
}

#[wasm_bindgen]
pub fn end_drag(handle: usize) -> Result<bool, JsError> {
    with_session(handle, |s| Ok(s.end_drag()))
}

/// Remove the most recently added node still on the canvas.
#[wasm_bindgen]
pub fn undo_last(handle: usize) -> Result<Option<u64>, JsError> {
    with_session(handle, |s| Ok(s.undo_last().map(|id| id.0)))
}

#[wasm_bindgen]
pub fn set_grid(handle: usize, input: &str) -> Result<(), JsError> {
    with_session(handle, |s| {
        s.set_grid_input(input);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn set_snap(handle: usize, enabled: bool) -> Result<(), JsError> {
    with_session(handle, |s| {
        s.set_snap(enabled);
        Ok(())
    })
}

/// Select a segment by its `"a->b"` key and return its current color.
#[wasm_bindgen]
pub fn select_segment(handle: usize, key: &str) -> Result<String, JsError> {
    with_session(handle, |s| {
        s.select_segment(key).map_err(js_err)?;
        Ok(s.selected_segment_color().to_string())
    })
}

/// Color the selected segment. Returns the normalized color, if accepted.
#[wasm_bindgen]
pub fn set_segment_color(handle: usize, input: &str) -> Result<Option<String>, JsError> {
    with_session(handle, |s| Ok(s.set_segment_color(input).map(|c| c.to_string())))
}

#[wasm_bindgen]
pub fn clear_canvas(handle: usize) -> Result<(), JsError> {
    with_session(handle, |s| {
        s.clear();
        Ok(())
    })
}

/// Render the canvas, returning render commands as JSON.
#[wasm_bindgen]
pub fn render_canvas(handle: usize) -> Result<String, JsError> {
    with_session(handle, |s| serde_json::to_string(&s.render()).map_err(js_err))
}

#[wasm_bindgen]
pub fn save_canvas(handle: usize) -> Result<String, JsError> {
    with_session(handle, |s| s.to_json().map_err(js_err))
}

/// Replace the canvas with a saved document. A corrupt document leaves it untouched.
#[wasm_bindgen]
pub fn load_canvas(handle: usize, json: &str) -> Result<(), JsError> {
    with_session(handle, |s| s.load_json(json).map_err(js_err))
}

/// Parse a delimited trip sheet into a card board document (JSON).
#[wasm_bindgen]
pub fn import_trip_sheet(data: &[u8], now_ms: f64) -> Result<String, JsError> {
    let timelines = import_sheet(&DelimitedReader::default(), data).map_err(js_err)?;
    let now = DateTime::from_timestamp_millis(now_ms as i64)
        .ok_or_else(|| JsError::new("timestamp out of range"))?;
    let doc = tijdlijn_core::codec::serialize_cards(&timelines, now);
    tijdlijn_core::codec::cards::cards_to_json(&doc).map_err(js_err)
}

/// Lay out one timeline of a card board, returning render commands as JSON.
#[wasm_bindgen]
pub fn render_card_timeline(board_json: &str, index: usize, width: f64) -> Result<String, JsError> {
    let timelines = board(board_json)?;
    let timeline = timelines
        .get(index)
        .ok_or_else(|| JsError::new("invalid timeline index"))?;
    let content = render_timeline(
        timeline,
        index,
        CardLayoutMode::Wrap { width },
        &EditorConfig::default().card_metrics(),
    );
    serde_json::to_string(&content.commands).map_err(js_err)
}

/// Printable HTML for a card board. `now_ms` is the local wall clock in ms.
#[wasm_bindgen]
pub fn print_html(board_json: &str, horizontal: bool, now_ms: f64) -> Result<String, JsError> {
    let timelines = board(board_json)?;
    let layout = if horizontal {
        PrintLayout::Horizontal
    } else {
        PrintLayout::Vertical
    };
    let generated = DateTime::from_timestamp_millis(now_ms as i64)
        .ok_or_else(|| JsError::new("timestamp out of range"))?
        .naive_utc();
    Ok(PrintDocument::new(&timelines, layout, generated).to_html())
}
