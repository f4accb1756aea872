//! Free-canvas document (version 5).
//!
//! Horizontal positions survive a board resize through `fx`, the fraction of
//! the board width, quantized into shared columns so nodes that were aligned
//! stay aligned. Vertical positions are stored as whole grid units relative
//! to the baseline (`dyUnits`); `dy` and the absolute `y` are fallbacks for
//! older documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tijdlijn_protocol::{HexColor, Size};

use super::CodecError;
use crate::grid::GridSize;
use crate::model::{NodeId, NodeKind, NodeRegistry};
use crate::segments::SegmentColors;

pub const CANVAS_DOCUMENT_VERSION: u32 = 5;

/// `fx` values closer than this share a column.
const COLUMN_QUANTUM: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDocument {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub grid: Option<f64>,
    #[serde(default)]
    pub timeline_y: Option<f64>,
    #[serde(default)]
    pub board_size: Option<BoardSize>,
    #[serde(default)]
    pub columns_fx: Option<Vec<f64>>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub segments: BTreeMap<String, HexColor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardSize {
    #[serde(default)]
    pub w: f64,
    #[serde(default)]
    pub h: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub fx: Option<f64>,
    #[serde(default)]
    pub dy: Option<f64>,
    #[serde(default)]
    pub dy_units: Option<i64>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub col: Option<usize>,
}

/// The live free-canvas state the codec reads from.
pub struct CanvasSnapshot<'a> {
    pub nodes: &'a NodeRegistry,
    pub board: Size,
    pub grid: GridSize,
    pub timeline_y: Option<f64>,
    pub colors: &'a SegmentColors,
}

fn column_key(fx: Option<f64>) -> i64 {
    let fx = fx.filter(|v| v.is_finite()).unwrap_or(0.0);
    (fx * COLUMN_QUANTUM).round() as i64
}

/// Capture live state as a portable document.
pub fn serialize_canvas(snapshot: &CanvasSnapshot<'_>) -> CanvasDocument {
    let w = snapshot.board.w;
    let g = snapshot.grid.px();

    let mut nodes: Vec<NodeRecord> = snapshot
        .nodes
        .iter()
        .enumerate()
        .map(|(order, node)| {
            let dy = snapshot.timeline_y.map(|base| node.y - base);
            NodeRecord {
                id: Some(node.id.0),
                kind: node.kind,
                x: node.x,
                y: node.y,
                fx: (w != 0.0 && w.is_finite()).then(|| node.x / w),
                dy,
                dy_units: dy.map(|d| (d / g).round() as i64),
                order: Some(order as i64),
                col: None,
            }
        })
        .collect();

    let mut keys: Vec<i64> = nodes.iter().map(|n| column_key(n.fx)).collect();
    keys.sort_unstable();
    keys.dedup();
    for node in &mut nodes {
        node.col = keys.binary_search(&column_key(node.fx)).ok();
    }

    CanvasDocument {
        version: CANVAS_DOCUMENT_VERSION,
        grid: Some(g),
        timeline_y: snapshot.timeline_y,
        board_size: Some(BoardSize {
            w,
            h: snapshot.board.h,
        }),
        columns_fx: Some(keys.iter().map(|&k| k as f64 / COLUMN_QUANTUM).collect()),
        nodes,
        segments: snapshot.colors.to_raw(),
    }
}

/// State rebuilt from a document for a particular board.
#[derive(Debug, Clone)]
pub struct RestoredCanvas {
    pub grid: GridSize,
    pub timeline_y: Option<f64>,
    pub colors: SegmentColors,
    pub nodes: NodeRegistry,
}

/// Place every record on a board of size `target`.
///
/// Positions are taken as computed: callers must not snap them, or
/// grid-aligned stacks from a differently sized board drift apart.
pub fn deserialize_canvas(doc: &CanvasDocument, target: Size) -> RestoredCanvas {
    let grid = doc
        .grid
        .and_then(GridSize::new)
        .unwrap_or_default();
    let g = grid.px();

    let (scale_x, scale_y) = match doc.board_size {
        Some(src) if src.w != 0.0 && src.h != 0.0 && src.w.is_finite() && src.h.is_finite() => {
            (target.w / src.w, target.h / src.h)
        }
        _ => (1.0, 1.0),
    };

    let columns = doc.columns_fx.as_deref();
    let base_y = doc.timeline_y.unwrap_or(0.0);

    let mut records: Vec<&NodeRecord> = doc.nodes.iter().collect();
    records.sort_by_key(|n| n.order.unwrap_or(0));

    let mut nodes = NodeRegistry::new();
    for rec in records {
        let column_fx = columns
            .zip(rec.col)
            .and_then(|(cols, col)| cols.get(col).copied())
            .filter(|v| v.is_finite());
        let x = match (column_fx, rec.fx.filter(|v| v.is_finite())) {
            (Some(fx), _) | (None, Some(fx)) => (fx * target.w).round(),
            (None, None) => (rec.x * scale_x).round(),
        };

        let y = match (rec.dy_units, rec.dy.filter(|v| v.is_finite()), doc.timeline_y) {
            (Some(units), _, _) => base_y + units as f64 * g,
            (None, Some(dy), Some(_)) => (base_y + dy * scale_y).round(),
            _ => (rec.y * scale_y).round(),
        };

        match rec.id {
            Some(id) => nodes.insert_with_id(NodeId(id), rec.kind, x, y),
            None => nodes.add(rec.kind, x, y),
        };
    }
    nodes.reseed();

    RestoredCanvas {
        grid,
        timeline_y: doc.timeline_y,
        colors: SegmentColors::from_raw(doc.segments.iter().map(|(k, v)| (k.as_str(), v))),
        nodes,
    }
}

pub fn canvas_to_json(doc: &CanvasDocument) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

pub fn canvas_from_json(json: &str) -> Result<CanvasDocument, CodecError> {
    if json.trim().is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(serde_json::from_str(json)?)
}
