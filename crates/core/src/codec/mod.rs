//! Portable JSON documents for both editors.

pub mod canvas;
pub mod cards;

use thiserror::Error;

pub use canvas::{
    BoardSize, CANVAS_DOCUMENT_VERSION, CanvasDocument, CanvasSnapshot, NodeRecord, RestoredCanvas,
    deserialize_canvas, serialize_canvas,
};
pub use cards::{
    CARDS_DOCUMENT_VERSION, CARDS_STORAGE_KEY, CardRecord, CardsDocument, TimelineRecord,
    deserialize_cards, serialize_cards,
};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("document is empty")]
    Empty,
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}
