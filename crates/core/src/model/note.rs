use tijdlijn_protocol::Size;

/// Width of a sticky note; used to center new notes on the board.
pub const NOTE_WIDTH: f64 = 200.0;
pub const NOTE_HEIGHT: f64 = 90.0;
pub const NOTE_HANDLE_HEIGHT: f64 = 18.0;
pub const NOTE_PLACEHOLDER: &str = "Opmerking…";

/// A free-text annotation on the free canvas. Notes are not part of the
/// persisted document.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub text: String,
}

impl Note {
    pub fn size(&self) -> Size {
        Size::new(NOTE_WIDTH, NOTE_HEIGHT)
    }
}
