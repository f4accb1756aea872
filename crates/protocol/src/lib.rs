pub mod color;
pub mod commands;
pub mod theme;
pub mod types;

pub use color::HexColor;
pub use commands::{RenderCommand, TextAlign};
pub use theme::ThemeToken;
pub use types::{Point, Rect, Size, Viewport};
