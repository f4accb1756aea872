use serde::{Deserialize, Serialize};

use crate::color::HexColor;
use crate::theme::ThemeToken;
use crate::types::{Point, Rect, Size};

/// One drawing step of a timeline scene.
///
/// The core emits a `Vec<RenderCommand>` for each canvas. Renderers consume
/// this list sequentially; each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Size the backing surface. `pixel_*` is the device buffer, `css` the
    /// logical size all following coordinates are expressed in.
    ResizeSurface {
        css: Size,
        pixel_width: u32,
        pixel_height: u32,
    },

    /// Clear a region of the surface to transparent.
    Clear { rect: Rect },

    /// Draw a filled rectangle, optionally with a text label and the id of
    /// the node it represents (for hit-testing / selection).
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        label: Option<String>,
        node_id: Option<u64>,
    },

    /// Text anchored at `position` (baseline), aligned per `align`.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment in a theme color.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Draw an open polyline with round caps and joins.
    DrawPolyline {
        points: Vec<Point>,
        color: ThemeToken,
        width: f64,
    },

    /// Draw a user-colored connector segment identified by its segment key.
    DrawSegment {
        from: Point,
        to: Point,
        key: String,
        color: HexColor,
        width: f64,
    },

    /// An invisible, wide stroke that only exists for pointer hit-testing.
    HitLine {
        from: Point,
        to: Point,
        key: String,
        width: f64,
    },

    /// Clip everything up to the next `ClearClip` to `rect`.
    SetClip { rect: Rect },

    ClearClip,

    /// Translate then scale every command up to the matching `PopTransform`.
    PushTransform { translate: Point, scale: Point },

    PopTransform,

    /// Open a named group, one per card timeline. SVG output keeps it as `<g id>`.
    BeginGroup { id: String, label: Option<String> },

    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
