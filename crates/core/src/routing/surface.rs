use tijdlijn_protocol::{Point, Rect, RenderCommand, Size};

use super::{ConnectorLayout, ElbowLayout};

/// Wrappers smaller than this (in either direction) are treated as hidden.
pub const MIN_WRAPPER_PX: f64 = 2.0;

/// A high-DPI overlay surface sized to its wrapper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub css: Size,
    pub dpr: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl Surface {
    /// `None` when the wrapper is hidden or collapsed.
    pub fn for_wrapper(wrapper: Size, device_pixel_ratio: f64) -> Option<Self> {
        if !(wrapper.w.is_finite() && wrapper.h.is_finite())
            || wrapper.w < MIN_WRAPPER_PX
            || wrapper.h < MIN_WRAPPER_PX
        {
            return None;
        }
        let dpr = if device_pixel_ratio.is_finite() {
            device_pixel_ratio.floor().max(1.0)
        } else {
            1.0
        };
        let css = Size::new(wrapper.w.floor(), wrapper.h.floor());
        Some(Self {
            css,
            dpr,
            pixel_width: (css.w * dpr).floor().max(1.0) as u32,
            pixel_height: (css.h * dpr).floor().max(1.0) as u32,
        })
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.css.w, self.css.h)
    }

    /// Resize, enter CSS-pixel space and clear. Callers close with
    /// [`Surface::epilogue`].
    pub fn prologue(&self) -> Vec<RenderCommand> {
        vec![
            RenderCommand::ResizeSurface {
                css: self.css,
                pixel_width: self.pixel_width,
                pixel_height: self.pixel_height,
            },
            RenderCommand::PushTransform {
                translate: Point::new(0.0, 0.0),
                scale: Point::new(self.dpr, self.dpr),
            },
            RenderCommand::Clear { rect: self.bounds() },
        ]
    }

    pub fn epilogue(&self) -> RenderCommand {
        RenderCommand::PopTransform
    }
}

/// Redraw one timeline's connector overlay. `boxes` are card rectangles
/// relative to the wrapper, in reading order.
pub fn draw_card_connectors(wrapper: Size, device_pixel_ratio: f64, boxes: &[Rect]) -> Vec<RenderCommand> {
    let Some(surface) = Surface::for_wrapper(wrapper, device_pixel_ratio) else {
        return Vec::new();
    };
    let mut commands = surface.prologue();
    commands.extend(ElbowLayout::new(boxes).route());
    commands.push(surface.epilogue());
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_wrapper_is_noop() {
        assert!(Surface::for_wrapper(Size::new(0.0, 300.0), 2.0).is_none());
        assert!(Surface::for_wrapper(Size::new(800.0, 1.5), 2.0).is_none());
        assert!(draw_card_connectors(Size::new(0.0, 0.0), 1.0, &[]).is_empty());
    }

    #[test]
    fn dpr_floors_with_minimum_one() {
        let s = Surface::for_wrapper(Size::new(300.7, 100.2), 2.6).unwrap();
        assert_eq!(s.dpr, 2.0);
        assert_eq!(s.css, Size::new(300.0, 100.0));
        assert_eq!((s.pixel_width, s.pixel_height), (600, 200));

        let s = Surface::for_wrapper(Size::new(10.0, 10.0), 0.5).unwrap();
        assert_eq!(s.dpr, 1.0);
    }

    #[test]
    fn single_card_only_clears() {
        let boxes = [Rect::new(0.0, 0.0, 200.0, 100.0)];
        let cmds = draw_card_connectors(Size::new(400.0, 200.0), 1.0, &boxes);
        assert!(cmds.iter().any(|c| matches!(c, RenderCommand::Clear { .. })));
        assert!(!cmds.iter().any(|c| matches!(c, RenderCommand::DrawPolyline { .. })));
    }

    #[test]
    fn connectors_are_drawn_under_dpr_transform() {
        let boxes = [Rect::new(0.0, 0.0, 200.0, 100.0), Rect::new(240.0, 0.0, 200.0, 100.0)];
        let cmds = draw_card_connectors(Size::new(500.0, 200.0), 2.0, &boxes);
        assert!(matches!(
            cmds[1],
            RenderCommand::PushTransform { scale, .. } if scale == Point::new(2.0, 2.0)
        ));
        assert!(matches!(cmds.last(), Some(RenderCommand::PopTransform)));
        assert!(cmds.iter().any(|c| matches!(c, RenderCommand::DrawPolyline { .. })));
    }
}
