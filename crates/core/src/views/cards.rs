use serde::{Deserialize, Serialize};
use tijdlijn_protocol::{Point, Rect, RenderCommand, Size, TextAlign, ThemeToken};

use crate::model::{Card, Direction, Timeline};
use crate::routing::{ConnectorLayout, ElbowLayout};

/// Gap between cards when an export forces a single row.
pub const ONE_ROW_GAP: f64 = 20.0;
/// Narrowest wrapper an export lays the grid out for.
pub const MIN_EXPORT_WIDTH: f64 = 320.0;

const CARD_PADDING: f64 = 12.0;
const BADGE_SIZE: Size = Size { w: 44.0, h: 22.0 };
const HEADER_FONT_SIZE: f64 = 12.0;
const TITLE_FONT_SIZE: f64 = 15.0;
const BODY_FONT_SIZE: f64 = 13.0;

/// Fixed card box metrics in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardMetrics {
    pub width: f64,
    pub height: f64,
    pub gap: f64,
}

impl Default for CardMetrics {
    fn default() -> Self {
        Self {
            width: 220.0,
            height: 120.0,
            gap: 24.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardLayoutMode {
    /// Row-major grid wrapping at the wrapper width.
    Wrap { width: f64 },
    /// Every card on one row, as used by the one-row export.
    OneRow,
}

/// Columns that fit `width`; at least one.
pub fn grid_columns(width: f64, metrics: &CardMetrics) -> usize {
    let step = metrics.width + metrics.gap;
    if !(width.is_finite() && step > 0.0) {
        return 1;
    }
    ((width + metrics.gap) / step).floor().max(1.0) as usize
}

/// Card boxes in reading order, relative to the grid's top-left corner.
pub fn layout_cards(count: usize, mode: CardLayoutMode, metrics: &CardMetrics) -> Vec<Rect> {
    let (columns, gap) = match mode {
        CardLayoutMode::Wrap { width } => (grid_columns(width, metrics), metrics.gap),
        CardLayoutMode::OneRow => (count.max(1), ONE_ROW_GAP),
    };
    (0..count)
        .map(|i| {
            let (row, col) = (i / columns, i % columns);
            Rect::new(
                col as f64 * (metrics.width + gap),
                row as f64 * (metrics.height + gap),
                metrics.width,
                metrics.height,
            )
        })
        .collect()
}

/// Bounding size of a set of boxes anchored at the origin.
pub fn content_size(boxes: &[Rect]) -> Size {
    boxes.iter().fold(Size::new(0.0, 0.0), |acc, b| {
        Size::new(acc.w.max(b.right()), acc.h.max(b.bottom()))
    })
}

/// A timeline laid out for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineContent {
    pub boxes: Vec<Rect>,
    pub size: Size,
    pub commands: Vec<RenderCommand>,
}

/// Cards plus their elbow connectors, in grid-local coordinates.
pub fn render_timeline(
    timeline: &Timeline,
    index: usize,
    mode: CardLayoutMode,
    metrics: &CardMetrics,
) -> TimelineContent {
    let boxes = layout_cards(timeline.len(), mode, metrics);
    let mut commands = Vec::with_capacity(boxes.len() * 9 + 2);
    commands.push(RenderCommand::BeginGroup {
        id: format!("timeline-{index}"),
        label: Some(timeline.title.clone()),
    });
    for (card, rect) in timeline.cards().iter().zip(&boxes) {
        commands.extend(render_card(card, *rect));
    }
    commands.extend(ElbowLayout::new(&boxes).route());
    commands.push(RenderCommand::EndGroup);
    TimelineContent {
        size: content_size(&boxes),
        boxes,
        commands,
    }
}

fn render_card(card: &Card, rect: Rect) -> Vec<RenderCommand> {
    let style = card.kind.style();
    let badge = Rect::new(
        rect.right() - CARD_PADDING - BADGE_SIZE.w,
        rect.y + CARD_PADDING,
        BADGE_SIZE.w,
        BADGE_SIZE.h,
    );
    let badge_color = match card.direction {
        Direction::In => ThemeToken::BadgeIn,
        Direction::Out => ThemeToken::BadgeOut,
    };
    let left = rect.x + CARD_PADDING;
    let header_y = rect.y + CARD_PADDING + HEADER_FONT_SIZE + 4.0;
    let title_y = header_y + CARD_PADDING + TITLE_FONT_SIZE + 4.0;
    let body_y = title_y + BODY_FONT_SIZE + 8.0;

    let mut commands = vec![
        RenderCommand::DrawRect {
            rect,
            color: ThemeToken::CardBackground,
            border_color: Some(ThemeToken::CardBorder),
            label: None,
            node_id: None,
        },
        RenderCommand::DrawText {
            position: Point::new(left, header_y),
            text: format!("{} {}", style.glyph, style.label),
            color: style.color,
            font_size: HEADER_FONT_SIZE,
            align: TextAlign::Left,
        },
        RenderCommand::DrawRect {
            rect: badge,
            color: badge_color,
            border_color: None,
            label: Some(card.direction.label().to_string()),
            node_id: None,
        },
        RenderCommand::DrawText {
            position: Point::new(left, title_y),
            text: card.title.clone(),
            color: ThemeToken::TextPrimary,
            font_size: TITLE_FONT_SIZE,
            align: TextAlign::Left,
        },
    ];
    if !card.description.is_empty() {
        commands.push(RenderCommand::DrawText {
            position: Point::new(left, body_y),
            text: card.description.clone(),
            color: ThemeToken::TextMuted,
            font_size: BODY_FONT_SIZE,
            align: TextAlign::Left,
        });
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_fit_wrapper_width() {
        let m = CardMetrics::default();
        assert_eq!(grid_columns(100.0, &m), 1);
        assert_eq!(grid_columns(220.0, &m), 1);
        // 2 cards + 1 gap = 464
        assert_eq!(grid_columns(464.0, &m), 2);
        assert_eq!(grid_columns(463.0, &m), 1);
        assert_eq!(grid_columns(1000.0, &m), 4);
    }

    #[test]
    fn grid_wraps_row_major() {
        let m = CardMetrics::default();
        let boxes = layout_cards(5, CardLayoutMode::Wrap { width: 732.0 }, &m);
        assert_eq!(boxes.len(), 5);
        assert_eq!(boxes[2], Rect::new(488.0, 0.0, 220.0, 120.0));
        assert_eq!(boxes[3], Rect::new(0.0, 144.0, 220.0, 120.0));
        assert_eq!(content_size(&boxes), Size::new(708.0, 264.0));
    }

    #[test]
    fn one_row_keeps_every_card_on_the_same_row() {
        let m = CardMetrics::default();
        let boxes = layout_cards(6, CardLayoutMode::OneRow, &m);
        assert!(boxes.iter().all(|b| b.y == 0.0));
        assert_eq!(boxes[1].x, 240.0);
    }

    #[test]
    fn timeline_content_routes_wrapped_connectors() {
        let timeline = Timeline::new();
        let m = CardMetrics::default();
        let content = render_timeline(&timeline, 0, CardLayoutMode::Wrap { width: 500.0 }, &m);
        let elbows = content
            .commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawPolyline { .. }))
            .count();
        assert_eq!(elbows, 3);
        assert_eq!(content.size, Size::new(464.0, 264.0));
        assert!(matches!(content.commands.first(), Some(RenderCommand::BeginGroup { id, .. }) if id == "timeline-0"));
    }
}
