use std::f64::consts::FRAC_PI_2;
use std::f64::consts::PI;

use tijdlijn_protocol::{Point, Rect, RenderCommand, ThemeToken};

use super::{ConnectorLayout, LayoutStrategy};

pub const CONNECTOR_WIDTH: f64 = 2.0;
/// Arrowhead stroke reach along the approach direction.
pub const ARROW_SIZE: f64 = 6.0;
/// Two cards share a row when their centers are closer than this fraction
/// of the smaller card height.
pub const SAME_ROW_FACTOR: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElbowKind {
    /// Horizontal elbow into the next card's left edge.
    SameRow,
    /// Vertical elbow into the top of the first card of the next row.
    Wrapped,
}

/// Orthogonal connector between two consecutive cards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elbow {
    pub kind: ElbowKind,
    pub path: [Point; 4],
    pub arrow: [(Point, Point); 2],
}

pub fn is_same_row(a: &Rect, b: &Rect) -> bool {
    (a.center().y - b.center().y).abs() < a.h.min(b.h) * SAME_ROW_FACTOR
}

/// Route from card `a` to card `b`.
pub fn elbow_between(a: &Rect, b: &Rect) -> Elbow {
    if is_same_row(a, b) {
        let start = Point::new(a.right(), a.center().y);
        let end = Point::new(b.x, b.center().y);
        let mid_x = (start.x + end.x) / 2.0;
        Elbow {
            kind: ElbowKind::SameRow,
            path: [
                start,
                Point::new(mid_x, start.y),
                Point::new(mid_x, end.y),
                end,
            ],
            arrow: arrowhead(end, PI),
        }
    } else {
        let start = Point::new(a.center().x, a.bottom());
        let end = Point::new(b.center().x, b.y);
        let mid_y = (start.y + end.y) / 2.0;
        Elbow {
            kind: ElbowKind::Wrapped,
            path: [
                start,
                Point::new(start.x, mid_y),
                Point::new(end.x, mid_y),
                end,
            ],
            arrow: arrowhead(end, FRAC_PI_2),
        }
    }
}

/// Two short strokes from `tip`, i.e. the local offsets `(-s, ∓s/2)`
/// rotated by `angle`.
pub fn arrowhead(tip: Point, angle: f64) -> [(Point, Point); 2] {
    let (sin, cos) = angle.sin_cos();
    let rotate = |dx: f64, dy: f64| Point::new(tip.x + dx * cos - dy * sin, tip.y + dx * sin + dy * cos);
    [
        (tip, rotate(-ARROW_SIZE, -ARROW_SIZE / 2.0)),
        (tip, rotate(-ARROW_SIZE, ARROW_SIZE / 2.0)),
    ]
}

/// Card-grid routing over card boxes in reading order (wrapper-local CSS px).
pub struct ElbowLayout<'a> {
    boxes: &'a [Rect],
}

impl<'a> ElbowLayout<'a> {
    pub fn new(boxes: &'a [Rect]) -> Self {
        Self { boxes }
    }

    pub fn elbows(&self) -> Vec<Elbow> {
        self.boxes
            .windows(2)
            .map(|pair| elbow_between(&pair[0], &pair[1]))
            .collect()
    }
}

impl ConnectorLayout for ElbowLayout<'_> {
    fn strategy(&self) -> LayoutStrategy {
        LayoutStrategy::CardGrid
    }

    fn route(&self) -> Vec<RenderCommand> {
        if self.boxes.len() < 2 {
            return Vec::new();
        }
        let mut commands = Vec::with_capacity(self.boxes.len() * 3);
        for elbow in self.elbows() {
            if !elbow.path.iter().all(Point::is_finite) {
                continue;
            }
            commands.push(RenderCommand::DrawPolyline {
                points: elbow.path.to_vec(),
                color: ThemeToken::Connector,
                width: CONNECTOR_WIDTH,
            });
            for (from, to) in elbow.arrow {
                commands.push(RenderCommand::DrawLine {
                    from,
                    to,
                    color: ThemeToken::Connector,
                    width: CONNECTOR_WIDTH,
                });
            }
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn same_row_threshold() {
        let a = Rect::new(0.0, 0.0, 200.0, 100.0);
        let near = Rect::new(250.0, -5.0, 200.0, 120.0);
        // centers: 50 vs 55 → Δ5 < 60
        assert!(is_same_row(&a, &near));
        let far = Rect::new(250.0, 20.0, 200.0, 180.0);
        // centers: 50 vs 110 → Δ60, not below 60
        assert!(!is_same_row(&a, &far));
        let wrapped = Rect::new(0.0, 70.0, 200.0, 120.0);
        // centers: 50 vs 130 → Δ80
        assert!(!is_same_row(&a, &wrapped));
    }

    #[test]
    fn horizontal_elbow_path() {
        let a = Rect::new(0.0, 0.0, 200.0, 100.0);
        let b = Rect::new(240.0, 10.0, 200.0, 100.0);
        let elbow = elbow_between(&a, &b);
        assert_eq!(elbow.kind, ElbowKind::SameRow);
        assert_eq!(
            elbow.path,
            [
                Point::new(200.0, 50.0),
                Point::new(220.0, 50.0),
                Point::new(220.0, 60.0),
                Point::new(240.0, 60.0),
            ]
        );
        // Leftward arrowhead: strokes fan out to the right of the entry point.
        assert!(close(elbow.arrow[0].1, Point::new(246.0, 63.0)));
        assert!(close(elbow.arrow[1].1, Point::new(246.0, 57.0)));
    }

    #[test]
    fn wrapped_elbow_path() {
        let a = Rect::new(240.0, 0.0, 200.0, 100.0);
        let b = Rect::new(0.0, 140.0, 200.0, 100.0);
        let elbow = elbow_between(&a, &b);
        assert_eq!(elbow.kind, ElbowKind::Wrapped);
        assert_eq!(
            elbow.path,
            [
                Point::new(340.0, 100.0),
                Point::new(340.0, 120.0),
                Point::new(100.0, 120.0),
                Point::new(100.0, 140.0),
            ]
        );
        // Downward arrowhead: strokes rise above the tip.
        assert!(close(elbow.arrow[0].1, Point::new(103.0, 134.0)));
        assert!(close(elbow.arrow[1].1, Point::new(97.0, 134.0)));
    }

    #[test]
    fn single_card_routes_nothing() {
        let boxes = [Rect::new(0.0, 0.0, 10.0, 10.0)];
        assert!(ElbowLayout::new(&boxes).route().is_empty());
    }

    #[test]
    fn each_pair_gets_path_and_two_arrow_strokes() {
        let boxes = [
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Rect::new(240.0, 0.0, 200.0, 100.0),
            Rect::new(0.0, 140.0, 200.0, 100.0),
        ];
        let cmds = ElbowLayout::new(&boxes).route();
        let polylines = cmds
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawPolyline { .. }))
            .count();
        assert_eq!(polylines, 2);
        assert_eq!(cmds.len(), 6);
    }
}
