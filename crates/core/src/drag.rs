//! Modal pointer-drag sessions.

use tijdlijn_protocol::{Point, Size};

use crate::grid::GridSize;
use crate::model::NodeId;

/// The thing a drag moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Node(NodeId),
    Note(u64),
    Baseline,
}

/// Captured on pointer-down: where the pointer and the target started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub target: DragTarget,
    pub start_pointer: Point,
    pub start_pos: Point,
}

impl DragSession {
    /// Start position moved by the pointer delta.
    pub fn moved_to(&self, pointer: Point) -> Point {
        Point::new(
            self.start_pos.x + (pointer.x - self.start_pointer.x),
            self.start_pos.y + (pointer.y - self.start_pointer.y),
        )
    }
}

/// Holds at most one active drag. Pointer-up ends it exactly once.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    active: Option<DragSession>,
}

impl DragController {
    /// Begin a drag. Refused (returns false) while another drag is active.
    pub fn begin(&mut self, target: DragTarget, pointer: Point, start_pos: Point) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(DragSession {
            target,
            start_pointer: pointer,
            start_pos,
        });
        true
    }

    pub fn active(&self) -> Option<&DragSession> {
        self.active.as_ref()
    }

    /// Finish the drag. A second call returns `None`.
    pub fn end(&mut self) -> Option<DragSession> {
        self.active.take()
    }

    /// Forget a drag whose target disappeared mid-gesture.
    pub fn cancel_if(&mut self, target: DragTarget) {
        if self.active.is_some_and(|s| s.target == target) {
            self.active = None;
        }
    }
}

/// Snap (optionally) and keep a box of `size` fully inside `board`.
pub fn place_in_board(pos: Point, size: Size, board: Size, snap: Option<GridSize>) -> Point {
    let (mut x, mut y) = (pos.x, pos.y);
    if let Some(grid) = snap {
        x = grid.snap(x);
        y = grid.snap(y);
    }
    let max_x = (board.w - size.w).max(0.0);
    let max_y = (board.h - size.h).max(0.0);
    Point::new(x.clamp(0.0, max_x), y.clamp(0.0, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused() {
        let mut drags = DragController::default();
        assert!(drags.begin(DragTarget::Node(NodeId(1)), Point::new(0.0, 0.0), Point::new(5.0, 5.0)));
        assert!(!drags.begin(DragTarget::Node(NodeId(1)), Point::new(1.0, 1.0), Point::new(5.0, 5.0)));
        assert!(!drags.begin(DragTarget::Baseline, Point::new(1.0, 1.0), Point::new(0.0, 0.0)));
    }

    #[test]
    fn end_is_one_shot() {
        let mut drags = DragController::default();
        drags.begin(DragTarget::Baseline, Point::new(0.0, 0.0), Point::new(0.0, 300.0));
        assert!(drags.end().is_some());
        assert!(drags.end().is_none());
    }

    #[test]
    fn session_applies_pointer_delta() {
        let session = DragSession {
            target: DragTarget::Note(1),
            start_pointer: Point::new(100.0, 100.0),
            start_pos: Point::new(40.0, 60.0),
        };
        assert_eq!(session.moved_to(Point::new(130.0, 90.0)), Point::new(70.0, 50.0));
    }

    #[test]
    fn placement_clamps_inside_board() {
        let board = Size::new(400.0, 300.0);
        let node = Size::new(54.0, 54.0);
        assert_eq!(
            place_in_board(Point::new(-30.0, 500.0), node, board, None),
            Point::new(0.0, 246.0)
        );
        assert_eq!(
            place_in_board(Point::new(33.0, 47.0), node, board, Some(GridSize::default())),
            Point::new(40.0, 40.0)
        );
    }
}
