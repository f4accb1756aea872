use tijdlijn_protocol::{Point, RenderCommand, ThemeToken};

use super::{ConnectorLayout, LayoutStrategy};
use crate::model::PlacedNode;
use crate::segments::{SegmentColors, SegmentKey, segment_keys};

/// Half the length of the perpendicular tick drawn per node.
pub const TICK_HALF_LENGTH: f64 = 14.0;
pub const BASELINE_WIDTH: f64 = 2.0;
pub const TICK_WIDTH: f64 = 2.0;
pub const SEGMENT_WIDTH: f64 = 3.0;
pub const HALO_WIDTH: f64 = 10.0;
/// Width of the invisible stroke that makes segments easy to click.
pub const HIT_WIDTH: f64 = 18.0;

/// Free-canvas routing: baseline, ticks and one colored segment per
/// x-adjacent node pair.
pub struct BaselineLayout<'a> {
    sorted: &'a [PlacedNode<'a>],
    timeline_y: f64,
    colors: &'a SegmentColors,
    selected: Option<SegmentKey>,
}

impl<'a> BaselineLayout<'a> {
    /// `sorted` must be ordered by center-x.
    pub fn new(sorted: &'a [PlacedNode<'a>], timeline_y: f64, colors: &'a SegmentColors) -> Self {
        Self {
            sorted,
            timeline_y,
            colors,
            selected: None,
        }
    }

    pub fn with_selection(mut self, selected: Option<SegmentKey>) -> Self {
        self.selected = selected;
        self
    }
}

impl ConnectorLayout for BaselineLayout<'_> {
    fn strategy(&self) -> LayoutStrategy {
        LayoutStrategy::FreeCanvas
    }

    fn route(&self) -> Vec<RenderCommand> {
        let y = self.timeline_y;
        if self.sorted.len() < 2 || !y.is_finite() {
            return Vec::new();
        }

        let min_x = self
            .sorted
            .iter()
            .map(|p| p.center.x)
            .fold(f64::INFINITY, f64::min);
        let max_x = self
            .sorted
            .iter()
            .map(|p| p.center.x)
            .fold(f64::NEG_INFINITY, f64::max);
        if !(min_x.is_finite() && max_x.is_finite()) {
            return Vec::new();
        }

        let mut commands = Vec::with_capacity(self.sorted.len() * 5 + 3);
        commands.push(RenderCommand::BeginGroup {
            id: "baseline".into(),
            label: Some("Timeline".into()),
        });

        commands.push(RenderCommand::DrawLine {
            from: Point::new(min_x, y),
            to: Point::new(max_x, y),
            color: ThemeToken::TimelineLine,
            width: BASELINE_WIDTH,
        });

        for p in self.sorted {
            commands.push(RenderCommand::DrawLine {
                from: Point::new(p.center.x, y - TICK_HALF_LENGTH),
                to: Point::new(p.center.x, y + TICK_HALF_LENGTH),
                color: ThemeToken::TimelineTick,
                width: TICK_WIDTH,
            });
        }

        for (pair, key) in self.sorted.windows(2).zip(segment_keys(self.sorted)) {
            let from = Point::new(pair[0].center.x, y);
            let to = Point::new(pair[1].center.x, y);
            let key_str = key.to_string();

            // Hit stroke and halo sit underneath the visible segment.
            commands.push(RenderCommand::HitLine {
                from,
                to,
                key: key_str.clone(),
                width: HIT_WIDTH,
            });
            if self.selected == Some(key) {
                commands.push(RenderCommand::DrawLine {
                    from,
                    to,
                    color: ThemeToken::SegmentHalo,
                    width: HALO_WIDTH,
                });
            }
            commands.push(RenderCommand::DrawSegment {
                from,
                to,
                key: key_str,
                color: self.colors.get(&key),
                width: SEGMENT_WIDTH,
            });
        }

        commands.push(RenderCommand::EndGroup);
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeId, NodeKind, NodeRegistry, TableMetrics};

    fn three_nodes() -> NodeRegistry {
        let mut reg = NodeRegistry::new();
        reg.insert_with_id(NodeId(7), NodeKind::Prikklok, 100.0, 50.0);
        reg.insert_with_id(NodeId(3), NodeKind::Voertuig, 0.0, 80.0);
        reg.insert_with_id(NodeId(9), NodeKind::Werf, 200.0, 20.0);
        reg
    }

    #[test]
    fn baseline_spans_extreme_centers() {
        let reg = three_nodes();
        let sorted = reg.sorted_by_x(&TableMetrics);
        let colors = SegmentColors::new();
        let cmds = BaselineLayout::new(&sorted, 300.0, &colors).route();
        let first_line = cmds.iter().find_map(|c| match c {
            RenderCommand::DrawLine { from, to, color: ThemeToken::TimelineLine, .. } => Some((*from, *to)),
            _ => None,
        });
        assert_eq!(
            first_line,
            Some((Point::new(27.0, 300.0), Point::new(227.0, 300.0)))
        );
    }

    #[test]
    fn one_tick_per_node_28px_long() {
        let reg = three_nodes();
        let sorted = reg.sorted_by_x(&TableMetrics);
        let colors = SegmentColors::new();
        let cmds = BaselineLayout::new(&sorted, 300.0, &colors).route();
        let ticks: Vec<f64> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawLine { from, to, color: ThemeToken::TimelineTick, .. } => Some(to.y - from.y),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![28.0, 28.0, 28.0]);
    }

    #[test]
    fn segments_use_sorted_keys_and_colors() {
        let reg = three_nodes();
        let sorted = reg.sorted_by_x(&TableMetrics);
        let mut colors = SegmentColors::new();
        colors.set(SegmentKey::new(NodeId(7), NodeId(9)), "#0F0");
        let cmds = BaselineLayout::new(&sorted, 300.0, &colors).route();
        let segs: Vec<(String, String)> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawSegment { key, color, .. } => Some((key.clone(), color.to_string())),
                _ => None,
            })
            .collect();
        assert_eq!(
            segs,
            vec![
                ("3->7".to_string(), "#000000".to_string()),
                ("7->9".to_string(), "#00ff00".to_string()),
            ]
        );
    }

    #[test]
    fn selected_segment_gets_halo_beneath() {
        let reg = three_nodes();
        let sorted = reg.sorted_by_x(&TableMetrics);
        let colors = SegmentColors::new();
        let key = SegmentKey::new(NodeId(3), NodeId(7));
        let cmds = BaselineLayout::new(&sorted, 300.0, &colors)
            .with_selection(Some(key))
            .route();
        let halo = cmds.iter().position(|c| {
            matches!(c, RenderCommand::DrawLine { color: ThemeToken::SegmentHalo, .. })
        });
        let visible = cmds.iter().position(|c| {
            matches!(c, RenderCommand::DrawSegment { key, .. } if key == "3->7")
        });
        let hit = cmds.iter().position(|c| {
            matches!(c, RenderCommand::HitLine { key, width, .. } if key == "3->7" && *width == HIT_WIDTH)
        });
        assert!(hit < halo && halo < visible, "{hit:?} {halo:?} {visible:?}");
    }

    #[test]
    fn fewer_than_two_nodes_draws_nothing() {
        let mut reg = NodeRegistry::new();
        reg.add(NodeKind::Huis, 0.0, 0.0);
        let sorted = reg.sorted_by_x(&TableMetrics);
        let colors = SegmentColors::new();
        assert!(BaselineLayout::new(&sorted, 300.0, &colors).route().is_empty());
    }
}
