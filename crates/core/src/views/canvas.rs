use tijdlijn_protocol::{Point, Rect, RenderCommand, Size, TextAlign, ThemeToken};

use crate::model::note::NOTE_HANDLE_HEIGHT;
use crate::model::{NodeMetrics, NodeRegistry, Note, note::NOTE_PLACEHOLDER};
use crate::routing::{BaselineLayout, ConnectorLayout};
use crate::segments::SegmentColors;
use crate::selection::Selection;

const GLYPH_FONT_SIZE: f64 = 22.0;
const NOTE_FONT_SIZE: f64 = 13.0;
const NOTE_PADDING: f64 = 8.0;

/// Everything the free canvas projection reads. Borrowed from the session.
pub struct CanvasScene<'a> {
    pub board: Size,
    pub nodes: &'a NodeRegistry,
    pub metrics: &'a dyn NodeMetrics,
    /// Resolved baseline; `None` draws no overlay.
    pub timeline_y: Option<f64>,
    pub colors: &'a SegmentColors,
    pub selection: &'a Selection,
    pub notes: &'a [Note],
}

/// Render the free canvas: background, baseline overlay, nodes, then notes
/// on top.
pub fn render_canvas(scene: &CanvasScene<'_>) -> Vec<RenderCommand> {
    let mut commands = Vec::with_capacity(scene.nodes.len() * 8 + scene.notes.len() * 3 + 4);

    commands.push(RenderCommand::BeginGroup {
        id: "canvas".to_string(),
        label: Some("Canvas".to_string()),
    });
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, scene.board.w, scene.board.h),
        color: ThemeToken::Background,
        border_color: Some(ThemeToken::Border),
        label: None,
        node_id: None,
    });

    let sorted = scene.nodes.sorted_by_x(scene.metrics);
    if let Some(y) = scene.timeline_y {
        commands.extend(
            BaselineLayout::new(&sorted, y, scene.colors)
                .with_selection(scene.selection.segment())
                .route(),
        );
    }

    // Insertion order is the DOM order; later nodes paint over earlier ones.
    for node in scene.nodes.iter() {
        let style = node.kind.style();
        let size = scene.metrics.node_size(node.kind);
        let rect = Rect::new(node.x, node.y, size.w, size.h);
        let border = if scene.selection.is_selected(node.id) {
            ThemeToken::SelectionHighlight
        } else {
            ThemeToken::Border
        };
        commands.push(RenderCommand::DrawRect {
            rect,
            color: style.color,
            border_color: Some(border),
            label: Some(style.label.to_string()),
            node_id: Some(node.id.0),
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(rect.center().x, rect.center().y + GLYPH_FONT_SIZE / 3.0),
            text: style.glyph.to_string(),
            color: ThemeToken::TextPrimary,
            font_size: GLYPH_FONT_SIZE,
            align: TextAlign::Center,
        });
    }

    for note in scene.notes {
        commands.extend(render_note(note));
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

fn render_note(note: &Note) -> [RenderCommand; 3] {
    let size = note.size();
    let text = if note.text.trim().is_empty() {
        NOTE_PLACEHOLDER.to_string()
    } else {
        note.text.clone()
    };
    [
        RenderCommand::DrawRect {
            rect: Rect::new(note.x, note.y, size.w, size.h),
            color: ThemeToken::NoteBackground,
            border_color: Some(ThemeToken::Border),
            label: None,
            node_id: None,
        },
        RenderCommand::DrawRect {
            rect: Rect::new(note.x, note.y, size.w, NOTE_HANDLE_HEIGHT),
            color: ThemeToken::NoteHandle,
            border_color: None,
            label: None,
            node_id: None,
        },
        RenderCommand::DrawText {
            position: Point::new(
                note.x + NOTE_PADDING,
                note.y + NOTE_HANDLE_HEIGHT + NOTE_PADDING + NOTE_FONT_SIZE,
            ),
            text,
            color: ThemeToken::TextPrimary,
            font_size: NOTE_FONT_SIZE,
            align: TextAlign::Left,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeKind, TableMetrics};

    fn scene_parts() -> (NodeRegistry, SegmentColors, Selection) {
        let mut nodes = NodeRegistry::new();
        nodes.add(NodeKind::Prikklok, 100.0, 100.0);
        nodes.add(NodeKind::Voertuig, 300.0, 140.0);
        (nodes, SegmentColors::new(), Selection::default())
    }

    #[test]
    fn nodes_carry_their_ids() {
        let (nodes, colors, selection) = scene_parts();
        let scene = CanvasScene {
            board: Size::new(800.0, 400.0),
            nodes: &nodes,
            metrics: &TableMetrics,
            timeline_y: Some(160.0),
            colors: &colors,
            selection: &selection,
            notes: &[],
        };
        let ids: Vec<u64> = render_canvas(&scene)
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect { node_id, .. } => *node_id,
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn no_overlay_without_baseline() {
        let (nodes, colors, selection) = scene_parts();
        let scene = CanvasScene {
            board: Size::new(800.0, 400.0),
            nodes: &nodes,
            metrics: &TableMetrics,
            timeline_y: None,
            colors: &colors,
            selection: &selection,
            notes: &[],
        };
        let cmds = render_canvas(&scene);
        assert!(!cmds.iter().any(|c| matches!(c, RenderCommand::DrawSegment { .. })));
    }

    #[test]
    fn selected_node_is_highlighted_and_empty_note_shows_placeholder() {
        let (nodes, colors, mut selection) = scene_parts();
        selection.select(crate::model::NodeId(2));
        let notes = [Note {
            id: 1,
            x: 0.0,
            y: 0.0,
            text: String::new(),
        }];
        let scene = CanvasScene {
            board: Size::new(800.0, 400.0),
            nodes: &nodes,
            metrics: &TableMetrics,
            timeline_y: Some(160.0),
            colors: &colors,
            selection: &selection,
            notes: &notes,
        };
        let cmds = render_canvas(&scene);
        assert!(cmds.iter().any(|c| matches!(
            c,
            RenderCommand::DrawRect { node_id: Some(2), border_color: Some(ThemeToken::SelectionHighlight), .. }
        )));
        assert!(cmds.iter().any(|c| matches!(
            c,
            RenderCommand::DrawText { text, .. } if text == NOTE_PLACEHOLDER
        )));
    }
}
