use tijdlijn_protocol::{Point, Rect, RenderCommand, Size, TextAlign, ThemeToken};

use crate::model::Timeline;
use crate::views::cards::MIN_EXPORT_WIDTH;
use crate::views::{CardLayoutMode, CardMetrics, TimelineContent, render_timeline};

/// Landscape page in pixels.
pub const PAGE_WIDTH: f64 = 2480.0;
pub const PAGE_HEIGHT: f64 = 1754.0;
pub const PAGE_MARGIN: f64 = 80.0;
/// Band above the content reserved for the title.
pub const TITLE_BAND: f64 = 120.0;
const TITLE_BASELINE: f64 = 48.0;
const TITLE_FONT_SIZE: f64 = 42.0;
/// Content smaller than this in either direction is not worth a page.
const MIN_CONTENT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageOptions {
    /// Force every card onto one row instead of wrapping.
    pub one_row: bool,
    /// On-screen wrapper width, so the export wraps like the board does.
    pub wrapper_width: f64,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            one_row: false,
            wrapper_width: 1200.0,
        }
    }
}

impl PageOptions {
    pub fn page_size(&self) -> Size {
        Size::new(PAGE_WIDTH, PAGE_HEIGHT)
    }

    fn layout_mode(&self) -> CardLayoutMode {
        if self.one_row {
            CardLayoutMode::OneRow
        } else {
            let width = if self.wrapper_width.is_finite() {
                self.wrapper_width.floor()
            } else {
                0.0
            };
            CardLayoutMode::Wrap {
                width: width.max(MIN_EXPORT_WIDTH),
            }
        }
    }
}

/// One horizontal band of a timeline's content, printed on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    /// 1-based.
    pub number: usize,
    /// Top of the band in content pixels.
    pub y: f64,
    pub height: f64,
}

/// A timeline laid out at export width and cut into page-sized slices.
#[derive(Debug, Clone)]
pub struct PagePlan {
    pub index: usize,
    pub title: String,
    pub content: TimelineContent,
    /// Content to page pixels.
    pub scale: f64,
    /// Content pixels that fit under the title band.
    pub slice_height: f64,
}

/// `None` (with a warning) when the laid-out content is too small to print.
pub fn plan_timeline(
    timeline: &Timeline,
    index: usize,
    options: &PageOptions,
    metrics: &CardMetrics,
) -> Option<PagePlan> {
    let content = render_timeline(timeline, index, options.layout_mode(), metrics);
    let size = content.size;
    if size.w < MIN_CONTENT || size.h < MIN_CONTENT {
        tracing::warn!(
            timeline = index,
            width = size.w,
            height = size.h,
            "export skipped due to tiny size"
        );
        return None;
    }
    let scale = (PAGE_WIDTH - 2.0 * PAGE_MARGIN) / size.w;
    let usable = PAGE_HEIGHT - 2.0 * PAGE_MARGIN - TITLE_BAND;
    Some(PagePlan {
        index,
        title: page_title(timeline, index),
        content,
        scale,
        slice_height: usable / scale,
    })
}

/// The timeline's title, or `Tijdlijn N` when it is blank.
pub fn page_title(timeline: &Timeline, index: usize) -> String {
    let title = timeline.title.trim();
    if title.is_empty() {
        format!("Tijdlijn {}", index + 1)
    } else {
        title.to_string()
    }
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        (self.content.size.h / self.slice_height).ceil().max(1.0) as usize
    }

    pub fn slices(&self) -> Vec<PageSlice> {
        let total = self.content.size.h;
        (0..self.page_count())
            .map(|i| {
                let y = i as f64 * self.slice_height;
                PageSlice {
                    number: i + 1,
                    y,
                    height: self.slice_height.min(total - y),
                }
            })
            .collect()
    }

    /// `tijdlijn_01_p01.png`
    pub fn file_name(&self, slice: &PageSlice) -> String {
        format!("tijdlijn_{:02}_p{:02}.png", self.index + 1, slice.number)
    }

    /// White page, title, then the slice of content scaled into the body.
    pub fn page_commands(&self, slice: &PageSlice) -> Vec<RenderCommand> {
        let body_top = PAGE_MARGIN + TITLE_BAND;
        let body = Rect::new(
            PAGE_MARGIN,
            body_top,
            PAGE_WIDTH - 2.0 * PAGE_MARGIN,
            slice.height * self.scale,
        );
        let mut commands = Vec::with_capacity(self.content.commands.len() + 6);
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT),
            color: ThemeToken::PageBackground,
            border_color: None,
            label: None,
            node_id: None,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(PAGE_MARGIN, PAGE_MARGIN + TITLE_BASELINE),
            text: self.title.clone(),
            color: ThemeToken::PageTitle,
            font_size: TITLE_FONT_SIZE,
            align: TextAlign::Left,
        });
        commands.push(RenderCommand::SetClip { rect: body });
        commands.push(RenderCommand::PushTransform {
            translate: Point::new(PAGE_MARGIN, body_top - slice.y * self.scale),
            scale: Point::new(self.scale, self.scale),
        });
        commands.extend(self.content.commands.iter().cloned());
        commands.push(RenderCommand::PopTransform);
        commands.push(RenderCommand::ClearClip);
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Card;

    fn timeline_with(cards: usize) -> Timeline {
        Timeline::with_cards("Maandag", (1..=cards).map(Card::numbered).collect())
    }

    #[test]
    fn wide_board_fits_on_one_page() {
        let plan = plan_timeline(
            &Timeline::new(),
            0,
            &PageOptions::default(),
            &CardMetrics::default(),
        )
        .unwrap();
        // 4 columns: 4*220 + 3*24
        assert_eq!(plan.content.size, Size::new(952.0, 120.0));
        assert!((plan.scale - 2320.0 / 952.0).abs() < 1e-9);
        assert_eq!(plan.page_count(), 1);
        assert_eq!(plan.slices()[0].height, 120.0);
    }

    #[test]
    fn tall_content_is_sliced() {
        let options = PageOptions {
            one_row: false,
            wrapper_width: 100.0,
        };
        // narrow wrapper lays out at 320: one column, 40 rows
        let plan = plan_timeline(&timeline_with(40), 3, &options, &CardMetrics::default()).unwrap();
        assert_eq!(plan.content.size.w, 220.0);
        let scale = 2320.0 / 220.0;
        let slice = 1474.0 / scale;
        assert!((plan.slice_height - slice).abs() < 1e-9);
        let height = 40.0 * 120.0 + 39.0 * 24.0;
        assert_eq!(plan.page_count(), (height / slice).ceil() as usize);

        let slices = plan.slices();
        let last = slices.last().unwrap();
        assert!((last.y + last.height - height).abs() < 1e-6);
        assert_eq!(plan.file_name(last), format!("tijdlijn_04_p{:02}", slices.len()) + ".png");
    }

    #[test]
    fn one_row_export_uses_the_narrow_gap() {
        let options = PageOptions {
            one_row: true,
            wrapper_width: 300.0,
        };
        let plan = plan_timeline(&timeline_with(3), 0, &options, &CardMetrics::default()).unwrap();
        assert_eq!(plan.content.size, Size::new(700.0, 120.0));
    }

    #[test]
    fn empty_timeline_is_skipped() {
        let empty = Timeline::with_cards("leeg", Vec::new());
        assert!(plan_timeline(&empty, 0, &PageOptions::default(), &CardMetrics::default()).is_none());
    }

    #[test]
    fn blank_title_falls_back_to_position() {
        let t = Timeline::with_cards("   ", vec![Card::numbered(1)]);
        assert_eq!(page_title(&t, 1), "Tijdlijn 2");
    }

    #[test]
    fn page_places_the_slice_under_the_title() {
        let plan = plan_timeline(
            &Timeline::new(),
            0,
            &PageOptions::default(),
            &CardMetrics::default(),
        )
        .unwrap();
        let cmds = plan.page_commands(&plan.slices()[0]);
        assert!(matches!(
            &cmds[1],
            RenderCommand::DrawText { position, text, .. }
                if *position == Point::new(80.0, 128.0) && text == "Nieuwe tijdlijn"
        ));
        assert!(matches!(
            cmds[3],
            RenderCommand::PushTransform { translate, .. } if translate == Point::new(80.0, 200.0)
        ));
        assert!(matches!(cmds.last(), Some(RenderCommand::ClearClip)));
    }
}
