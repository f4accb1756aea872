use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};
use tijdlijn_protocol::{HexColor, Point, RenderCommand, ThemeToken};

/// CSS pixels per terminal cell.
const CELL_W: f64 = 8.0;
const CELL_H: f64 = 16.0;
const SCROLL_STEP: i32 = 4;

/// One screenful of render commands with a caption.
pub struct PreviewPage {
    pub title: String,
    pub commands: Vec<RenderCommand>,
}

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Background | ThemeToken::PageBackground => Color::Black,
        ThemeToken::Surface | ThemeToken::CardBackground => Color::Rgb(24, 24, 24),
        ThemeToken::Border | ThemeToken::CardBorder => Color::DarkGray,
        ThemeToken::GridDot => Color::Rgb(40, 40, 40),
        ThemeToken::TextPrimary | ThemeToken::PageTitle => Color::White,
        ThemeToken::TextSecondary => Color::Gray,
        ThemeToken::TextMuted => Color::DarkGray,
        ThemeToken::TimelineLine | ThemeToken::TimelineTick | ThemeToken::Connector => Color::Gray,
        ThemeToken::SegmentHalo => Color::LightYellow,
        ThemeToken::SelectionHighlight => Color::Green,
        ThemeToken::NodePrikklok => Color::Red,
        ThemeToken::NodeVoertuig => Color::Blue,
        ThemeToken::NodeWerf => Color::Yellow,
        ThemeToken::NodeHuis => Color::Green,
        ThemeToken::NodeBedrijf => Color::Magenta,
        ThemeToken::NoteBackground => Color::Rgb(70, 65, 30),
        ThemeToken::NoteHandle => Color::Rgb(110, 100, 45),
        ThemeToken::BadgeIn => Color::LightGreen,
        ThemeToken::BadgeOut => Color::LightRed,
    }
}

fn hex_to_color(hex: &HexColor) -> Color {
    let (r, g, b) = hex.to_rgb();
    Color::Rgb(r, g, b)
}

/// Maps CSS pixels to cells, honouring pushed transforms.
struct CellMapper {
    stack: Vec<(Point, Point)>,
    scroll: (i32, i32),
    area: Rect,
}

impl CellMapper {
    fn new(area: Rect, scroll: (i32, i32)) -> Self {
        Self {
            stack: vec![(Point::new(0.0, 0.0), Point::new(1.0, 1.0))],
            scroll,
            area,
        }
    }

    fn push(&mut self, translate: Point, scale: Point) {
        let (t, s) = self.top();
        self.stack.push((
            Point::new(t.x + translate.x * s.x, t.y + translate.y * s.y),
            Point::new(s.x * scale.x, s.y * scale.y),
        ));
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn top(&self) -> (Point, Point) {
        self.stack
            .last()
            .copied()
            .unwrap_or((Point::new(0.0, 0.0), Point::new(1.0, 1.0)))
    }

    /// Cell for a CSS point, or `None` when it falls outside the area.
    fn cell(&self, p: Point) -> Option<(u16, u16)> {
        let (col, row) = self.cell_signed(p);
        let in_x = (0..i32::from(self.area.width)).contains(&col);
        let in_y = (0..i32::from(self.area.height)).contains(&row);
        (in_x && in_y).then(|| (self.area.x + col as u16, self.area.y + row as u16))
    }

    fn cell_signed(&self, p: Point) -> (i32, i32) {
        let (t, s) = self.top();
        let x = t.x + p.x * s.x;
        let y = t.y + p.y * s.y;
        (
            (x / CELL_W).floor() as i32 - self.scroll.0,
            (y / CELL_H).floor() as i32 - self.scroll.1,
        )
    }
}

fn put(buf: &mut Buffer, cell: Option<(u16, u16)>, ch: char, fg: Color) {
    if let Some((x, y)) = cell {
        buf[(x, y)].set_char(ch).set_fg(fg);
    }
}

fn draw_line(buf: &mut Buffer, map: &CellMapper, from: Point, to: Point, fg: Color) {
    let (x0, y0) = map.cell_signed(from);
    let (x1, y1) = map.cell_signed(to);
    let ch = if y0 == y1 {
        '─'
    } else if x0 == x1 {
        '│'
    } else {
        '·'
    };
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
    for i in 0..=steps {
        let col = x0 + (x1 - x0) * i / steps;
        let row = y0 + (y1 - y0) * i / steps;
        if (0..i32::from(map.area.width)).contains(&col)
            && (0..i32::from(map.area.height)).contains(&row)
        {
            put(
                buf,
                Some((map.area.x + col as u16, map.area.y + row as u16)),
                ch,
                fg,
            );
        }
    }
}

/// Paint `commands` into `buf` inside `area`.
fn paint(buf: &mut Buffer, area: Rect, commands: &[RenderCommand], scroll: (i32, i32)) {
    let mut map = CellMapper::new(area, scroll);
    for cmd in commands {
        match cmd {
            RenderCommand::PushTransform { translate, scale } => map.push(*translate, *scale),
            RenderCommand::PopTransform => map.pop(),
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                ..
            } => {
                let fg = theme_to_color(border_color.unwrap_or(*color));
                let (c0, r0) = map.cell_signed(Point::new(rect.x, rect.y));
                let (c1, r1) = map.cell_signed(Point::new(rect.right(), rect.bottom()));
                for row in r0..=r1.max(r0) {
                    for col in c0..=c1.max(c0) {
                        let edge = row == r0 || row == r1 || col == c0 || col == c1;
                        if !edge || !(0..i32::from(area.width)).contains(&col) {
                            continue;
                        }
                        if !(0..i32::from(area.height)).contains(&row) {
                            continue;
                        }
                        let ch = match (row == r0 || row == r1, col == c0 || col == c1) {
                            (true, true) => '+',
                            (true, false) => '-',
                            _ => '|',
                        };
                        put(buf, Some((area.x + col as u16, area.y + row as u16)), ch, fg);
                    }
                }
                if let Some(label) = label {
                    let start = map.cell(rect.center());
                    if let Some((x, y)) = start {
                        let offset = (label.chars().count() / 2) as u16;
                        let x = x.saturating_sub(offset).max(area.x);
                        for (i, ch) in label.chars().enumerate() {
                            let cx = x + i as u16;
                            if cx < area.x + area.width {
                                put(buf, Some((cx, y)), ch, theme_to_color(*color));
                            }
                        }
                    }
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                ..
            } => {
                let (col, row) = map.cell_signed(*position);
                // text sits on its baseline, one cell above the anchor row
                let row = row - 1;
                for (i, ch) in text.chars().enumerate() {
                    let col = col + i as i32;
                    if (0..i32::from(area.width)).contains(&col)
                        && (0..i32::from(area.height)).contains(&row)
                    {
                        put(
                            buf,
                            Some((area.x + col as u16, area.y + row as u16)),
                            ch,
                            theme_to_color(*color),
                        );
                    }
                }
            }
            RenderCommand::DrawLine {
                from, to, color, ..
            } => draw_line(buf, &map, *from, *to, theme_to_color(*color)),
            RenderCommand::DrawSegment {
                from, to, color, ..
            } => draw_line(buf, &map, *from, *to, hex_to_color(color)),
            RenderCommand::DrawPolyline { points, color, .. } => {
                for pair in points.windows(2) {
                    draw_line(buf, &map, pair[0], pair[1], theme_to_color(*color));
                }
            }
            _ => {}
        }
    }
}

/// Interactive preview: Tab cycles pages, arrows scroll, q quits.
pub fn run_preview(pages: &[PreviewPage]) -> Result<()> {
    if pages.is_empty() {
        anyhow::bail!("nothing to preview");
    }

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut current = 0usize;
    let mut scroll = (0i32, 0i32);

    loop {
        let page = &pages[current];
        terminal.draw(|frame| {
            let area = frame.area();

            let header_area = Rect::new(0, 0, area.width, 1);
            let header = Block::default()
                .title(format!(
                    " tijdlijn | {} ({}/{}) | tab next | arrows scroll | q quit ",
                    page.title,
                    current + 1,
                    pages.len()
                ))
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            let content_area = Rect::new(0, 1, area.width, area.height.saturating_sub(1));
            let block = Block::default()
                .borders(Borders::NONE)
                .style(Style::default().bg(Color::Black));
            frame.render_widget(block, content_area);
            paint(frame.buffer_mut(), content_area, &page.commands, scroll);
        })?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Tab => {
                        current = (current + 1) % pages.len();
                        scroll = (0, 0);
                    }
                    KeyCode::BackTab => {
                        current = (current + pages.len() - 1) % pages.len();
                        scroll = (0, 0);
                    }
                    KeyCode::Left => scroll.0 = (scroll.0 - SCROLL_STEP).max(0),
                    KeyCode::Right => scroll.0 += SCROLL_STEP,
                    KeyCode::Up => scroll.1 = (scroll.1 - SCROLL_STEP).max(0),
                    KeyCode::Down => scroll.1 += SCROLL_STEP,
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => scroll.1 += SCROLL_STEP,
                    MouseEventKind::ScrollUp => scroll.1 = (scroll.1 - SCROLL_STEP).max(0),
                    _ => {}
                },
                _ => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
