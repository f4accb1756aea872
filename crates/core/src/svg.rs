//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write as _;

use tijdlijn_protocol::{RenderCommand, Size, TextAlign, ThemeToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    Light,
    Dark,
}

/// What an open `<g>` was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    Clip,
    Transform,
    Group,
}

/// Render a list of commands as an SVG document string.
///
/// Transforms, clips and groups become nested `<g>` elements; anything
/// left open at the end is closed so the output is always well formed.
pub fn render_svg(commands: &[RenderCommand], size: Size, palette: Palette) -> String {
    let (width, height) = (size.w, size.h);
    let mut svg = String::with_capacity(commands.len() * 160);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:'Open Sans',Arial,sans-serif">"#,
    );
    let _ = write!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        resolve_color(ThemeToken::Background, palette),
    );

    let mut open: Vec<Open> = Vec::new();
    let mut clip_ids = 0usize;

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                node_id,
            } => {
                let fill = resolve_color(*color, palette);
                let stroke = border_color
                    .map(|b| format!(r#" stroke="{}" stroke-width="1""#, resolve_color(b, palette)))
                    .unwrap_or_default();
                let data = node_id
                    .map(|id| format!(r#" data-node="{id}""#))
                    .unwrap_or_default();
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}" rx="4"{stroke}{data}>"#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                if let Some(label) = label {
                    let _ = write!(svg, "<title>{}</title>", escape_xml(label));
                }
                svg.push_str("</rect>");

                // Centered label when the box is wide enough to carry one.
                if let Some(label) = label
                    && rect.w > 20.0
                {
                    let max_chars = (rect.w / 7.0) as usize;
                    let text = if label.chars().count() > max_chars && max_chars > 2 {
                        let truncated: String = label.chars().take(max_chars - 1).collect();
                        format!("{truncated}…")
                    } else {
                        label.to_string()
                    };
                    let center = rect.center();
                    let _ = write!(
                        svg,
                        r#"<text x="{}" y="{}" fill="{}" font-size="11" text-anchor="middle" dominant-baseline="middle" style="pointer-events:none">{}</text>"#,
                        center.x,
                        center.y,
                        resolve_color(label_color(*color), palette),
                        escape_xml(&text),
                    );
                }
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}" stroke-linecap="round"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    resolve_color(*color, palette),
                );
            }
            RenderCommand::DrawPolyline {
                points,
                color,
                width: line_width,
            } => {
                let mut coords = String::with_capacity(points.len() * 12);
                for (i, p) in points.iter().enumerate() {
                    if i > 0 {
                        coords.push(' ');
                    }
                    let _ = write!(coords, "{},{}", p.x, p.y);
                }
                let _ = write!(
                    svg,
                    r#"<polyline points="{coords}" fill="none" stroke="{}" stroke-width="{line_width}" stroke-linecap="round" stroke-linejoin="round"/>"#,
                    resolve_color(*color, palette),
                );
            }
            RenderCommand::DrawSegment {
                from,
                to,
                key,
                color,
                width: line_width,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}" data-seg="{}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    color.as_str(),
                    escape_xml(key),
                );
            }
            RenderCommand::HitLine {
                from,
                to,
                key,
                width: line_width,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="transparent" stroke-width="{line_width}" pointer-events="stroke" data-seg="{}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    escape_xml(key),
                );
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}">{}</text>"#,
                    position.x,
                    position.y,
                    resolve_color(*color, palette),
                    escape_xml(text),
                );
            }
            RenderCommand::SetClip { rect } => {
                let id = format!("clip-{clip_ids}");
                clip_ids += 1;
                let _ = write!(
                    svg,
                    r#"<clipPath id="{id}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#{id})">"#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                open.push(Open::Clip);
            }
            RenderCommand::PushTransform { translate, scale } => {
                let _ = write!(
                    svg,
                    r#"<g transform="translate({} {}) scale({} {})">"#,
                    translate.x, translate.y, scale.x, scale.y,
                );
                open.push(Open::Transform);
            }
            RenderCommand::BeginGroup { id, label } => {
                let _ = write!(svg, r#"<g id="{}""#, escape_xml(id));
                if let Some(label) = label {
                    let _ = write!(svg, r#" aria-label="{}""#, escape_xml(label));
                }
                svg.push('>');
                open.push(Open::Group);
            }
            RenderCommand::ClearClip => close(&mut svg, &mut open, Open::Clip),
            RenderCommand::PopTransform => close(&mut svg, &mut open, Open::Transform),
            RenderCommand::EndGroup => close(&mut svg, &mut open, Open::Group),
            // Surface sizing and clearing only matter to raster backends.
            RenderCommand::ResizeSurface { .. } | RenderCommand::Clear { .. } => {}
        }
    }

    for _ in open.drain(..) {
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    svg
}

fn close(svg: &mut String, open: &mut Vec<Open>, expected: Open) {
    match open.pop() {
        Some(kind) => {
            if kind != expected {
                tracing::debug!(?expected, found = ?kind, "unbalanced render command stream");
            }
            svg.push_str("</g>");
        }
        None => tracing::debug!(?expected, "close without matching open"),
    }
}

/// Text drawn on top of a filled box.
fn label_color(fill: ThemeToken) -> ThemeToken {
    match fill {
        ThemeToken::BadgeIn
        | ThemeToken::BadgeOut
        | ThemeToken::NodePrikklok
        | ThemeToken::NodeVoertuig
        | ThemeToken::NodeWerf
        | ThemeToken::NodeHuis
        | ThemeToken::NodeBedrijf => ThemeToken::Surface,
        _ => ThemeToken::TextPrimary,
    }
}

pub fn resolve_color(token: ThemeToken, palette: Palette) -> &'static str {
    match palette {
        Palette::Dark => match token {
            ThemeToken::Background | ThemeToken::PageBackground => "#181818",
            ThemeToken::Surface | ThemeToken::CardBackground => "#242424",
            ThemeToken::Border | ThemeToken::CardBorder => "#3a3a3a",
            ThemeToken::GridDot => "#2c2c2c",
            ThemeToken::TextPrimary | ThemeToken::PageTitle => "#ececec",
            ThemeToken::TextSecondary | ThemeToken::TextMuted => "#9e9e9e",
            ThemeToken::TimelineLine | ThemeToken::TimelineTick | ThemeToken::Connector => {
                "#d0d0d0"
            }
            ThemeToken::SegmentHalo => "#ffd60a",
            ThemeToken::SelectionHighlight => "#448aff",
            ThemeToken::NodePrikklok => "#e53935",
            ThemeToken::NodeVoertuig => "#1e88e5",
            ThemeToken::NodeWerf => "#fb8c00",
            ThemeToken::NodeHuis => "#43a047",
            ThemeToken::NodeBedrijf => "#8e24aa",
            ThemeToken::NoteBackground => "#4a4520",
            ThemeToken::NoteHandle => "#6b6330",
            ThemeToken::BadgeIn => "#2e7d32",
            ThemeToken::BadgeOut => "#c62828",
        },
        Palette::Light => match token {
            ThemeToken::Background | ThemeToken::PageBackground => "#ffffff",
            ThemeToken::Surface | ThemeToken::CardBackground => "#ffffff",
            ThemeToken::Border | ThemeToken::CardBorder => "#dee2e6",
            ThemeToken::GridDot => "#eef0f2",
            ThemeToken::TextPrimary | ThemeToken::PageTitle => "#000000",
            ThemeToken::TextSecondary | ThemeToken::TextMuted => "#666677",
            ThemeToken::TimelineLine | ThemeToken::TimelineTick | ThemeToken::Connector => {
                "#111111"
            }
            ThemeToken::SegmentHalo => "#ffd60a",
            ThemeToken::SelectionHighlight => "#c20e1a",
            ThemeToken::NodePrikklok => "#c20e1a",
            ThemeToken::NodeVoertuig => "#1565c0",
            ThemeToken::NodeWerf => "#ef6c00",
            ThemeToken::NodeHuis => "#2e7d32",
            ThemeToken::NodeBedrijf => "#6a1b9a",
            ThemeToken::NoteBackground => "#fff8c4",
            ThemeToken::NoteHandle => "#f0e08a",
            ThemeToken::BadgeIn => "#2e7d32",
            ThemeToken::BadgeOut => "#c62828",
        },
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
