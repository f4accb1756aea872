use std::fmt::Write as _;

use chrono::NaiveDateTime;

use super::pages::page_title;
use crate::model::{Direction, NodeKind, Timeline};

pub const BRAND: &str = "GeoTracer";
/// Id of the mounted fragment; a host never holds more than one.
pub const PRINT_ROOT_ID: &str = "gt-print-root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintLayout {
    /// One entry per line with a stem between entries.
    #[default]
    Vertical,
    /// All entries on one rail, matching the one-row image export.
    Horizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintEntry {
    pub time: String,
    pub direction: Direction,
    pub kind: NodeKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintSection {
    pub title: String,
    pub entries: Vec<PrintEntry>,
}

/// A static, non-interactive rendition of the card board.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintDocument {
    pub layout: PrintLayout,
    pub generated_at: NaiveDateTime,
    pub sections: Vec<PrintSection>,
}

impl PrintDocument {
    pub fn new(timelines: &[Timeline], layout: PrintLayout, generated_at: NaiveDateTime) -> Self {
        let sections = timelines
            .iter()
            .enumerate()
            .map(|(i, t)| PrintSection {
                title: page_title(t, i),
                entries: t
                    .cards()
                    .iter()
                    .map(|c| PrintEntry {
                        time: c.title.trim().to_string(),
                        direction: c.direction,
                        kind: c.kind,
                        description: c.description.trim().to_string(),
                    })
                    .collect(),
            })
            .collect();
        Self {
            layout,
            generated_at,
            sections,
        }
    }

    /// The fragment as HTML. Every user string is escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(256 + self.sections.len() * 512);
        let _ = write!(
            html,
            r#"<div id="{PRINT_ROOT_ID}" class="gt-print-doc"><div class="print-header"><div class="ph-title">{BRAND}</div><div class="ph-meta">Gegenereerd: {}</div></div>"#,
            self.generated_at.format("%Y-%m-%d %H:%M"),
        );
        for section in &self.sections {
            self.write_section(&mut html, section);
        }
        html.push_str("</div>");
        html
    }

    fn write_section(&self, html: &mut String, section: &PrintSection) {
        let class = match self.layout {
            PrintLayout::Vertical => "tl-section",
            PrintLayout::Horizontal => "tl-section row-mode",
        };
        let _ = write!(
            html,
            r#"<section class="{class}"><h2 class="tl-title">{}</h2><ol class="tl-list">"#,
            escape_html(&section.title),
        );
        let last = section.entries.len().saturating_sub(1);
        for (i, entry) in section.entries.iter().enumerate() {
            let mut class = String::from("tl-entry");
            if self.layout == PrintLayout::Horizontal {
                class.push_str(" tl-entry-h");
                if i == last {
                    class.push_str(" is-last");
                }
            }
            let stem = match self.layout {
                PrintLayout::Vertical => r#"<div class="tl-stem"></div>"#,
                PrintLayout::Horizontal => "",
            };
            let badge = match entry.direction {
                Direction::In => "in",
                Direction::Out => "out",
            };
            let style = entry.kind.style();
            let _ = write!(
                html,
                r#"<li class="{class}"><div class="tl-node"><div class="tl-dot"></div>{stem}</div><div class="tl-card"><div class="tl-topline"><span class="tl-time">{}</span><span class="tl-badge {badge}">{}</span></div><div class="tl-subline"><span class="tl-type"><i class="tl-ico {}"></i> {}</span>"#,
                escape_html(&entry.time),
                entry.direction.label(),
                style.icon,
                escape_html(style.label),
            );
            if !entry.description.is_empty() {
                let _ = write!(
                    html,
                    r#"<span class="tl-desc">{}</span>"#,
                    escape_html(&entry.description)
                );
            }
            html.push_str("</div></div></li>");
        }
        html.push_str("</ol></section>");
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Owns the print fragment while the host prints it.
///
/// Mounting replaces any fragment left over from an earlier call, and
/// [`PrintHost::print`] unmounts whatever the printer returns.
#[derive(Debug, Default)]
pub struct PrintHost {
    mounted: Option<String>,
}

impl PrintHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted(&self) -> Option<&str> {
        self.mounted.as_deref()
    }

    pub fn mount(&mut self, doc: &PrintDocument) -> &str {
        if self.mounted.is_some() {
            tracing::debug!("replacing stale print fragment");
        }
        self.mounted.insert(doc.to_html())
    }

    pub fn unmount(&mut self) -> Option<String> {
        self.mounted.take()
    }

    /// Mount `doc`, hand it to `printer`, unmount.
    pub fn print<R>(&mut self, doc: &PrintDocument, printer: impl FnOnce(&str) -> R) -> R {
        let html = self.mount(doc).to_string();
        let result = printer(&html);
        self.unmount();
        result
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::Card;

    fn generated() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    fn board() -> Vec<Timeline> {
        let mut out = Card::numbered(2);
        out.direction = Direction::Out;
        out.kind = NodeKind::Voertuig;
        out.description = "Gent <Dok> & \"Noord\"".into();
        let mut no_desc = Card::numbered(3);
        no_desc.description = "  ".into();
        vec![Timeline::with_cards(
            "Ma's rit",
            vec![Card::numbered(1), out, no_desc],
        )]
    }

    #[test]
    fn header_carries_brand_and_timestamp() {
        let html = PrintDocument::new(&board(), PrintLayout::Vertical, generated()).to_html();
        assert!(html.starts_with(r#"<div id="gt-print-root""#));
        assert!(html.contains("GeoTracer"));
        assert!(html.contains("Gegenereerd: 2024-03-01 09:05"));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = PrintDocument::new(&board(), PrintLayout::Vertical, generated()).to_html();
        assert!(html.contains("Ma&#39;s rit"));
        assert!(html.contains("Gent &lt;Dok&gt; &amp; &quot;Noord&quot;"));
        assert!(!html.contains("<Dok>"));
    }

    #[test]
    fn entries_show_badge_type_and_optional_description() {
        let doc = PrintDocument::new(&board(), PrintLayout::Vertical, generated());
        let html = doc.to_html();
        assert_eq!(html.matches("<li ").count(), 3);
        assert_eq!(html.matches("tl-desc").count(), 2);
        assert!(html.contains(r#"<span class="tl-badge out">OUT</span>"#));
        assert!(html.contains("Voertuig"));
        assert!(html.contains("tl-stem"));
    }

    #[test]
    fn horizontal_layout_flags_the_last_entry() {
        let html = PrintDocument::new(&board(), PrintLayout::Horizontal, generated()).to_html();
        assert!(html.contains("row-mode"));
        assert_eq!(html.matches("is-last").count(), 1);
        assert!(!html.contains("tl-stem"));
    }

    #[test]
    fn untitled_timelines_are_numbered() {
        let doc = PrintDocument::new(
            &[Timeline::new(), Timeline::with_cards("", vec![Card::numbered(1)])],
            PrintLayout::Vertical,
            generated(),
        );
        assert_eq!(doc.sections[1].title, "Tijdlijn 2");
    }

    #[test]
    fn fragment_never_outlives_a_print() {
        let mut host = PrintHost::new();
        let doc = PrintDocument::new(&board(), PrintLayout::Vertical, generated());
        let printed = host.print(&doc, |html| html.len());
        assert!(printed > 0);
        assert!(host.mounted().is_none());

        host.mount(&doc);
        host.mount(&doc);
        assert_eq!(host.mounted().map(|h| h.matches(PRINT_ROOT_ID).count()), Some(1));
    }
}
