//! Image and print export.
//!
//! Page layout is computed here as render commands; turning those into
//! pixels is left to a [`Rasterizer`] supplied by the host.

pub mod pages;
pub mod print;

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tijdlijn_protocol::{Point, RenderCommand, Size};

use crate::model::Timeline;
use crate::svg::{Palette, render_svg};
use crate::views::CardMetrics;

pub use pages::{PageOptions, PagePlan, PageSlice, plan_timeline};
pub use print::{PrintDocument, PrintHost, PrintLayout};

/// Free-canvas PNGs are rendered at twice the board size.
pub const CANVAS_EXPORT_SCALE: f64 = 2.0;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("invalid SVG: {0}")]
    Svg(String),
    #[error("cannot allocate a {width}x{height} image")]
    Allocation { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already running")]
    Busy,
    #[error("nothing to export")]
    Empty,
    #[error("rasterize: {0}")]
    Raster(#[from] RasterError),
}

/// Turns a standalone SVG document into PNG bytes of the given size.
pub trait Rasterizer {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<Vec<u8>, RasterError>;
}

/// Refuses a second export while one is running.
#[derive(Debug, Default)]
pub struct ExportLock {
    busy: AtomicBool,
}

impl ExportLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Result<ExportGuard<'_>, ExportError> {
        if self.busy.swap(true, Ordering::AcqRel) {
            tracing::warn!("export requested while another is running");
            return Err(ExportError::Busy);
        }
        Ok(ExportGuard { lock: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Released on drop, including when the export fails half-way.
#[derive(Debug)]
pub struct ExportGuard<'a> {
    lock: &'a ExportLock,
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.lock.busy.store(false, Ordering::Release);
    }
}

/// A finished image and the name it should be saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub file_name: String,
    pub png: Vec<u8>,
}

/// Every page of every timeline, in board order.
pub fn export_pages(
    timelines: &[Timeline],
    options: &PageOptions,
    metrics: &CardMetrics,
    rasterizer: &dyn Rasterizer,
    lock: &ExportLock,
) -> Result<Vec<ExportedImage>, ExportError> {
    let _guard = lock.try_acquire()?;
    let page = options.page_size();
    let mut images = Vec::new();
    for (index, timeline) in timelines.iter().enumerate() {
        let Some(plan) = plan_timeline(timeline, index, options, metrics) else {
            continue;
        };
        for slice in plan.slices() {
            let svg = render_svg(&plan.page_commands(&slice), page, Palette::Light);
            images.push(ExportedImage {
                file_name: plan.file_name(&slice),
                png: rasterizer.rasterize(&svg, page.w as u32, page.h as u32)?,
            });
        }
        tracing::debug!(timeline = index, pages = plan.page_count(), "exported timeline");
    }
    Ok(images)
}

/// The free canvas as one PNG at [`CANVAS_EXPORT_SCALE`].
pub fn export_canvas(
    commands: &[RenderCommand],
    board: Size,
    now: DateTime<Utc>,
    rasterizer: &dyn Rasterizer,
    lock: &ExportLock,
) -> Result<ExportedImage, ExportError> {
    let _guard = lock.try_acquire()?;
    if board.is_degenerate() || commands.is_empty() {
        return Err(ExportError::Empty);
    }
    let out = Size::new(board.w * CANVAS_EXPORT_SCALE, board.h * CANVAS_EXPORT_SCALE);
    let mut scaled = Vec::with_capacity(commands.len() + 2);
    scaled.push(RenderCommand::PushTransform {
        translate: Point::new(0.0, 0.0),
        scale: Point::new(CANVAS_EXPORT_SCALE, CANVAS_EXPORT_SCALE),
    });
    scaled.extend_from_slice(commands);
    scaled.push(RenderCommand::PopTransform);

    let svg = render_svg(&scaled, out, Palette::Light);
    Ok(ExportedImage {
        file_name: canvas_file_name(now),
        png: rasterizer.rasterize(&svg, out.w.ceil() as u32, out.h.ceil() as u32)?,
    })
}

/// `timeline-2024-03-01-08-30-00.png`
pub fn canvas_file_name(now: DateTime<Utc>) -> String {
    format!("timeline-{}.png", now.format("%Y-%m-%d-%H-%M-%S"))
}
