mod raster;
mod renderer;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use tijdlijn_core::codec::canvas::canvas_from_json;
use tijdlijn_core::codec::cards::{cards_from_json, cards_to_json};
use tijdlijn_core::codec::{deserialize_cards, serialize_cards};
use tijdlijn_core::export::{
    ExportLock, PageOptions, PrintDocument, PrintLayout, export_canvas, export_pages,
};
use tijdlijn_core::model::Timeline;
use tijdlijn_core::parsers::{DelimitedReader, import_sheet};
use tijdlijn_core::svg::{Palette, render_svg};
use tijdlijn_core::views::{CardLayoutMode, render_timeline};
use tijdlijn_core::{EditorConfig, EditorSession};
use tracing_subscriber::EnvFilter;

use crate::raster::ResvgRasterizer;
use crate::renderer::{PreviewPage, run_preview};

#[derive(Parser, Debug)]
#[command(name = "tijdlijn")]
#[command(about = "Build, convert and export timeline diagrams", long_about = None)]
struct Cli {
    /// Editor settings (JSON). Missing fields keep their defaults.
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Turn a trip sheet (CSV) into a card board document.
    Import {
        #[arg(value_name = "SHEET")]
        input: PathBuf,
        /// Write here instead of stdout.
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
        /// Field separator; detected from the header line when omitted.
        #[arg(short, long)]
        delimiter: Option<char>,
    },
    /// Render a canvas document, or one timeline of a card board, as SVG.
    Svg {
        #[arg(value_name = "DOCUMENT")]
        input: PathBuf,
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
        /// Timeline to render when the document is a card board.
        #[arg(short, long, default_value_t = 0)]
        timeline: usize,
        #[arg(long)]
        dark: bool,
    },
    /// Export every timeline of a card board as landscape PNG pages.
    Pages {
        #[arg(value_name = "BOARD")]
        input: PathBuf,
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
        /// Put every card on one row instead of wrapping.
        #[arg(long)]
        one_row: bool,
    },
    /// Export a canvas document as a PNG at twice its board size.
    Png {
        #[arg(value_name = "CANVAS")]
        input: PathBuf,
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },
    /// Write a printable HTML fragment of a card board.
    Print {
        #[arg(value_name = "BOARD")]
        input: PathBuf,
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
        #[arg(long)]
        horizontal: bool,
    },
    /// Preview a canvas document or card board in the terminal.
    View {
        #[arg(value_name = "DOCUMENT")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Import {
            input,
            output,
            delimiter,
        } => {
            let data = read(&input)?;
            let reader = match delimiter {
                Some(c) if c.is_ascii() => DelimitedReader::with_delimiter(c as u8),
                Some(c) => anyhow::bail!("delimiter must be a single ASCII character, got {c:?}"),
                None => DelimitedReader::default(),
            };
            let timelines = import_sheet(&reader, &data)
                .with_context(|| format!("failed to import {}", input.display()))?;
            let json = cards_to_json(&serialize_cards(&timelines, Utc::now()))?;
            emit(output.as_deref(), json.as_bytes())?;
            tracing::info!("Import voltooid ✅ ({})", input.display());
        }
        Command::Svg {
            input,
            output,
            timeline,
            dark,
        } => {
            let palette = if dark { Palette::Dark } else { Palette::Light };
            let svg = match load(&input, &config)? {
                Loaded::Canvas(mut session) => {
                    let board = session.board();
                    render_svg(&session.render(), board, palette)
                }
                Loaded::Board(timelines) => {
                    let t = timelines
                        .get(timeline)
                        .with_context(|| format!("no timeline {timeline}"))?;
                    let content = render_timeline(
                        t,
                        timeline,
                        CardLayoutMode::Wrap {
                            width: config.board.w,
                        },
                        &config.card_metrics(),
                    );
                    render_svg(&content.commands, content.size, palette)
                }
            };
            emit(output.as_deref(), svg.as_bytes())?;
        }
        Command::Pages {
            input,
            out_dir,
            one_row,
        } => {
            let timelines = load_board(&input)?;
            let options = PageOptions {
                one_row,
                wrapper_width: config.board.w,
            };
            let images = export_pages(
                &timelines,
                &options,
                &config.card_metrics(),
                &ResvgRasterizer::new(),
                &ExportLock::new(),
            )?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;
            for image in &images {
                let path = out_dir.join(&image.file_name);
                std::fs::write(&path, &image.png)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            tracing::info!(pages = images.len(), dir = %out_dir.display(), "export finished");
        }
        Command::Png { input, out_dir } => {
            let Loaded::Canvas(mut session) = load(&input, &config)? else {
                anyhow::bail!("{} is a card board; use `pages`", input.display());
            };
            let board = session.board();
            let image = export_canvas(
                &session.render(),
                board,
                Utc::now(),
                &ResvgRasterizer::new(),
                &ExportLock::new(),
            )?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;
            let path = out_dir.join(&image.file_name);
            std::fs::write(&path, &image.png)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(file = %path.display(), "canvas exported");
        }
        Command::Print {
            input,
            output,
            horizontal,
        } => {
            let timelines = load_board(&input)?;
            let layout = if horizontal {
                PrintLayout::Horizontal
            } else {
                PrintLayout::Vertical
            };
            let doc = PrintDocument::new(&timelines, layout, Local::now().naive_local());
            emit(output.as_deref(), doc.to_html().as_bytes())?;
        }
        Command::View { input } => {
            let pages = match load(&input, &config)? {
                Loaded::Canvas(mut session) => vec![PreviewPage {
                    title: input.display().to_string(),
                    commands: session.render(),
                }],
                Loaded::Board(timelines) => timelines
                    .iter()
                    .enumerate()
                    .map(|(i, t)| PreviewPage {
                        title: t.title.clone(),
                        commands: render_timeline(
                            t,
                            i,
                            CardLayoutMode::Wrap {
                                width: config.board.w,
                            },
                            &config.card_metrics(),
                        )
                        .commands,
                    })
                    .collect(),
            };
            run_preview(&pages)?;
        }
    }
    Ok(())
}

enum Loaded {
    Canvas(EditorSession),
    Board(Vec<Timeline>),
}

/// Card boards carry a `timelines` array; anything else is read as a canvas.
fn load(path: &Path, config: &EditorConfig) -> Result<Loaded> {
    let text = String::from_utf8(read(path)?)
        .with_context(|| format!("{} is not UTF-8", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    if value.get("timelines").is_some() {
        return Ok(Loaded::Board(deserialize_cards(&cards_from_json(&text)?)));
    }
    let mut session = EditorSession::new(config);
    session.load_document(&canvas_from_json(&text)?);
    Ok(Loaded::Canvas(session))
}

fn load_board(path: &Path) -> Result<Vec<Timeline>> {
    let text = String::from_utf8(read(path)?)
        .with_context(|| format!("{} is not UTF-8", path.display()))?;
    Ok(deserialize_cards(&cards_from_json(&text)?))
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn emit(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(bytes)?;
            out.write_all(b"\n")?;
            Ok(())
        }
    }
}
