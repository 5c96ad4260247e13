//! Signboard Image Export
//!
//! Turns the signboard layer's rendered buffer into a PNG. The buffer is
//! first written out as SVG (one background rect per color run, one text
//! element per style run, each glyph pinned to its cell) and then
//! rasterized with resvg.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ratatui::buffer::Buffer;
use ratatui::style::{Color, Modifier};
use resvg::{tiny_skia, usvg};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use exhibit_core::{ExhibitConfig, Exporter};

/// Background for cells nothing painted
const DEFAULT_BG: &str = "#1e1e1e";

/// Foreground for unstyled glyphs
const DEFAULT_FG: &str = "#e0e0e0";

/// Baseline position within a cell, as a fraction of its height
const BASELINE: f32 = 0.8;

/// Why an export did not produce a file
#[derive(Debug, Error)]
pub enum ExportError {
    /// The generated SVG did not parse
    #[error("invalid SVG: {0}")]
    Svg(#[from] usvg::Error),

    /// Nothing to draw
    #[error("the signboard buffer is empty")]
    EmptyBuffer,

    /// The pixmap could not be allocated
    #[error("cannot allocate a {width}x{height} pixmap")]
    PixmapAllocation {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    /// Creating the output directory failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking render task died
    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Saves rendered signboards as PNG files
#[derive(Clone, Debug)]
pub struct ImageExporter {
    directory: PathBuf,
    cell_width: u32,
    cell_height: u32,
    font_size: f32,
}

impl ImageExporter {
    /// Exporter writing into `directory` with default cell metrics
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            cell_width: 10,
            cell_height: 20,
            font_size: 16.0,
        }
    }

    /// Exporter configured from `config`
    ///
    /// Without an explicit directory this falls back to the user's download
    /// directory, then the working directory.
    pub fn from_config(config: &ExhibitConfig) -> Self {
        let directory = config
            .export_directory
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(directory)
            .with_cell_size(config.cell_width, config.cell_height)
            .with_font_size(config.font_size)
    }

    /// Pixel size of one terminal cell
    pub fn with_cell_size(mut self, width: u32, height: u32) -> Self {
        self.cell_width = width.max(1);
        self.cell_height = height.max(1);
        self
    }

    /// Font size in pixels
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Where files are written
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Render `buffer` and write it to `directory/file_name`
    pub async fn export(&self, buffer: Buffer, file_name: &str) -> Result<PathBuf, ExportError> {
        let path = self.directory.join(file_name);
        let this = self.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || this.write_png(&buffer, &target)).await??;
        Ok(path)
    }

    /// Synchronous render and save
    pub fn write_png(&self, buffer: &Buffer, path: &Path) -> Result<(), ExportError> {
        let svg = buffer_to_svg(buffer, self.cell_width, self.cell_height, self.font_size)?;

        let mut opt = usvg::Options::default();
        opt.fontdb_mut().load_system_fonts();
        let tree = usvg::Tree::from_str(&svg, &opt)?;

        let width = u32::from(buffer.area.width) * self.cell_width;
        let height = u32::from(buffer.area.height) * self.cell_height;
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(ExportError::PixmapAllocation { width, height })?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        pixmap
            .save_png(path)
            .map_err(|e| ExportError::Encode(e.to_string()))
    }
}

#[async_trait]
impl Exporter for ImageExporter {
    type Subtree = Buffer;

    async fn export_as_image(&self, root: Buffer, file_name: String) -> bool {
        match self.export(root, &file_name).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Signboard exported");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, file_name = %file_name, "Signboard export failed");
                false
            }
        }
    }
}

// ============================================================================
// SVG Conversion
// ============================================================================

/// Style of a glyph run
#[derive(Clone, PartialEq)]
struct RunStyle {
    fill: String,
    bold: bool,
    italic: bool,
}

/// A run of single-codepoint glyphs sharing a style
struct TextRun {
    style: RunStyle,
    xs: Vec<u32>,
    text: String,
    /// Whether more glyphs may be appended
    open: bool,
}

/// Convert a rendered buffer to an SVG document
///
/// Wide glyphs occupy their full cell span; the spacer cells after them take
/// the glyph's background.
pub fn buffer_to_svg(
    buffer: &Buffer,
    cell_width: u32,
    cell_height: u32,
    font_size: f32,
) -> Result<String, ExportError> {
    let area = buffer.area;
    if area.width == 0 || area.height == 0 {
        return Err(ExportError::EmptyBuffer);
    }
    let width = u32::from(area.width) * cell_width;
    let height = u32::from(area.height) * cell_height;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = write!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="{DEFAULT_BG}"/>"#
    );

    for row in 0..area.height {
        let y = u32::from(row) * cell_height;
        let baseline = y as f32 + cell_height as f32 * BASELINE;
        let mut backgrounds: Vec<Option<String>> = Vec::with_capacity(usize::from(area.width));
        let mut runs: Vec<TextRun> = Vec::new();

        let mut col = 0;
        while col < area.width {
            let cell = &buffer[(area.x + col, area.y + row)];
            let symbol = cell.symbol();
            let span = u16::try_from(symbol.width().max(1)).unwrap_or(1);

            let (fg, bg) = if cell.modifier.contains(Modifier::REVERSED) {
                (cell.bg, cell.fg)
            } else {
                (cell.fg, cell.bg)
            };
            let bg = (bg != Color::Reset).then(|| color_hex(bg, DEFAULT_BG));
            for _ in 0..span.min(area.width - col) {
                backgrounds.push(bg.clone());
            }

            if !symbol.trim().is_empty() {
                let style = RunStyle {
                    fill: color_hex(fg, DEFAULT_FG),
                    bold: cell.modifier.contains(Modifier::BOLD),
                    italic: cell.modifier.contains(Modifier::ITALIC),
                };
                let x = u32::from(col) * cell_width;
                let single = symbol.chars().count() == 1;
                match runs.last_mut() {
                    Some(run) if single && run.open && run.style == style => {
                        run.xs.push(x);
                        run.text.push_str(symbol);
                    }
                    _ => runs.push(TextRun {
                        style,
                        // A cluster gets one position and closes its run
                        xs: vec![x],
                        text: symbol.to_string(),
                        open: single,
                    }),
                }
            }
            col += span;
        }

        write_background_runs(&mut svg, &backgrounds, y, cell_width, cell_height);
        for run in &runs {
            write_text_run(&mut svg, run, baseline, font_size);
        }
    }

    svg.push_str("</svg>");
    Ok(svg)
}

fn write_background_runs(
    svg: &mut String,
    backgrounds: &[Option<String>],
    y: u32,
    cell_width: u32,
    cell_height: u32,
) {
    let mut start = 0;
    while start < backgrounds.len() {
        let mut end = start + 1;
        while end < backgrounds.len() && backgrounds[end] == backgrounds[start] {
            end += 1;
        }
        if let Some(fill) = &backgrounds[start] {
            let x = u32::try_from(start).unwrap_or(0) * cell_width;
            let w = u32::try_from(end - start).unwrap_or(0) * cell_width;
            let _ = write!(
                svg,
                r#"<rect x="{x}" y="{y}" width="{w}" height="{cell_height}" fill="{fill}"/>"#
            );
        }
        start = end;
    }
}

fn write_text_run(svg: &mut String, run: &TextRun, baseline: f32, font_size: f32) {
    let xs = run
        .xs
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(
        svg,
        r#"<text x="{xs}" y="{baseline}" font-family="monospace" font-size="{font_size}" fill="{}""#,
        run.style.fill
    );
    if run.style.bold {
        svg.push_str(r#" font-weight="bold""#);
    }
    if run.style.italic {
        svg.push_str(r#" font-style="italic""#);
    }
    let _ = write!(svg, r#" xml:space="preserve">{}</text>"#, escape_xml(&run.text));
}

/// Escape text for XML content and attributes
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// `#rrggbb` for a terminal color; `Reset` maps to `default`
pub fn color_hex(color: Color, default: &str) -> String {
    let (r, g, b) = match color {
        Color::Reset => return default.to_string(),
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Indexed(i) => indexed_rgb(i),
        Color::Black => ANSI16[0],
        Color::Red => ANSI16[1],
        Color::Green => ANSI16[2],
        Color::Yellow => ANSI16[3],
        Color::Blue => ANSI16[4],
        Color::Magenta => ANSI16[5],
        Color::Cyan => ANSI16[6],
        Color::Gray => ANSI16[7],
        Color::DarkGray => ANSI16[8],
        Color::LightRed => ANSI16[9],
        Color::LightGreen => ANSI16[10],
        Color::LightYellow => ANSI16[11],
        Color::LightBlue => ANSI16[12],
        Color::LightMagenta => ANSI16[13],
        Color::LightCyan => ANSI16[14],
        Color::White => ANSI16[15],
    };
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// xterm's first sixteen colors
const ANSI16: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

fn indexed_rgb(i: u8) -> (u8, u8, u8) {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    match i {
        0..=15 => ANSI16[usize::from(i)],
        16..=231 => {
            let i = i - 16;
            (
                LEVELS[usize::from(i / 36)],
                LEVELS[usize::from((i / 6) % 6)],
                LEVELS[usize::from(i % 6)],
            )
        }
        _ => {
            let v = 8 + (i - 232) * 10;
            (v, v, v)
        }
    }
}
