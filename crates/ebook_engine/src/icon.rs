//! Procedural app icon: an open book on an indigo-to-violet gradient.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

pub const BACKGROUND_TOP: Rgb = Rgb(99, 102, 241);
pub const BACKGROUND_BOTTOM: Rgb = Rgb(139, 92, 246);
pub const LEFT_PAGE: Rgb = Rgb(255, 255, 255);
pub const RIGHT_PAGE: Rgb = Rgb(248, 250, 252);
pub const PAGE_LINES: Rgb = Rgb(199, 210, 254);
pub const SHADOW: Rgb = Rgb(79, 70, 229);
const SHADOW_ALPHA: u8 = 80;

/// Reference canvas the geometry below is expressed in.
const DESIGN_SIZE: f32 = 1024.0;
const PAGE_LINE_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Error)]
pub enum IconError {
    #[error("cannot render an icon of size {0}")]
    InvalidSize(u32),
    #[error("png encoding failed: {0}")]
    Encode(String),
    #[error("output path has no file name: {0:?}")]
    InvalidPath(PathBuf),
    #[error("cannot write icon: {0}")]
    Io(#[from] io::Error),
}

/// Linear interpolation between two colors, `ratio` in `[0, 1]`.
pub fn lerp_color(from: Rgb, to: Rgb, ratio: f32) -> Rgb {
    let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * ratio) as u8;
    Rgb(
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}

/// Draws the icon on a `size` x `size` canvas.
pub fn render_icon(size: u32) -> Result<Pixmap, IconError> {
    let mut pixmap = Pixmap::new(size, size).ok_or(IconError::InvalidSize(size))?;
    let scale = size as f32 / DESIGN_SIZE;
    let px = |design: f32| (design * scale).floor();

    fill_gradient(&mut pixmap, size);

    let cx = (size / 2) as f32;
    let cy = (size as f32 * 0.52).floor();
    let half_width = (px(440.0) / 2.0).floor();
    let half_height = (px(360.0) / 2.0).floor();
    let top = cy - half_height;
    let bottom = cy + half_height;
    let spine_gap = px(20.0);
    let slant = px(40.0);

    let page = |side: f32, dx: f32, dy: f32| {
        [
            (cx + side * spine_gap + dx, top + dy),
            (cx + side * half_width + dx, top + slant + dy),
            (cx + side * half_width + dx, bottom + dy),
            (cx + side * spine_gap + dx, bottom - spine_gap + dy),
        ]
    };

    let shadow_offset = px(20.0);
    for side in [-1.0, 1.0] {
        fill_polygon(
            &mut pixmap,
            &page(side, shadow_offset, shadow_offset),
            SHADOW,
            SHADOW_ALPHA,
        );
    }
    fill_polygon(&mut pixmap, &page(-1.0, 0.0, 0.0), LEFT_PAGE, 255);
    fill_polygon(&mut pixmap, &page(1.0, 0.0, 0.0), RIGHT_PAGE, 255);

    draw_line(
        &mut pixmap,
        (cx, top),
        (cx, bottom - spine_gap),
        px(8.0),
        SHADOW,
    );

    let line_width = px(12.0);
    let line_step = px(50.0);
    let inset = px(50.0);
    let taper = px(20.0);
    let first_line = cy - (px(360.0) / 4.0).floor();
    for i in 0..PAGE_LINE_COUNT {
        let y = first_line + i as f32 * line_step;
        // Lines shorten toward the spine for a little perspective.
        let shorten = taper * (1.0 - i as f32 / PAGE_LINE_COUNT as f32);
        draw_line(
            &mut pixmap,
            (cx - half_width + inset, y),
            (cx - inset - shorten, y),
            line_width,
            PAGE_LINES,
        );
        draw_line(
            &mut pixmap,
            (cx + inset + shorten, y),
            (cx + half_width - inset, y),
            line_width,
            PAGE_LINES,
        );
    }

    Ok(pixmap)
}

pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, IconError> {
    pixmap
        .encode_png()
        .map_err(|err| IconError::Encode(err.to_string()))
}

/// Renders a PNG icon and moves it into place at `path`, creating parent
/// folders. Readers never see a half-written file.
pub fn write_icon(path: &Path, size: u32) -> Result<PathBuf, IconError> {
    if path.file_name().is_none() {
        return Err(IconError::InvalidPath(path.to_path_buf()));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let png = encode_png(&render_icon(size)?)?;
    fs::create_dir_all(dir)?;
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(&png)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(path.to_path_buf())
}

fn fill_gradient(pixmap: &mut Pixmap, size: u32) {
    let mut paint = Paint::default();
    for y in 0..size {
        let Rgb(r, g, b) = lerp_color(BACKGROUND_TOP, BACKGROUND_BOTTOM, y as f32 / size as f32);
        paint.set_color_rgba8(r, g, b, 255);
        if let Some(row) = Rect::from_xywh(0.0, y as f32, size as f32, 1.0) {
            pixmap.fill_rect(row, &paint, Transform::identity(), None);
        }
    }
}

fn fill_polygon(pixmap: &mut Pixmap, points: &[(f32, f32)], color: Rgb, alpha: u8) {
    let mut builder = PathBuilder::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        if i == 0 {
            builder.move_to(x, y);
        } else {
            builder.line_to(x, y);
        }
    }
    builder.close();
    let Some(path) = builder.finish() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(color.0, color.1, color.2, alpha);
    paint.anti_alias = true;
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn draw_line(pixmap: &mut Pixmap, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
    if width <= 0.0 {
        return;
    }
    let mut builder = PathBuilder::new();
    builder.move_to(from.0, from.1);
    builder.line_to(to.0, to.1);
    let Some(path) = builder.finish() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(color.0, color.1, color.2, 255);
    paint.anti_alias = true;
    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}
