//! Sticker compositing
//!
//! Draws the text on a transparent layer the size of the background, rotates
//! that layer around its center (growing the canvas), recenters it, and
//! composites it over the background before writing a PNG.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};

use crate::color::Rgb;
use crate::composite::{alpha_composite, paste};
use crate::error::{GenerateError, ResourceKind, Result};
use crate::fonts::load_font;
use crate::rotate::rotate_expand;
use crate::text::{draw_text, font_scale, TextStyle};

/// Everything needed to render one sticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub background_path: PathBuf,
    pub text: String,
    pub position: (i32, i32),
    pub text_color: Rgb,
    pub font_size: u32,
    pub stroke_color: Rgb,
    pub stroke_width: u32,
    pub font_path: PathBuf,
    /// Degrees, counter-clockwise
    pub rotation_angle: i32,
    pub output_path: PathBuf,
}

/// Offset that recenters a layer grown by rotation: `pos - (rotated - original) / 2`,
/// with floor division.
pub fn paste_offset(position: i32, rotated: u32, original: u32) -> i64 {
    position as i64 - (rotated as i64 - original as i64).div_euclid(2)
}

/// Render the sticker in memory.
pub fn compose(request: &RenderRequest) -> Result<RgbaImage> {
    let mut base = load_background(&request.background_path)?;
    if !request.font_path.exists() {
        return Err(GenerateError::missing(ResourceKind::Font, &request.font_path));
    }

    let font = load_font(&request.font_path)?;
    let scale = font_scale(&font, request.font_size).ok_or_else(|| GenerateError::FontLoad {
        path: request.font_path.clone(),
        reason: format!("unusable font size {}", request.font_size),
    })?;

    let (width, height) = base.dimensions();
    let mut text_layer = RgbaImage::new(width, height);
    let style = TextStyle {
        fill: request.text_color,
        stroke: request.stroke_color,
        stroke_width: request.stroke_width,
    };
    let lines = draw_text(&mut text_layer, &font, scale, &request.text, request.position, &style)?;
    tracing::debug!(lines = lines.len(), width, height, "drew text layer");

    if request.rotation_angle == 0 {
        alpha_composite(&mut base, &text_layer);
        return Ok(base);
    }

    let rotated = rotate_expand(&text_layer, request.rotation_angle);
    let paste_x = paste_offset(request.position.0, rotated.width(), width);
    let paste_y = paste_offset(request.position.1, rotated.height(), height);
    tracing::debug!(
        angle = request.rotation_angle,
        rotated_width = rotated.width(),
        rotated_height = rotated.height(),
        paste_x,
        paste_y,
        "rotated text layer"
    );

    let mut canvas = RgbaImage::new(width, height);
    paste(&mut canvas, &rotated, paste_x, paste_y);
    alpha_composite(&mut base, &canvas);
    Ok(base)
}

/// Render the sticker and write it to `request.output_path` as PNG.
///
/// Returns the absolute output path.
#[tracing::instrument(level = "debug", skip_all, fields(background = %request.background_path.display()))]
pub fn render(request: &RenderRequest) -> Result<PathBuf> {
    let image = compose(request)?;
    save_png(&image, &request.output_path)?;
    absolute(&request.output_path)
}

/// Write `image` as PNG, creating parent directories.
///
/// The data goes to a temporary file next to `path` that is renamed into
/// place once encoding succeeded, so a failed write leaves nothing behind.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = tempfile::Builder::new().prefix(".pjsk-").suffix(".png").tempfile_in(parent)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        PngEncoder::new(&mut writer).write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgba8,
        )?;
        writer.flush()?;
    }
    temp.persist(path).map_err(|e| GenerateError::Io(e.error))?;
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

/// Open an image file, mapping a missing file to `ResourceMissing`.
pub fn load_background(path: &Path) -> Result<RgbaImage> {
    if !path.exists() {
        return Err(GenerateError::missing(ResourceKind::Background, path));
    }
    Ok(image::open(path)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn font_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts/DejaVuSans.ttf")
    }

    fn background(dir: &tempfile::TempDir, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join("bg.png");
        RgbaImage::from_pixel(width, height, Rgba([30, 60, 90, 255])).save(&path).unwrap();
        path
    }

    fn request(dir: &tempfile::TempDir, rotation_angle: i32) -> RenderRequest {
        RenderRequest {
            background_path: background(dir, 296, 256),
            text: "Hello\nWorld".to_string(),
            position: (20, 10),
            text_color: Rgb::new(221, 68, 102),
            font_size: 40,
            stroke_color: Rgb::WHITE,
            stroke_width: 4,
            font_path: font_path(),
            rotation_angle,
            output_path: dir.path().join("out/sticker.png"),
        }
    }

    #[test]
    fn test_paste_offset_floor_division() {
        assert_eq!(paste_offset(20, 110, 100), 15);
        assert_eq!(paste_offset(20, 111, 100), 15);
        assert_eq!(paste_offset(0, 100, 100), 0);
        // A layer that shrank moves the other way
        assert_eq!(paste_offset(0, 99, 100), 1);
    }

    #[test]
    fn test_compose_keeps_background_size() {
        let dir = tempfile::tempdir().unwrap();
        for angle in [0, 15, -30, 90] {
            let image = compose(&request(&dir, angle)).unwrap();
            assert_eq!(image.dimensions(), (296, 256), "angle {angle}");
        }
    }

    #[test]
    fn test_compose_draws_text() {
        let dir = tempfile::tempdir().unwrap();
        let image = compose(&request(&dir, 0)).unwrap();
        assert!(image.pixels().any(|p| *p == Rgba([255, 255, 255, 255])));
        // Bottom-right corner is far from the text
        assert_eq!(*image.get_pixel(295, 255), Rgba([30, 60, 90, 255]));
    }

    #[test]
    fn test_render_writes_png_and_returns_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(&dir, 15);
        let out = render(&req).unwrap();
        assert!(out.is_absolute());
        assert!(out.exists());
        let reloaded = image::open(&out).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (296, 256));
    }

    #[test]
    fn test_missing_background() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(&dir, 0);
        req.background_path = dir.path().join("nope.png");
        let err = render(&req).unwrap_err();
        assert!(matches!(err, GenerateError::ResourceMissing { kind: ResourceKind::Background, .. }));
        assert!(err.to_string().contains("nope.png"));
        assert!(!req.output_path.exists());
    }

    #[test]
    fn test_missing_font() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(&dir, 0);
        req.font_path = dir.path().join("nope.ttf");
        let err = render(&req).unwrap_err();
        assert!(matches!(err, GenerateError::ResourceMissing { kind: ResourceKind::Font, .. }));
        assert!(err.to_string().contains("nope.ttf"));
    }

    #[test]
    fn test_missing_background_reported_before_missing_font() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(&dir, 0);
        req.background_path = dir.path().join("miku99.png");
        req.font_path = dir.path().join("fonts/absent.ttf");
        let err = compose(&req).unwrap_err();
        assert!(matches!(err, GenerateError::ResourceMissing { kind: ResourceKind::Background, .. }));
        assert!(err.to_string().contains("miku99.png"));
    }

    #[test]
    fn test_huge_font_size_does_not_exhaust_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(&dir, 0);
        req.background_path = background(&dir, 64, 64);
        req.font_size = 200_000;
        match compose(&req) {
            Ok(image) => assert_eq!(image.dimensions(), (64, 64)),
            Err(err @ GenerateError::TextTooLarge(_)) => assert_eq!(err.status_code(), 400),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_huge_stroke_covers_layer() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(&dir, 0);
        req.background_path = background(&dir, 64, 64);
        req.text = "A".to_string();
        req.stroke_width = 1_000_000;
        let image = compose(&req).unwrap();
        assert_eq!(*image.get_pixel(63, 63), Rgba([255, 255, 255, 255]));
        assert!(image.pixels().all(|p| *p != Rgba([30, 60, 90, 255])));
    }

    #[test]
    fn test_zero_font_size_is_font_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(&dir, 0);
        req.font_size = 0;
        assert!(matches!(render(&req), Err(GenerateError::FontLoad { .. })));
        assert!(!req.output_path.exists());
    }

    #[test]
    fn test_corrupt_background_is_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(&dir, 0);
        let bad = dir.path().join("bad.png");
        fs::write(&bad, b"definitely not a png").unwrap();
        req.background_path = bad;
        let err = render(&req).unwrap_err();
        assert_eq!(err.kind(), "unclassified");
        assert!(!req.output_path.exists());
    }

    #[test]
    fn test_save_png_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/x.png");
        save_png(&RgbaImage::new(3, 3), &path).unwrap();
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_load_background_converts_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3])).save(&path).unwrap();
        let loaded = load_background(&path).unwrap();
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([1, 2, 3, 255]));
    }
}
