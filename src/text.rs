//! Outlined text drawing
//!
//! Lines are drawn one below the other: each line starts where the previous
//! line's ink ended, so the spacing follows the glyphs actually drawn rather
//! than a fixed line height. The outline is a disc dilation of the glyph
//! coverage, painted under the fill. Nothing outside the layer is rasterized.

use ab_glyph::{point, Font, GlyphId, OutlinedGlyph, PxScale, ScaleFont};
use image::RgbaImage;

use crate::color::Rgb;
use crate::composite::blend_over;

/// Fill and outline settings for a block of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub fill: Rgb,
    pub stroke: Rgb,
    /// Outline radius in pixels; 0 draws no outline
    pub stroke_width: u32,
}

/// Largest raster, in pixels, a single glyph or line window may need.
pub const MAX_RASTER_PIXELS: u64 = 1 << 23;

/// Text whose raster would exceed [`MAX_RASTER_PIXELS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(
    "Text too large to render: needs a {width}x{height} pixel raster, limit is {} pixels",
    MAX_RASTER_PIXELS
)]
pub struct TextTooLarge {
    pub width: u64,
    pub height: u64,
}

/// Pixel-space ink bounds, `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkBox {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl InkBox {
    pub fn height(&self) -> i64 {
        self.max_y - self.min_y
    }

    fn union(self, other: InkBox) -> InkBox {
        InkBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    fn expand(self, by: i64) -> InkBox {
        InkBox {
            min_x: self.min_x.saturating_sub(by),
            min_y: self.min_y.saturating_sub(by),
            max_x: self.max_x.saturating_add(by),
            max_y: self.max_y.saturating_add(by),
        }
    }

    fn intersect(self, other: InkBox) -> Option<InkBox> {
        let clipped = InkBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        };
        (clipped.min_x < clipped.max_x && clipped.min_y < clipped.max_y).then_some(clipped)
    }

    fn check_area(self) -> Result<(), TextTooLarge> {
        let width = (self.max_x - self.min_x).max(0) as u64;
        let height = (self.max_y - self.min_y).max(0) as u64;
        if width.saturating_mul(height) > MAX_RASTER_PIXELS {
            return Err(TextTooLarge { width, height });
        }
        Ok(())
    }
}

/// Where a line was drawn and how far it pushed the next one down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMetrics {
    pub text: String,
    /// y of the ascender line the line was drawn from
    pub top: i64,
    /// Ink height, excluding the outline
    pub height: i64,
    /// None for lines without visible glyphs
    pub ink: Option<InkBox>,
}

/// Convert a font size (em size in pixels) to an ab_glyph scale.
///
/// Returns `None` for non-positive sizes or fonts without usable metrics.
pub fn font_scale<F: Font>(font: &F, size: u32) -> Option<PxScale> {
    if size == 0 {
        return None;
    }
    let units_per_em = font.units_per_em()?;
    let height = font.height_unscaled();
    if units_per_em <= 0.0 || height <= 0.0 {
        return None;
    }
    Some(PxScale::from(size as f32 * height / units_per_em))
}

/// Outline every glyph of one line, top of the line at `top`.
fn layout_line<F: Font>(font: &F, scale: PxScale, line: &str, x: f32, top: f32) -> Vec<OutlinedGlyph> {
    let scaled = font.as_scaled(scale);
    let baseline = top + scaled.ascent();

    let mut caret = x;
    let mut prev: Option<GlyphId> = None;
    let mut glyphs = Vec::new();
    for c in line.chars() {
        if c.is_control() {
            continue;
        }
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        prev = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            glyphs.push(outlined);
        }
    }
    glyphs
}

fn ink_box(glyphs: &[OutlinedGlyph]) -> Option<InkBox> {
    glyphs.iter().map(glyph_box).reduce(InkBox::union)
}

/// Measure a line without drawing it.
pub fn measure_line<F: Font>(font: &F, scale: PxScale, line: &str, x: i32, top: i64) -> Option<InkBox> {
    ink_box(&layout_line(font, scale, line, x as f32, top as f32))
}

fn glyph_box(glyph: &OutlinedGlyph) -> InkBox {
    let b = glyph.px_bounds();
    InkBox {
        min_x: b.min.x.floor() as i64,
        min_y: b.min.y.floor() as i64,
        max_x: b.max.x.ceil() as i64,
        max_y: b.max.y.ceil() as i64,
    }
}

/// Coverage values over a rectangular window of the layer.
struct Coverage {
    window: InkBox,
    width: usize,
    data: Vec<f32>,
}

impl Coverage {
    fn new(window: InkBox) -> Self {
        let width = (window.max_x - window.min_x) as usize;
        let height = (window.max_y - window.min_y) as usize;
        Self { window, width, data: vec![0.0; width * height] }
    }

    fn height(&self) -> usize {
        self.data.len() / self.width.max(1)
    }

    /// Value at layer coordinates; 0 outside the window.
    fn at(&self, x: i64, y: i64) -> f32 {
        let w = self.window;
        if x < w.min_x || y < w.min_y || x >= w.max_x || y >= w.max_y {
            return 0.0;
        }
        self.data[(y - w.min_y) as usize * self.width + (x - w.min_x) as usize]
    }

    /// Rasterize the glyphs that touch `source`, clipped to the window.
    fn rasterize(&mut self, glyphs: &[OutlinedGlyph], source: InkBox) -> Result<(), TextTooLarge> {
        let window = self.window;
        let stride = self.width;
        for glyph in glyphs {
            let bounds = glyph_box(glyph);
            if bounds.intersect(source).is_none() {
                continue;
            }
            // ab_glyph rasterizes the whole glyph, not just the visible part
            bounds.check_area()?;

            let data = &mut self.data;
            glyph.draw(|x, y, c| {
                let px = bounds.min_x + x as i64;
                let py = bounds.min_y + y as i64;
                if px >= window.min_x && py >= window.min_y && px < window.max_x && py < window.max_y {
                    let idx = (py - window.min_y) as usize * stride + (px - window.min_x) as usize;
                    data[idx] = (data[idx] + c).min(1.0);
                }
            });
        }
        Ok(())
    }

    /// Grow the coverage by a disc of `radius` pixels, anti-aliased at the rim.
    ///
    /// Distances are measured from the half-coverage contour with an exact
    /// Euclidean distance transform, so the cost is linear in the window
    /// size whatever the radius.
    fn dilate(&self, radius: u32) -> Coverage {
        let (width, height) = (self.width, self.height());
        let far = ((width + height) as f64).powi(2) + 1.0;
        let mut grid: Vec<f64> = self.data.iter().map(|&c| if c >= 0.5 { 0.0 } else { far }).collect();
        distance_transform(&mut grid, width, height);

        let reach = radius as f64 + 0.5;
        let data = grid
            .iter()
            .zip(&self.data)
            .map(|(&d2, &c)| {
                let grown = if d2 >= far { 0.0 } else { (reach - d2.sqrt()).clamp(0.0, 1.0) as f32 };
                grown.max(c)
            })
            .collect();
        Coverage { window: self.window, width, data }
    }
}

/// In-place squared Euclidean distance transform of a `width` x `height` grid
/// holding 0 at seeds and a large value elsewhere.
fn distance_transform(grid: &mut [f64], width: usize, height: usize) {
    let longest = width.max(height);
    let mut line = vec![0.0; longest];
    let mut out = vec![0.0; longest];
    let mut hull = vec![0usize; longest];
    let mut bounds = vec![0.0; longest + 1];

    for x in 0..width {
        for y in 0..height {
            line[y] = grid[y * width + x];
        }
        lower_envelope(&line[..height], &mut out[..height], &mut hull, &mut bounds);
        for y in 0..height {
            grid[y * width + x] = out[y];
        }
    }
    for y in 0..height {
        let row = &mut grid[y * width..(y + 1) * width];
        line[..width].copy_from_slice(row);
        lower_envelope(&line[..width], &mut out[..width], &mut hull, &mut bounds);
        row.copy_from_slice(&out[..width]);
    }
}

/// One-dimensional pass: `out[q] = min_p (q - p)^2 + f[p]`, via the lower
/// envelope of the parabolas rooted at each sample.
fn lower_envelope(f: &[f64], out: &mut [f64], hull: &mut [usize], bounds: &mut [f64]) {
    if f.is_empty() {
        return;
    }
    let crossing = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * (qf - pf))
    };

    let mut k = 0;
    hull[0] = 0;
    bounds[0] = f64::NEG_INFINITY;
    bounds[1] = f64::INFINITY;
    for q in 1..f.len() {
        let mut s = crossing(q, hull[k]);
        while s <= bounds[k] {
            k -= 1;
            s = crossing(q, hull[k]);
        }
        k += 1;
        hull[k] = q;
        bounds[k] = s;
        bounds[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, slot) in out.iter_mut().enumerate() {
        while bounds[k + 1] < q as f64 {
            k += 1;
        }
        let d = q as f64 - hull[k] as f64;
        *slot = d * d + f[hull[k]];
    }
}

fn to_alpha(coverage: f32) -> u8 {
    (coverage.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Paint one line's fill and outline onto `layer`.
///
/// Only ink within reach of the layer is rasterized: the source window is the
/// ink clipped to the layer grown by the outline, and the painted window is
/// the layer clipped to the ink grown by the outline.
fn paint_line(
    layer: &mut RgbaImage,
    glyphs: &[OutlinedGlyph],
    bounds: InkBox,
    style: &TextStyle,
) -> Result<(), TextTooLarge> {
    let layer_box = InkBox { min_x: 0, min_y: 0, max_x: layer.width() as i64, max_y: layer.height() as i64 };
    let pad = style.stroke_width as i64 + 1;
    let (Some(source), Some(target)) =
        (bounds.intersect(layer_box.expand(pad)), layer_box.intersect(bounds.expand(pad)))
    else {
        return Ok(());
    };

    let window = source.union(target);
    window.check_area()?;
    let mut fill = Coverage::new(window);
    fill.rasterize(glyphs, source)?;
    let stroke = (style.stroke_width > 0).then(|| fill.dilate(style.stroke_width));

    for ly in target.min_y..target.max_y {
        for lx in target.min_x..target.max_x {
            let f = fill.at(lx, ly);
            let s = stroke.as_ref().map_or(0.0, |s| s.at(lx, ly));
            if f <= 0.0 && s <= 0.0 {
                continue;
            }

            // Fill over outline, then the result over what the layer already holds
            let outline = style.stroke.to_rgba(to_alpha(s));
            let glyph_px = blend_over(style.fill.to_rgba(to_alpha(f)), outline, f);
            if glyph_px[3] == 0 {
                continue;
            }
            let dst = layer.get_pixel_mut(lx as u32, ly as u32);
            *dst = blend_over(glyph_px, *dst, glyph_px[3] as f32 / 255.0);
        }
    }
    Ok(())
}

/// Draw `text` onto `layer`, one line per `\n`, starting at `position`.
///
/// Each line is left-aligned at `position.0` with its ascender line at the
/// current y; y then advances by that line's ink height. Fails when a glyph
/// or the visible part of a line needs more than [`MAX_RASTER_PIXELS`].
pub fn draw_text<F: Font>(
    layer: &mut RgbaImage,
    font: &F,
    scale: PxScale,
    text: &str,
    position: (i32, i32),
    style: &TextStyle,
) -> Result<Vec<LineMetrics>, TextTooLarge> {
    let mut metrics = Vec::new();
    let mut line_y = position.1 as i64;

    for line in text.split('\n') {
        let glyphs = layout_line(font, scale, line, position.0 as f32, line_y as f32);
        let ink = ink_box(&glyphs);
        if let Some(bounds) = ink {
            paint_line(layer, &glyphs, bounds, style)?;
        }

        let height = ink.map_or(0, |b| b.height());
        metrics.push(LineMetrics { text: line.to_string(), top: line_y, height, ink });
        line_y = line_y.saturating_add(height);
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_glyph::FontVec;
    use image::Rgba;
    use std::path::Path;

    fn test_font() -> FontVec {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts/DejaVuSans.ttf");
        FontVec::try_from_vec(std::fs::read(path).unwrap()).unwrap()
    }

    fn style(stroke_width: u32) -> TextStyle {
        TextStyle { fill: Rgb::new(255, 0, 0), stroke: Rgb::WHITE, stroke_width }
    }

    #[test]
    fn test_font_scale_rejects_zero() {
        let font = test_font();
        assert!(font_scale(&font, 0).is_none());
        let scale = font_scale(&font, 50).unwrap();
        assert!(scale.y > 50.0);
    }

    #[test]
    fn test_lines_stack_by_measured_height() {
        let font = test_font();
        let scale = font_scale(&font, 40).unwrap();
        let mut layer = RgbaImage::new(300, 300);

        let metrics = draw_text(&mut layer, &font, scale, "A\nB", (10, 10), &style(0)).unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].top, 10);
        assert!(metrics[0].height > 0);
        assert_eq!(metrics[1].top, 10 + metrics[0].height);

        let a = metrics[0].ink.unwrap();
        let b = metrics[1].ink.unwrap();
        assert!(metrics[1].top - metrics[0].top >= a.height());
        assert!(b.min_y > a.min_y);
    }

    #[test]
    fn test_empty_line_advances_nothing() {
        let font = test_font();
        let scale = font_scale(&font, 30).unwrap();
        let mut layer = RgbaImage::new(200, 200);

        let metrics = draw_text(&mut layer, &font, scale, "A\n\nB", (0, 0), &style(0)).unwrap();
        assert_eq!(metrics[1].height, 0);
        assert!(metrics[1].ink.is_none());
        assert_eq!(metrics[2].top, metrics[0].height);
    }

    #[test]
    fn test_fill_color_is_drawn() {
        let font = test_font();
        let scale = font_scale(&font, 60).unwrap();
        let mut layer = RgbaImage::new(200, 120);

        draw_text(&mut layer, &font, scale, "I", (20, 10), &style(0)).unwrap();
        let opaque_red = layer.pixels().filter(|p| **p == Rgba([255, 0, 0, 255])).count();
        assert!(opaque_red > 0);
    }

    #[test]
    fn test_stroke_widens_ink() {
        let font = test_font();
        let scale = font_scale(&font, 40).unwrap();

        let mut plain = RgbaImage::new(200, 120);
        draw_text(&mut plain, &font, scale, "H", (20, 10), &style(0)).unwrap();
        let mut outlined = RgbaImage::new(200, 120);
        draw_text(&mut outlined, &font, scale, "H", (20, 10), &style(4)).unwrap();

        let count = |img: &RgbaImage| img.pixels().filter(|p| p[3] > 0).count();
        assert!(count(&outlined) > count(&plain));
        assert!(outlined.pixels().any(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_distance_transform_single_seed() {
        let far = 1e6;
        let mut grid = vec![far; 5 * 4];
        grid[7] = 0.0;
        distance_transform(&mut grid, 5, 4);
        assert_eq!(grid[7], 0.0); // (2, 1)
        assert_eq!(grid[9], 4.0); // (4, 1)
        assert_eq!(grid[15], 8.0); // (0, 3)
        assert_eq!(grid[0], 5.0);
    }

    #[test]
    fn test_stroke_reaches_radius() {
        let font = test_font();
        let scale = font_scale(&font, 60).unwrap();
        let rightmost = |img: &RgbaImage| {
            (0..img.width()).rev().find(|&x| (0..img.height()).any(|y| img.get_pixel(x, y)[3] == 255))
        };

        let mut plain = RgbaImage::new(200, 120);
        draw_text(&mut plain, &font, scale, "I", (20, 10), &style(0)).unwrap();
        let mut outlined = RgbaImage::new(200, 120);
        draw_text(&mut outlined, &font, scale, "I", (20, 10), &style(12)).unwrap();

        let grown = rightmost(&outlined).unwrap() as i64 - rightmost(&plain).unwrap() as i64;
        assert!((11..=13).contains(&grown), "outline grew by {grown}");
    }

    #[test]
    fn test_oversized_glyph_is_an_error() {
        let font = test_font();
        let scale = font_scale(&font, 100_000).unwrap();
        let mut layer = RgbaImage::new(64, 64);

        // Center the glyph on the layer so it cannot be skipped
        let ink = measure_line(&font, scale, "A", 0, 0).unwrap();
        let x = 32 - (ink.min_x + ink.max_x) / 2;
        let y = 32 - (ink.min_y + ink.max_y) / 2;
        let err = draw_text(&mut layer, &font, scale, "A", (x as i32, y as i32), &style(4)).unwrap_err();
        assert!(err.width.saturating_mul(err.height) > MAX_RASTER_PIXELS);
    }

    #[test]
    fn test_glyphs_far_off_layer_are_skipped() {
        let font = test_font();
        let scale = font_scale(&font, 100_000).unwrap();
        let mut layer = RgbaImage::new(64, 64);

        // The giant glyph lies entirely above and left of the layer
        let metrics = draw_text(&mut layer, &font, scale, "A", (-1_000_000, -1_000_000), &style(4)).unwrap();
        assert!(metrics[0].ink.is_some());
        assert!(layer.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_text_outside_layer_is_clipped() {
        let font = test_font();
        let scale = font_scale(&font, 40).unwrap();
        let mut layer = RgbaImage::new(20, 20);

        let metrics = draw_text(&mut layer, &font, scale, "Hello", (-500, -500), &style(4)).unwrap();
        assert_eq!(metrics.len(), 1);
        assert!(layer.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_measure_matches_draw() {
        let font = test_font();
        let scale = font_scale(&font, 40).unwrap();
        let mut layer = RgbaImage::new(300, 100);

        let metrics = draw_text(&mut layer, &font, scale, "Wg", (5, 7), &style(2)).unwrap();
        assert_eq!(measure_line(&font, scale, "Wg", 5, 7), metrics[0].ink);
    }
}
