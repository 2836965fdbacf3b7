//! Layer rotation with canvas expansion
//!
//! Rotates an RGBA layer counter-clockwise around its center and grows the
//! canvas so no corner is clipped. Arbitrary angles use bicubic sampling in
//! premultiplied alpha; multiples of 90 degrees are exact pixel transposes.

use image::imageops;
use image::{Rgba, RgbaImage};

/// Cubic convolution parameter (Keys, a = -0.5).
const CUBIC_A: f64 = -0.5;

/// Affine map from output pixel coordinates to input coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Affine {
    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.b * y + self.c, self.d * x + self.e * y + self.f)
    }
}

/// Size of the canvas needed to hold a `width` x `height` layer rotated by
/// `degrees`, and the inverse map for sampling.
fn expanded_transform(width: u32, height: u32, degrees: f64) -> (u32, u32, Affine) {
    let w = width as f64;
    let h = height as f64;
    let (cx, cy) = (w / 2.0, h / 2.0);

    // Inverse rotation: output -> input
    let theta = -degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let mut m = Affine { a: cos, b: sin, c: 0.0, d: -sin, e: cos, f: 0.0 };
    let (c, f) = m.apply(-cx, -cy);
    m.c = c + cx;
    m.f = f + cy;

    let corners = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)].map(|(x, y)| m.apply(x, y));
    let min_x = corners.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    // Round away tiny float noise before ceil/floor
    let snap = |v: f64| (v * 1e9).round() / 1e9;
    let new_w = (snap(max_x).ceil() - snap(min_x).floor()).max(1.0) as u32;
    let new_h = (snap(max_y).ceil() - snap(min_y).floor()).max(1.0) as u32;

    let (c, f) = m.apply(-(new_w as f64 - w) / 2.0, -(new_h as f64 - h) / 2.0);
    m.c = c;
    m.f = f;

    (new_w, new_h, m)
}

/// Rotate `layer` counter-clockwise by `degrees`, expanding the canvas.
pub fn rotate_expand(layer: &RgbaImage, degrees: i32) -> RgbaImage {
    match degrees.rem_euclid(360) {
        0 => layer.clone(),
        90 => imageops::rotate270(layer),
        180 => imageops::rotate180(layer),
        270 => imageops::rotate90(layer),
        normalized => rotate_bicubic(layer, normalized as f64),
    }
}

fn rotate_bicubic(layer: &RgbaImage, degrees: f64) -> RgbaImage {
    let (width, height) = layer.dimensions();
    if width == 0 || height == 0 {
        return layer.clone();
    }
    let (new_w, new_h, m) = expanded_transform(width, height, degrees);
    let premultiplied = Premultiplied::from_image(layer);

    let mut out = RgbaImage::new(new_w, new_h);
    for (ox, oy, pixel) in out.enumerate_pixels_mut() {
        let (ix, iy) = m.apply(ox as f64 + 0.5, oy as f64 + 0.5);
        if ix < 0.0 || iy < 0.0 || ix >= width as f64 || iy >= height as f64 {
            continue;
        }
        *pixel = premultiplied.sample_bicubic(ix - 0.5, iy - 0.5);
    }
    out
}

/// Premultiplied float copy of an RGBA image, so transparent texels carry no color.
struct Premultiplied {
    width: u32,
    height: u32,
    data: Vec<[f64; 4]>,
}

impl Premultiplied {
    fn from_image(image: &RgbaImage) -> Self {
        let data = image
            .pixels()
            .map(|p| {
                let a = p[3] as f64 / 255.0;
                [p[0] as f64 * a, p[1] as f64 * a, p[2] as f64 * a, p[3] as f64]
            })
            .collect();
        Self { width: image.width(), height: image.height(), data }
    }

    fn texel(&self, x: i64, y: i64) -> [f64; 4] {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.data[(y * self.width + x) as usize]
    }

    fn sample_bicubic(&self, x: f64, y: f64) -> Rgba<u8> {
        let x0 = x.floor();
        let y0 = y.floor();
        let wx = weights(x - x0);
        let wy = weights(y - y0);

        let mut acc = [0.0f64; 4];
        for (j, wyj) in wy.iter().enumerate() {
            let sy = y0 as i64 + j as i64 - 1;
            for (i, wxi) in wx.iter().enumerate() {
                let sx = x0 as i64 + i as i64 - 1;
                let texel = self.texel(sx, sy);
                let w = wxi * wyj;
                for k in 0..4 {
                    acc[k] += texel[k] * w;
                }
            }
        }

        let alpha = acc[3].clamp(0.0, 255.0);
        if alpha < 0.5 {
            return Rgba([0, 0, 0, 0]);
        }
        let unpremultiply = |v: f64| (v.clamp(0.0, alpha) / (alpha / 255.0)).round().clamp(0.0, 255.0) as u8;
        Rgba([unpremultiply(acc[0]), unpremultiply(acc[1]), unpremultiply(acc[2]), alpha.round() as u8])
    }
}

/// Keys cubic weights for the four taps around a fractional offset `t`.
fn weights(t: f64) -> [f64; 4] {
    [cubic(t + 1.0), cubic(t), cubic(1.0 - t), cubic(2.0 - t)]
}

fn cubic(x: f64) -> f64 {
    let x = x.abs();
    if x < 1.0 {
        ((CUBIC_A + 2.0) * x - (CUBIC_A + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        (((x - 5.0) * x + 8.0) * x - 4.0) * CUBIC_A
    } else {
        0.0
    }
}
