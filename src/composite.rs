//! Alpha compositing of text layers onto the background

use image::{Rgba, RgbaImage};

/// Composite `src` over `dst` (Porter-Duff "source over").
///
/// `src_alpha` is the effective source coverage in `0.0..=1.0`; colors are
/// straight (not premultiplied) on both sides.
pub(crate) fn blend_over(src: Rgba<u8>, dst: Rgba<u8>, src_alpha: f32) -> Rgba<u8> {
    let dst_alpha = dst[3] as f32 / 255.0;

    // out_alpha = src_alpha + dst_alpha * (1 - src_alpha)
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    // out_color = (src * src_alpha + dst * dst_alpha * (1 - src_alpha)) / out_alpha
    let composite = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        let result = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (result.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([
        composite(src[0], dst[0]),
        composite(src[1], dst[1]),
        composite(src[2], dst[2]),
        (out_alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}

/// Composite `overlay` over `base` in place. Both images must have the same size.
///
/// Pixels where the overlay is fully transparent are left untouched, so
/// background-only regions keep their exact values.
pub fn alpha_composite(base: &mut RgbaImage, overlay: &RgbaImage) {
    debug_assert_eq!(base.dimensions(), overlay.dimensions());

    for (dst, src) in base.pixels_mut().zip(overlay.pixels()) {
        if src[3] == 0 {
            continue;
        }
        *dst = blend_over(*src, *dst, src[3] as f32 / 255.0);
    }
}

/// Paste `layer` onto `canvas` with its top-left corner at (`x`, `y`),
/// using the layer's own alpha as the mask.
///
/// Offsets may be negative; whatever falls outside the canvas is clipped.
pub fn paste(canvas: &mut RgbaImage, layer: &RgbaImage, x: i64, y: i64) {
    let canvas_width = canvas.width() as i64;
    let canvas_height = canvas.height() as i64;

    for (ly, row) in layer.rows().enumerate() {
        let dest_y = y + ly as i64;
        if dest_y < 0 {
            continue;
        }
        if dest_y >= canvas_height {
            break;
        }

        for (lx, pixel) in row.enumerate() {
            let dest_x = x + lx as i64;
            if dest_x < 0 {
                continue;
            }
            if dest_x >= canvas_width {
                break;
            }
            if pixel[3] == 0 {
                continue;
            }

            let dst = canvas.get_pixel_mut(dest_x as u32, dest_y as u32);
            *dst = blend_over(*pixel, *dst, pixel[3] as f32 / 255.0);
        }
    }
}
