//! Anti-aliased shape primitives on an RGBA canvas.
//!
//! Every shape is drawn by evaluating a signed distance at each pixel centre
//! and turning it into coverage, then blending source-over.

use image::{Rgba, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    /// `0xRRGGBB`, fully opaque.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 1.0,
        }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Color = Color::hex(0xffffff);

    fn lerp(self, other: Color, t: f32) -> Color {
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// Blend `color` over one pixel with extra `coverage` in `0..=1`.
pub fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let alpha = (color.a * coverage).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let px = img.get_pixel_mut(x as u32, y as u32);
    let Rgba([dr, dg, db, da]) = *px;
    let dst_a = da as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    let channel = |s: u8, d: u8| {
        if out_a <= 0.0 {
            return 0;
        }
        ((s as f32 * alpha + d as f32 * dst_a * (1.0 - alpha)) / out_a).round() as u8
    };
    *px = Rgba([
        channel(color.r, dr),
        channel(color.g, dg),
        channel(color.b, db),
        (out_a * 255.0).round() as u8,
    ]);
}

/// Fill the whole canvas with a linear gradient from the top-left to the
/// bottom-right corner. Stops are spread evenly.
pub fn fill_diagonal_gradient(img: &mut RgbaImage, stops: &[Color]) {
    let (w, h) = (img.width() as f32, img.height() as f32);
    let denom = w * w + h * h;
    let segments = stops.len().saturating_sub(1).max(1) as f32;
    for (x, y, px) in img.enumerate_pixels_mut() {
        let t = ((x as f32 + 0.5) * w + (y as f32 + 0.5) * h) / denom;
        let color = sample_stops(stops, t.clamp(0.0, 1.0), segments);
        *px = Rgba([color.r, color.g, color.b, (color.a * 255.0).round() as u8]);
    }
}

fn sample_stops(stops: &[Color], t: f32, segments: f32) -> Color {
    match stops {
        [] => Color::rgba(0, 0, 0, 0.0),
        [only] => *only,
        _ => {
            let pos = t * segments;
            let i = (pos.floor() as usize).min(stops.len() - 2);
            stops[i].lerp(stops[i + 1], pos - i as f32)
        }
    }
}

/// Signed distance from `(px, py)` to a rounded rectangle; negative inside.
fn rounded_rect_sdf(px: f32, py: f32, x: f32, y: f32, w: f32, h: f32, r: f32) -> f32 {
    let r = r.min(w / 2.0).min(h / 2.0);
    let qx = (px - (x + w / 2.0)).abs() - (w / 2.0 - r);
    let qy = (py - (y + h / 2.0)).abs() - (h / 2.0 - r);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    outside + qx.max(qy).min(0.0) - r
}

/// A rounded rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

impl RoundedRect {
    fn for_each_pixel(&self, margin: f32, mut f: impl FnMut(i32, i32, f32)) {
        let x0 = (self.x - margin).floor() as i32;
        let y0 = (self.y - margin).floor() as i32;
        let x1 = (self.x + self.width + margin).ceil() as i32;
        let y1 = (self.y + self.height + margin).ceil() as i32;
        for py in y0..y1 {
            for px in x0..x1 {
                let d = rounded_rect_sdf(
                    px as f32 + 0.5,
                    py as f32 + 0.5,
                    self.x,
                    self.y,
                    self.width,
                    self.height,
                    self.radius,
                );
                f(px, py, d);
            }
        }
    }

    pub fn fill(&self, img: &mut RgbaImage, color: Color) {
        self.for_each_pixel(1.0, |px, py, d| {
            blend_pixel(img, px, py, color, (0.5 - d).clamp(0.0, 1.0));
        });
    }

    /// Stroke centred on the outline.
    pub fn stroke(&self, img: &mut RgbaImage, color: Color, line_width: f32) {
        let half = line_width / 2.0;
        self.for_each_pixel(half + 1.0, |px, py, d| {
            blend_pixel(img, px, py, color, (half + 0.5 - d.abs()).clamp(0.0, 1.0));
        });
    }
}

pub fn fill_circle(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Color) {
    let x0 = (cx - radius - 1.0).floor() as i32;
    let x1 = (cx + radius + 1.0).ceil() as i32;
    let y0 = (cy - radius - 1.0).floor() as i32;
    let y1 = (cy + radius + 1.0).ceil() as i32;
    for py in y0..y1 {
        for px in x0..x1 {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt() - radius;
            blend_pixel(img, px, py, color, (0.5 - d).clamp(0.0, 1.0));
        }
    }
}

/// Horizontal line with butt caps.
pub fn hline(img: &mut RgbaImage, x0: f32, x1: f32, y: f32, line_width: f32, color: Color) {
    RoundedRect {
        x: x0,
        y: y - line_width / 2.0,
        width: x1 - x0,
        height: line_width,
        radius: 0.0,
    }
    .fill(img, color);
}

/// Copy `src` onto `dst` at `(x, y)` with alpha blending.
pub fn overlay(dst: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    for (sx, sy, px) in src.enumerate_pixels() {
        let Rgba([r, g, b, a]) = *px;
        blend_pixel(
            dst,
            x + sx as i32,
            y + sy as i32,
            Color::rgba(r, g, b, 1.0),
            a as f32 / 255.0,
        );
    }
}
