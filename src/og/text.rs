//! Text measurement and rasterization.
//!
//! [`TextRenderer`] is the seam between card layout and glyph drawing.
//! [`FontRenderer`] rasterizes real TrueType/OpenType fonts via `ab_glyph`;
//! [`BlockRenderer`] is used when no font can be loaded and draws one
//! placeholder bar per word so the card still shows where text sits.

use super::OgError;
use super::draw::{Color, RoundedRect, blend_pixel};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::RgbaImage;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// Font size and weight for one run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: Weight,
}

impl TextStyle {
    pub const fn regular(size: f32) -> Self {
        Self {
            size,
            weight: Weight::Regular,
        }
    }

    pub const fn bold(size: f32) -> Self {
        Self {
            size,
            weight: Weight::Bold,
        }
    }
}

pub trait TextRenderer: Send + Sync {
    /// Advance width of `text` in pixels.
    fn measure(&self, text: &str, style: TextStyle) -> f32;

    /// Draw `text` with its left edge at `x` and its baseline at `baseline`.
    fn draw(
        &self,
        img: &mut RgbaImage,
        text: &str,
        x: f32,
        baseline: f32,
        style: TextStyle,
        color: Color,
    );
}

pub struct FontRenderer {
    regular: FontVec,
    bold: FontVec,
}

impl FontRenderer {
    pub fn load(regular: &Path, bold: &Path) -> Result<Self, OgError> {
        Ok(Self {
            regular: load_font(regular)?,
            bold: load_font(bold)?,
        })
    }

    fn font(&self, weight: Weight) -> &FontVec {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }
}

fn load_font(path: &Path) -> Result<FontVec, OgError> {
    let bytes = std::fs::read(path).map_err(|source| OgError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(bytes).map_err(|e| OgError::Font {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

impl TextRenderer for FontRenderer {
    fn measure(&self, text: &str, style: TextStyle) -> f32 {
        let font = self.font(style.weight).as_scaled(PxScale::from(style.size));
        let mut width = 0.0;
        let mut previous = None;
        for c in text.chars() {
            let id = font.glyph_id(c);
            if let Some(prev) = previous {
                width += font.kern(prev, id);
            }
            width += font.h_advance(id);
            previous = Some(id);
        }
        width
    }

    fn draw(
        &self,
        img: &mut RgbaImage,
        text: &str,
        x: f32,
        baseline: f32,
        style: TextStyle,
        color: Color,
    ) {
        let raw = self.font(style.weight);
        let font = raw.as_scaled(PxScale::from(style.size));
        let mut caret = x;
        let mut previous = None;
        for c in text.chars() {
            let id = font.glyph_id(c);
            if let Some(prev) = previous {
                caret += font.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(style.size, ab_glyph::point(caret, baseline));
            caret += font.h_advance(id);
            previous = Some(id);

            let Some(outline) = raw.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outline.px_bounds();
            outline.draw(|gx, gy, coverage| {
                blend_pixel(
                    img,
                    bounds.min.x as i32 + gx as i32,
                    bounds.min.y as i32 + gy as i32,
                    color,
                    coverage,
                );
            });
        }
    }
}

/// Fallback renderer with fixed-width metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockRenderer;

const BLOCK_ADVANCE: f32 = 0.55;
const BLOCK_HEIGHT: f32 = 0.6;

impl TextRenderer for BlockRenderer {
    fn measure(&self, text: &str, style: TextStyle) -> f32 {
        let factor = match style.weight {
            Weight::Regular => BLOCK_ADVANCE,
            Weight::Bold => BLOCK_ADVANCE + 0.05,
        };
        text.chars().count() as f32 * style.size * factor
    }

    fn draw(
        &self,
        img: &mut RgbaImage,
        text: &str,
        x: f32,
        baseline: f32,
        style: TextStyle,
        color: Color,
    ) {
        let mut caret = x;
        for word in text.split(' ') {
            let width = self.measure(word, style);
            if width > 0.0 {
                let height = style.size * BLOCK_HEIGHT;
                RoundedRect {
                    x: caret,
                    y: baseline - height,
                    width,
                    height,
                    radius: height / 4.0,
                }
                .fill(img, color);
            }
            caret += width + self.measure(" ", style);
        }
    }
}

/// Load the configured fonts, or fall back to [`BlockRenderer`].
pub fn load_renderer(regular: &Path, bold: &Path) -> Box<dyn TextRenderer> {
    match FontRenderer::load(regular, bold) {
        Ok(renderer) => Box::new(renderer),
        Err(e) => {
            log::warn!("{e}; drawing placeholder text");
            Box::new(BlockRenderer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn block_metrics_scale_with_length_and_size() {
        let r = BlockRenderer;
        let a = r.measure("abcd", TextStyle::regular(20.0));
        assert_eq!(a, 4.0 * 20.0 * 0.55);
        assert!(r.measure("abcd", TextStyle::bold(20.0)) > a);
        assert_eq!(r.measure("", TextStyle::regular(20.0)), 0.0);
    }

    #[test]
    fn block_draws_above_baseline() {
        let mut img = RgbaImage::from_pixel(200, 60, Rgba([0, 0, 0, 255]));
        BlockRenderer.draw(
            &mut img,
            "hi there",
            10.0,
            50.0,
            TextStyle::regular(40.0),
            Color::WHITE,
        );
        // Inside the first word's bar
        assert_eq!(img.get_pixel(20, 40), &Rgba([255, 255, 255, 255]));
        // Below the baseline stays untouched
        assert_eq!(img.get_pixel(20, 55), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn missing_fonts_fall_back_to_blocks() {
        let r = load_renderer(Path::new("/nope/regular.ttf"), Path::new("/nope/bold.ttf"));
        assert_eq!(
            r.measure("ab", TextStyle::regular(10.0)),
            BlockRenderer.measure("ab", TextStyle::regular(10.0))
        );
    }

    #[test]
    fn garbage_font_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(
            FontRenderer::load(&path, &path),
            Err(OgError::Font { .. })
        ));
    }
}
