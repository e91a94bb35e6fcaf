//! Open Graph card generation.
//!
//! One 1200×630 PNG per document of the default locale, written to
//! `<output>/og-images/`. Pages reference them from `og:image`.
//!
//! ## Filenames
//!
//! | Slug | File |
//! |------|------|
//! | (root) | `home.png` |
//! | `welcome` | `welcome.png` |
//! | `tickets/setup` | `tickets-setup.png` |
//!
//! ## Determinism
//!
//! The speckle overlay is drawn from an RNG seeded with `og.seed` mixed
//! with a SHA-256 of the filename. The same content and config always
//! produce byte-identical images, regardless of worker count.
//!
//! ## Failure handling
//!
//! A missing logo draws `og.fallback_logo_text` instead; missing fonts
//! switch to placeholder bars. Both are logged. A card that fails to render
//! or write is logged and counted, and the batch continues.

pub mod draw;
pub mod layout;
pub mod text;

use crate::config::{OgConfig, SiteConfig};
use crate::content::{self, ContentLoader, Slug};
use draw::{Color, RoundedRect};
use image::{ImageFormat, RgbaImage, imageops::FilterType};
use layout::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use text::TextRenderer;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OgError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid font {path}: {message}")]
    Font { path: PathBuf, message: String },
}

/// Card flavour. Selects the colour scheme and the badge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OgKind {
    Website,
    Article,
}

pub struct ColorScheme {
    pub background: [Color; 3],
    pub text: Color,
    pub subtitle: Color,
    pub accent: Color,
    pub card_bg: Color,
    pub card_border: Color,
}

const WEBSITE_SCHEME: ColorScheme = ColorScheme {
    background: [Color::hex(0x18181b), Color::hex(0x27272a), Color::hex(0x3f3f46)],
    text: Color::hex(0xfafafa),
    subtitle: Color::hex(0xa1a1aa),
    accent: Color::hex(0x71717a),
    card_bg: Color::rgba(24, 24, 27, 0.8),
    card_border: Color::rgba(113, 113, 122, 0.3),
};

const ARTICLE_SCHEME: ColorScheme = ColorScheme {
    background: [Color::hex(0x09090b), Color::hex(0x18181b), Color::hex(0x27272a)],
    text: Color::hex(0xfafafa),
    subtitle: Color::hex(0xa1a1aa),
    accent: Color::hex(0x71717a),
    card_bg: Color::rgba(9, 9, 11, 0.8),
    card_border: Color::rgba(113, 113, 122, 0.4),
};

impl OgKind {
    pub fn scheme(self) -> &'static ColorScheme {
        match self {
            OgKind::Website => &WEBSITE_SCHEME,
            OgKind::Article => &ARTICLE_SCHEME,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OgKind::Website => "WEBSITE",
            OgKind::Article => "ARTICLE",
        }
    }

    /// `og:type` value.
    pub fn og_type(self) -> &'static str {
        match self {
            OgKind::Website => "website",
            OgKind::Article => "article",
        }
    }

    pub fn for_slug(slug: &Slug) -> Self {
        if slug.is_root() {
            OgKind::Website
        } else {
            OgKind::Article
        }
    }
}

/// Everything needed to draw one card.
#[derive(Debug, Clone, PartialEq)]
pub struct OgCard {
    pub title: String,
    pub description: String,
    pub kind: OgKind,
    pub filename: String,
    /// Page the card belongs to, for reporting.
    pub url: String,
}

/// Output filename for a slug.
pub fn og_filename(slug: &Slug) -> String {
    if slug.is_root() {
        "home.png".to_string()
    } else {
        format!("{}.png", slug.segments().join("-"))
    }
}

/// Per-card RNG seed.
pub fn seed_for(base: u64, filename: &str) -> u64 {
    let digest = Sha256::digest(filename.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    base ^ u64::from_le_bytes(bytes)
}

/// Shared, read-only drawing resources.
pub struct CardAssets {
    pub logo: Option<RgbaImage>,
    pub renderer: Box<dyn TextRenderer>,
    pub fallback_logo_text: String,
}

impl CardAssets {
    /// Load logo and fonts relative to the content root, falling back where
    /// they are missing.
    pub fn load(content_root: &Path, config: &OgConfig) -> Self {
        let logo_path = content_root.join(&config.logo);
        let logo = match load_logo(&logo_path) {
            Ok(logo) => Some(logo),
            Err(e) => {
                log::warn!("Logo not found ({e}), creating text logo instead");
                None
            }
        };
        Self {
            logo,
            renderer: text::load_renderer(
                &content_root.join(&config.font_regular),
                &content_root.join(&config.font_bold),
            ),
            fallback_logo_text: config.fallback_logo_text.clone(),
        }
    }
}

fn load_logo(path: &Path) -> Result<RgbaImage, OgError> {
    let img = image::open(path)?;
    Ok(image::imageops::resize(
        &img.to_rgba8(),
        LOGO_SIZE,
        LOGO_SIZE,
        FilterType::Lanczos3,
    ))
}

/// Rasterize one card.
pub fn render_card(card: &OgCard, assets: &CardAssets, seed: u64) -> RgbaImage {
    let scheme = card.kind.scheme();
    let renderer = assets.renderer.as_ref();
    let mut img = RgbaImage::new(WIDTH, HEIGHT);

    draw::fill_diagonal_gradient(&mut img, &scheme.background);

    let mut rng = StdRng::seed_from_u64(seed);
    let speckle = Color::rgba(255, 255, 255, 0.05);
    for _ in 0..SPECKLES {
        let x = rng.random_range(0.0..WIDTH as f32);
        let y = rng.random_range(0.0..HEIGHT as f32);
        let radius = rng.random_range(1.0..4.0);
        draw::fill_circle(&mut img, x, y, radius, speckle);
    }

    match &assets.logo {
        Some(logo) => {
            let container = RoundedRect {
                x: PADDING - LOGO_CONTAINER_INSET,
                y: PADDING - LOGO_CONTAINER_INSET,
                width: LOGO_SIZE as f32 + LOGO_CONTAINER_INSET * 2.0,
                height: LOGO_SIZE as f32 + LOGO_CONTAINER_INSET * 2.0,
                radius: LOGO_CONTAINER_RADIUS,
            };
            container.fill(&mut img, scheme.card_bg);
            container.stroke(&mut img, scheme.card_border, 2.0);
            draw::overlay(&mut img, logo, PADDING as i32, PADDING as i32);
        }
        None => renderer.draw(
            &mut img,
            &assets.fallback_logo_text,
            PADDING,
            PADDING + 60.0,
            FALLBACK_LOGO_STYLE,
            scheme.accent,
        ),
    }

    let panel = RoundedRect {
        x: CARD_X,
        y: CARD_Y,
        width: CARD_WIDTH,
        height: CARD_HEIGHT,
        radius: CARD_RADIUS,
    };
    panel.fill(&mut img, scheme.card_bg);
    panel.stroke(&mut img, scheme.card_border, 1.0);

    let layout = layout_card(&card.title, &card.description, card.kind.label(), renderer);
    for line in &layout.title {
        renderer.draw(&mut img, &line.text, TEXT_X, line.baseline, TITLE_STYLE, scheme.text);
    }
    for line in &layout.description {
        renderer.draw(
            &mut img,
            &line.text,
            TEXT_X,
            line.baseline,
            DESCRIPTION_STYLE,
            scheme.subtitle,
        );
    }

    let badge = &layout.badge;
    RoundedRect {
        x: badge.x,
        y: badge.y,
        width: badge.width,
        height: BADGE_HEIGHT,
        radius: BADGE_RADIUS,
    }
    .fill(&mut img, scheme.accent);
    renderer.draw(
        &mut img,
        &badge.label,
        badge.text_x,
        badge.baseline,
        BADGE_STYLE,
        scheme.text,
    );

    draw::hline(
        &mut img,
        PADDING,
        PADDING + ACCENT_LENGTH,
        ACCENT_Y,
        ACCENT_WIDTH,
        scheme.accent,
    );

    img
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, OgError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Cards for every document of the default locale, in path order.
///
/// Descriptions fall back to the site description.
pub fn collect_cards(loader: &ContentLoader, config: &SiteConfig) -> Vec<OgCard> {
    let locale = loader.locales().default_locale();
    let entries = match loader.documents(locale) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("No OG cards: {e}");
            return Vec::new();
        }
    };
    entries
        .into_iter()
        .filter_map(|entry| match content::read_document(&entry.path) {
            Ok(parsed) => {
                let fm = parsed.front_matter;
                Some(OgCard {
                    title: content::document_title(fm.title, &parsed.body),
                    description: fm
                        .description
                        .filter(|d| !d.trim().is_empty())
                        .unwrap_or_else(|| config.site.description.clone()),
                    kind: OgKind::for_slug(&entry.slug),
                    filename: og_filename(&entry.slug),
                    url: entry.slug.url(locale),
                })
            }
            Err(e) => {
                log::warn!("Skipping OG card for {}: {e}", entry.path.display());
                None
            }
        })
        .collect()
}

/// Outcome of a generation run.
#[derive(Debug, Default)]
pub struct OgReport {
    pub output_dir: PathBuf,
    pub generated: Vec<OgCard>,
    pub failed: Vec<(OgCard, String)>,
    pub text_logo: bool,
}

/// Render and write all cards in parallel.
///
/// Only failing to create the output directory is an error; per-card
/// failures are collected in the report.
pub fn generate_og_images(
    loader: &ContentLoader,
    config: &SiteConfig,
    content_root: &Path,
    output_root: &Path,
) -> Result<OgReport, OgError> {
    let output_dir = output_root.join(&config.og.output_dir);
    fs::create_dir_all(&output_dir).map_err(|source| OgError::Io {
        path: output_dir.clone(),
        source,
    })?;

    let assets = CardAssets::load(content_root, &config.og);
    let cards = collect_cards(loader, config);

    let results: Vec<(OgCard, Result<(), OgError>)> = cards
        .into_par_iter()
        .map(|card| {
            let result = write_card(&card, &assets, config.og.seed, &output_dir);
            (card, result)
        })
        .collect();

    let mut report = OgReport {
        output_dir,
        text_logo: assets.logo.is_none(),
        ..OgReport::default()
    };
    for (card, result) in results {
        match result {
            Ok(()) => report.generated.push(card),
            Err(e) => {
                log::error!("Failed to generate {}: {e}", card.filename);
                report.failed.push((card, e.to_string()));
            }
        }
    }
    Ok(report)
}

fn write_card(card: &OgCard, assets: &CardAssets, base_seed: u64, dir: &Path) -> Result<(), OgError> {
    let img = render_card(card, assets, seed_for(base_seed, &card.filename));
    let png = encode_png(&img)?;
    let path = dir.join(&card.filename);
    fs::write(&path, png).map_err(|source| OgError::Io { path, source })
}
